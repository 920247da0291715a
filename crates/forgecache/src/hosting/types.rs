//! Wire types for the hosting API's JSON payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository as returned by the host's repository and search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRepo {
    /// Host-assigned numeric id. Stable across renames and transfers.
    pub id: i64,
    /// "owner/name".
    pub full_name: String,
    pub name: String,
    pub owner: Option<RemoteOwner>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub clone_url: Option<String>,
    /// Primary language as detected by the host.
    pub language: Option<String>,
    pub default_branch: Option<String>,
    pub license: Option<RemoteLicense>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub stargazers_count: i32,
    #[serde(default)]
    pub forks_count: i32,
    #[serde(default)]
    pub watchers_count: i32,
    #[serde(default)]
    pub open_issues_count: i32,
}

impl RemoteRepo {
    /// Owner login, falling back to the full name's prefix when the host
    /// omits the owner object (some listing endpoints do).
    #[must_use]
    pub fn owner_login(&self) -> String {
        match &self.owner {
            Some(owner) => owner.login.clone(),
            None => self
                .full_name
                .split_once('/')
                .map(|(owner, _)| owner.to_string())
                .unwrap_or_default(),
        }
    }

    /// License SPDX identifier, treating the host's "NOASSERTION" as absent.
    #[must_use]
    pub fn license_spdx(&self) -> Option<String> {
        self.license
            .as_ref()
            .and_then(|l| l.spdx_id.clone())
            .filter(|spdx| spdx != "NOASSERTION")
    }
}

/// Repository owner object.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteOwner {
    pub login: String,
}

/// License object attached to a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLicense {
    pub spdx_id: Option<String>,
}

/// Response envelope of the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub total_count: i64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<RemoteRepo>,
}

/// Error body the host attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

/// Sort key accepted by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    Stars,
    Forks,
    Updated,
}

impl SearchSort {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchSort::Stars => "stars",
            SearchSort::Forks => "forks",
            SearchSort::Updated => "updated",
        }
    }
}

/// Options for the remote search endpoint.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Sort key; the host's default is relevance ("best match").
    pub sort: Option<SearchSort>,
    /// Page number (1-indexed, as the host counts).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sort: None,
            page: 1,
            per_page: 30,
        }
    }
}

/// Options for listing a user's repositories.
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Page number (1-indexed, as the host counts).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
        }
    }
}

/// One rate-limit window from the host's rate-limit endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitWindow {
    /// Maximum requests allowed per period.
    pub limit: usize,
    /// Requests used in the current period.
    pub used: usize,
    /// Remaining requests in the current period.
    pub remaining: usize,
    /// Unix timestamp when the window resets.
    pub reset: u64,
}

impl RateLimitWindow {
    /// Get the reset time as a DateTime.
    pub fn reset_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset as i64, 0).unwrap_or_else(Utc::now)
    }
}

/// Rate limit status across the host's API families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub resources: RateLimitResources,
}

/// Per-family rate-limit windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResources {
    /// Core REST endpoints (repository, README, languages, listings).
    pub core: RateLimitWindow,
    /// Search endpoints, limited separately and much lower.
    #[serde(default)]
    pub search: Option<RateLimitWindow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_json() -> serde_json::Value {
        serde_json::json!({
            "id": 42,
            "full_name": "acme/widget",
            "name": "widget",
            "owner": {"login": "acme"},
            "description": "A widget",
            "html_url": "https://example.com/acme/widget",
            "clone_url": "https://example.com/acme/widget.git",
            "language": "Rust",
            "default_branch": "main",
            "license": {"spdx_id": "MIT"},
            "topics": ["rust", "widgets"],
            "private": false,
            "fork": false,
            "stargazers_count": 10,
            "forks_count": 2,
            "watchers_count": 10,
            "open_issues_count": 1
        })
    }

    #[test]
    fn remote_repo_deserializes_full_payload() {
        let repo: RemoteRepo = serde_json::from_value(repo_json()).expect("deserialize");
        assert_eq!(repo.id, 42);
        assert_eq!(repo.full_name, "acme/widget");
        assert_eq!(repo.owner_login(), "acme");
        assert_eq!(repo.license_spdx().as_deref(), Some("MIT"));
        assert_eq!(repo.stargazers_count, 10);
        assert_eq!(repo.topics, vec!["rust", "widgets"]);
    }

    #[test]
    fn remote_repo_tolerates_sparse_payloads() {
        let repo: RemoteRepo = serde_json::from_value(serde_json::json!({
            "id": 7,
            "full_name": "solo/bare",
            "name": "bare"
        }))
        .expect("sparse payload should deserialize");

        assert_eq!(repo.owner_login(), "solo");
        assert!(repo.license_spdx().is_none());
        assert_eq!(repo.stargazers_count, 0);
        assert!(repo.topics.is_empty());
        assert!(!repo.private);
    }

    #[test]
    fn license_noassertion_is_treated_as_absent() {
        let mut value = repo_json();
        value["license"] = serde_json::json!({"spdx_id": "NOASSERTION"});
        let repo: RemoteRepo = serde_json::from_value(value).expect("deserialize");
        assert!(repo.license_spdx().is_none());
    }

    #[test]
    fn search_response_deserializes() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "total_count": 1,
            "incomplete_results": false,
            "items": [repo_json()]
        }))
        .expect("deserialize");
        assert_eq!(response.total_count, 1);
        assert_eq!(response.items.len(), 1);
    }

    #[test]
    fn rate_limit_window_reset_at() {
        let window = RateLimitWindow {
            limit: 5000,
            used: 100,
            remaining: 4900,
            reset: 2_000_000_000,
        };
        assert_eq!(window.reset_at().timestamp(), 2_000_000_000);
    }

    #[test]
    fn rate_limit_status_tolerates_missing_search_family() {
        let status: RateLimitStatus = serde_json::from_value(serde_json::json!({
            "resources": {
                "core": {"limit": 60, "used": 1, "remaining": 59, "reset": 1700000000}
            }
        }))
        .expect("deserialize");
        assert_eq!(status.resources.core.remaining, 59);
        assert!(status.resources.search.is_none());
    }

    #[test]
    fn search_sort_maps_to_query_values() {
        assert_eq!(SearchSort::Stars.as_str(), "stars");
        assert_eq!(SearchSort::Forks.as_str(), "forks");
        assert_eq!(SearchSort::Updated.as_str(), "updated");
    }
}
