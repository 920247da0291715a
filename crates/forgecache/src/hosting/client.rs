//! Hosting API client and status-code translation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use url::Url;

use crate::http::{HttpHeaders, HttpRequest, HttpResponse, HttpTransport, reqwest_transport};

use super::api::HostingApi;
use super::error::{HostingError, Result};
use super::types::{
    ErrorBody, ListOptions, RateLimitStatus, RemoteRepo, SearchOptions, SearchResponse,
};

/// Base URL of the hosted API when none is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Bounded per-request timeout applied by the default transport.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

const MEDIA_TYPE_JSON: &str = "application/vnd.github+json";
const MEDIA_TYPE_RAW: &str = "application/vnd.github.raw+json";
const USER_AGENT: &str = concat!("forgecache/", env!("CARGO_PKG_VERSION"));

/// Configuration for constructing a [`HostingClient`].
#[derive(Debug, Clone)]
pub struct HostingConfig {
    /// Base URL of the hosting API, without a trailing slash.
    pub api_base: String,
    /// Bearer token. Unauthenticated calls are permitted at a lower rate limit.
    pub token: Option<String>,
    /// Per-request timeout for the default transport.
    pub timeout: StdDuration,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Typed client for the hosting API.
///
/// An explicitly constructed, injectable dependency: no global instance,
/// no shared configuration. Cloning is cheap (the transport is shared).
#[derive(Clone)]
pub struct HostingClient {
    api_base: String,
    token: Option<String>,
    transport: Arc<dyn HttpTransport>,
}

impl HostingClient {
    /// Create a client with the default reqwest-backed transport.
    pub fn new(config: HostingConfig) -> Result<Self> {
        let transport = reqwest_transport::ReqwestTransport::with_timeout(config.timeout)
            .map_err(|e| HostingError::transport(e.to_string()))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an explicit transport.
    pub fn with_transport(config: HostingConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token,
            transport,
        }
    }

    fn request_headers(&self, accept: &str) -> HttpHeaders {
        let mut headers: HttpHeaders = vec![
            ("accept".to_string(), accept.to_string()),
            ("user-agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(token) = &self.token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }

    async fn get(&self, url: String, accept: &str) -> Result<HttpResponse> {
        let request = HttpRequest {
            url,
            headers: self.request_headers(accept),
        };
        self.transport
            .get(request)
            .await
            .map_err(|e| HostingError::transport(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, resource: &str) -> Result<T> {
        let response = self.get(url, MEDIA_TYPE_JSON).await?;
        match response.status {
            200..=299 => serde_json::from_slice(&response.body).map_err(|e| {
                HostingError::remote(response.status, format!("invalid JSON body: {e}"))
            }),
            _ => Err(error_from_response(&response, resource)),
        }
    }
}

/// Translate a non-2xx response into the error taxonomy.
fn error_from_response(response: &HttpResponse, resource: &str) -> HostingError {
    let message = serde_json::from_slice::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| "unexpected status".to_string());

    match response.status {
        401 => HostingError::Unauthorized,
        404 => HostingError::not_found(resource),
        403 | 429 if is_rate_limit_response(response, &message) => HostingError::RateLimited {
            reset_at: parse_rate_limit_reset(response),
        },
        status => HostingError::remote(status, message),
    }
}

/// A 403/429 is a rate limit when the remaining-requests header reads zero
/// or the host's message says so.
fn is_rate_limit_response(response: &HttpResponse, message: &str) -> bool {
    response
        .header("x-ratelimit-remaining")
        .is_some_and(|v| v.trim() == "0")
        || message.to_lowercase().contains("rate limit")
}

fn parse_rate_limit_reset(response: &HttpResponse) -> Option<DateTime<Utc>> {
    response
        .header("x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
}

#[async_trait]
impl HostingApi for HostingClient {
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RemoteRepo> {
        let url = format!("{}/repos/{}/{}", self.api_base, owner, name);
        self.get_json(url, &format!("{owner}/{name}")).await
    }

    async fn get_repository_by_id(&self, id: i64) -> Result<RemoteRepo> {
        let url = format!("{}/repositories/{}", self.api_base, id);
        self.get_json(url, &format!("repository id {id}")).await
    }

    async fn search_repositories(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let mut url = Url::parse(&format!("{}/search/repositories", self.api_base))
            .map_err(|e| HostingError::transport(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(sort) = options.sort {
                pairs.append_pair("sort", sort.as_str());
                pairs.append_pair("order", "desc");
            }
            pairs.append_pair("page", &options.page.to_string());
            pairs.append_pair("per_page", &options.per_page.to_string());
        }
        self.get_json(url.into(), &format!("search '{query}'")).await
    }

    async fn get_readme(&self, owner: &str, name: &str) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/{}/readme", self.api_base, owner, name);
        let response = self.get(url, MEDIA_TYPE_RAW).await?;
        match response.status {
            200..=299 => Ok(Some(String::from_utf8_lossy(&response.body).into_owned())),
            // A repository without a README is data, not a failure
            404 => Ok(None),
            _ => Err(error_from_response(
                &response,
                &format!("{owner}/{name} readme"),
            )),
        }
    }

    async fn get_languages(&self, owner: &str, name: &str) -> Result<HashMap<String, i64>> {
        let url = format!("{}/repos/{}/{}/languages", self.api_base, owner, name);
        self.get_json(url, &format!("{owner}/{name} languages"))
            .await
    }

    async fn get_user_repositories(
        &self,
        username: &str,
        options: &ListOptions,
    ) -> Result<Vec<RemoteRepo>> {
        let url = format!(
            "{}/users/{}/repos?page={}&per_page={}",
            self.api_base, username, options.page, options.per_page
        );
        self.get_json(url, &format!("user {username}")).await
    }

    async fn get_rate_limit_status(&self) -> Result<RateLimitStatus> {
        let url = format!("{}/rate_limit", self.api_base);
        self.get_json(url, "rate limit").await
    }
}
