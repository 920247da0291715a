//! Hosting API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when talking to the hosting API.
///
/// A closed taxonomy translated from transport failures and HTTP status
/// codes; callers match on variants rather than inspecting messages.
#[derive(Debug, Clone, Error)]
pub enum HostingError {
    /// The host returned 404 for the requested resource.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The host refused the request because the rate limit is exhausted
    /// (403/429 with a rate-limit signal). Carries the reset time when the
    /// host reported one.
    #[error("Rate limit exceeded")]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// The host returned 401.
    #[error("Authentication required")]
    Unauthorized,

    /// Any other non-2xx status, carrying the host's message.
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Connection or timeout failure before a status was obtained.
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl HostingError {
    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a remote error.
    #[inline]
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Check if this error is a rate limit error (retryable by callers).
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Check if this error means the resource does not exist upstream.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which is useful for errors
/// that include multi-line details. This provides a concise message for
/// progress reporting and the snapshot's `sync_error` field.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for hosting operations.
pub type Result<T> = std::result::Result<T, HostingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_rate_limited_only_for_rate_limit_variant() {
        let rate_limited = HostingError::RateLimited { reset_at: None };
        assert!(rate_limited.is_rate_limited());

        assert!(!HostingError::not_found("acme/widget").is_rate_limited());
        assert!(!HostingError::Unauthorized.is_rate_limited());
        assert!(!HostingError::remote(500, "boom").is_rate_limited());
        assert!(!HostingError::transport("timed out").is_rate_limited());
    }

    #[test]
    fn is_not_found_only_for_not_found_variant() {
        assert!(HostingError::not_found("acme/widget").is_not_found());
        assert!(!HostingError::Unauthorized.is_not_found());
    }

    #[test]
    fn display_messages_carry_context() {
        let err = HostingError::remote(502, "bad gateway");
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));

        let err = HostingError::not_found("repos/acme/widget");
        assert!(err.to_string().contains("repos/acme/widget"));
    }

    #[test]
    fn short_error_message_takes_first_line() {
        let err = std::io::Error::other("first line\nsecond line");
        assert_eq!(short_error_message(&err), "first line");
    }
}
