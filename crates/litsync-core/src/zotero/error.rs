//! Typed errors for Zotero API access

use thiserror::Error;

/// Errors raised while talking to the Zotero API
#[derive(Debug, Error)]
pub enum ZoteroError {
    /// Web API mode without an API key or library id
    #[error("missing Zotero credentials: {0} (set it in the config file or the environment)")]
    MissingCredentials(&'static str),

    /// Non-success HTTP status
    #[error("Zotero API returned {status} for {url}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
        /// Response body (truncated)
        body: String,
    },

    /// Retries exhausted while the server kept asking to back off
    #[error("Zotero API still rate limiting after {0} retries")]
    RateLimited(u32),

    /// Transport failure
    #[error("request to Zotero failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ZoteroError {
    /// Whether retrying with the same credentials cannot succeed
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. } | Self::MissingCredentials(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_classification() {
        let forbidden = ZoteroError::Status {
            status: 403,
            url: "https://api.zotero.org/users/1/items/top".to_string(),
            body: "Forbidden".to_string(),
        };
        let missing = ZoteroError::MissingCredentials("zotero.api_key");
        let server = ZoteroError::Status {
            status: 500,
            url: String::new(),
            body: String::new(),
        };

        assert!(forbidden.is_auth_error());
        assert!(missing.is_auth_error());
        assert!(!server.is_auth_error());
        assert!(forbidden.to_string().contains("403"));
    }
}
