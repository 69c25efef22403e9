//! Process configuration
//!
//! Read once at startup and handed to the pipeline by value. Nothing here is
//! mutated afterwards, so concurrent invocations share it freely.

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::endpoint::{DestinationEndpoint, TOKEN_TAG};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Loggly bulk ingestion base URL. The token is appended directly.
pub const DEFAULT_LOGGLY_URL_BASE: &str = "https://logs-01.loggly.com/bulk/";

/// Default timeout for the forward request in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base ingestion URL, always ending in `/`
    pub url_base: String,

    /// Token used when the bucket carries no token tag (`LOGGLY_TOKEN`)
    pub default_token: Option<String>,

    /// Routing tag baked into the default endpoint (`LOGGLY_TAG`)
    pub default_tag: Option<String>,

    pub http_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            url_base: DEFAULT_LOGGLY_URL_BASE.to_string(),
            default_token: None,
            default_tag: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// - `LOGGLY_URL_BASE`: base ingestion URL
    /// - `LOGGLY_TOKEN`: default customer token
    /// - `LOGGLY_TAG`: default routing tag, only used together with the token
    /// - `LOGGLY_HTTP_TIMEOUT_SECS`: forward request timeout
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            url_base: std::env::var("LOGGLY_URL_BASE")
                .unwrap_or_else(|_| DEFAULT_LOGGLY_URL_BASE.to_string()),
            default_token: non_empty_var("LOGGLY_TOKEN"),
            default_tag: non_empty_var("LOGGLY_TAG"),
            http_timeout_secs: std::env::var("LOGGLY_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        }
        .normalized();

        config.validate()?;

        Ok(config)
    }

    /// Configuration pointing at another base URL, e.g. a mock server
    pub fn with_url_base(url_base: impl Into<String>) -> Self {
        Self {
            url_base: url_base.into(),
            ..Self::default()
        }
        .normalized()
    }

    pub fn default_token(mut self, token: impl Into<String>) -> Self {
        self.default_token = Some(token.into());
        self
    }

    pub fn default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = Some(tag.into());
        self
    }

    fn normalized(mut self) -> Self {
        if !self.url_base.ends_with('/') {
            self.url_base.push('/');
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let base = Url::parse(&self.url_base)
            .map_err(|e| anyhow::anyhow!("Invalid LOGGLY_URL_BASE '{}': {}", self.url_base, e))?;

        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!(
                "LOGGLY_URL_BASE must be an http(s) URL, got scheme '{}'",
                base.scheme()
            );
        }

        if let Some(ref token) = self.default_token {
            if token.contains('/') {
                anyhow::bail!("LOGGLY_TOKEN must not contain '/'");
            }
        }

        if self.http_timeout_secs == 0 {
            anyhow::bail!("LOGGLY_HTTP_TIMEOUT_SECS must be greater than 0");
        }

        if self.default_tag.is_some() && self.default_token.is_none() {
            tracing::warn!("LOGGLY_TAG is set without LOGGLY_TOKEN and will be ignored");
        }

        Ok(())
    }

    /// Endpoint used when a bucket has no token tag
    pub fn default_endpoint(&self) -> Option<DestinationEndpoint> {
        self.default_token.as_deref().map(|token| {
            DestinationEndpoint::compose(&self.url_base, token, self.default_tag.as_deref())
        })
    }

    /// Log which default endpoint this process starts with
    pub fn log_startup(&self) {
        match self.default_endpoint() {
            Some(endpoint) => info!(
                default_endpoint = %endpoint,
                "Default Loggly endpoint configured"
            ),
            None => info!(
                tag = TOKEN_TAG,
                "No default Loggly endpoint configured, buckets must carry the token tag"
            ),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_endpoint() {
        let config = PipelineConfig::default();
        assert_eq!(config.url_base, DEFAULT_LOGGLY_URL_BASE);
        assert!(config.default_endpoint().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_endpoint_with_token_and_tag() {
        let config = PipelineConfig::default()
            .default_token("TOKEN")
            .default_tag("alb");
        assert_eq!(
            config.default_endpoint().unwrap().as_str(),
            "https://logs-01.loggly.com/bulk/TOKEN/tag/alb"
        );
    }

    #[test]
    fn test_tag_without_token_gives_no_endpoint() {
        let config = PipelineConfig::default().default_tag("alb");
        assert!(config.default_endpoint().is_none());
    }

    #[test]
    fn test_url_base_gets_trailing_slash() {
        let config = PipelineConfig::with_url_base("http://127.0.0.1:8080/bulk");
        assert_eq!(config.url_base, "http://127.0.0.1:8080/bulk/");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::with_url_base("not a url").validate().is_err());
        assert!(PipelineConfig::with_url_base("ftp://logs.example.com/")
            .validate()
            .is_err());
        assert!(PipelineConfig::default()
            .default_token("abc/def")
            .validate()
            .is_err());

        let mut config = PipelineConfig::default();
        config.http_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
