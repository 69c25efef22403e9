//! Destination endpoint resolution
//!
//! A bucket opts into forwarding by carrying the `loggly-customer-token` tag,
//! and may add `loggly-tag` to route its events under a Loggly tag:
//!
//! ```text
//! loggly-customer-token = ABC123            -> <base>ABC123
//! loggly-customer-token = ABC123, loggly-tag = alb -> <base>ABC123/tag/alb
//! ```
//!
//! Buckets without the token fall back to the process default endpoint.

use std::collections::BTreeMap;

use s3_to_loggly_common::{Result, TranscodeError};

use crate::config::PipelineConfig;

/// Bucket tag holding the Loggly customer token
pub const TOKEN_TAG: &str = "loggly-customer-token";

/// Bucket tag holding the optional Loggly routing tag
pub const ROUTING_TAG: &str = "loggly-tag";

/// Tags attached to a bucket, fetched fresh for every invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketTags(BTreeMap<String, String>);

impl BucketTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, treating an empty value as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BucketTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Fully composed ingestion URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationEndpoint(String);

impl DestinationEndpoint {
    /// `base + token`, plus `/tag/<tag>` when a routing tag is given
    pub fn compose(base: &str, token: &str, tag: Option<&str>) -> Self {
        let mut url = format!("{}{}", base, token);
        if let Some(tag) = tag.filter(|t| !t.is_empty()) {
            url.push_str("/tag/");
            url.push_str(tag);
        }
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DestinationEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a bucket's tags into the endpoint its logs go to
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    url_base: String,
    default_endpoint: Option<DestinationEndpoint>,
}

impl EndpointResolver {
    pub fn new(url_base: impl Into<String>, default_endpoint: Option<DestinationEndpoint>) -> Self {
        Self {
            url_base: url_base.into(),
            default_endpoint,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.url_base.clone(), config.default_endpoint())
    }

    /// Resolve the endpoint for a bucket
    ///
    /// The routing tag is only honoured together with the token tag; a bucket
    /// with a routing tag but no token gets the default endpoint unchanged.
    pub fn resolve(&self, tags: &BucketTags) -> Result<DestinationEndpoint> {
        if let Some(token) = tags.get(TOKEN_TAG) {
            return Ok(DestinationEndpoint::compose(
                &self.url_base,
                token,
                tags.get(ROUTING_TAG),
            ));
        }

        self.default_endpoint.clone().ok_or_else(|| {
            TranscodeError::configuration(format!(
                "no destination endpoint resolvable: set the bucket tag {} or LOGGLY_TOKEN",
                TOKEN_TAG
            ))
        })
    }
}
