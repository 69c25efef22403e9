//! HTTP forwarding to the Loggly bulk endpoint

use reqwest::{header::CONTENT_TYPE, Client};
use s3_to_loggly_common::{Result, TranscodeError};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::endpoint::DestinationEndpoint;

/// Longest slice of an error response body kept in the error message
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Posts encoded payloads, one attempt per call
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
}

impl Forwarder {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranscodeError::dependency(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST `payload` to `endpoint`
    ///
    /// Transport failures and non-2xx responses are dependency errors. The
    /// response body is read to the end so a broken stream also fails here.
    #[instrument(skip(self, payload), fields(endpoint = %endpoint, bytes = payload.len()))]
    pub async fn forward(&self, endpoint: &DestinationEndpoint, payload: String) -> Result<()> {
        let response = self
            .client
            .post(endpoint.as_str())
            .header(CONTENT_TYPE, "text/plain")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                TranscodeError::dependency(format!("Failed to post to {}: {}", endpoint, e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            TranscodeError::dependency(format!("Failed to read response from {}: {}", endpoint, e))
        })?;

        if !status.is_success() {
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(TranscodeError::dependency(format!(
                "{} responded with {}: {}",
                endpoint, status, body
            )));
        }

        debug!(%status, response = %body, "Loggly accepted payload");

        Ok(())
    }
}
