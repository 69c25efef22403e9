//! The per-event transcoding pipeline
//!
//! ```text
//! bucket tags -> endpoint -> object bytes -> text -> records -> JSON lines -> POST
//! ```
//!
//! Stages run strictly in order and the first failure ends the invocation,
//! so a payload is either forwarded whole or not at all.

use s3_to_loggly_common::Result;
use tracing::{error, info, instrument};

use crate::config::PipelineConfig;
use crate::decompression::decompress_gzip;
use crate::encoder::encode_json_lines;
use crate::endpoint::{DestinationEndpoint, EndpointResolver};
use crate::event::NotificationEvent;
use crate::forwarder::Forwarder;
use crate::record::parse_access_log;
use crate::storage::ObjectSource;

/// How a successful invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Zero-byte object, nothing fetched or sent
    Skipped,
    Forwarded {
        endpoint: DestinationEndpoint,
        records: usize,
    },
}

pub struct Pipeline<S> {
    source: S,
    resolver: EndpointResolver,
    forwarder: Forwarder,
}

impl<S: ObjectSource> Pipeline<S> {
    pub fn new(config: &PipelineConfig, source: S) -> Result<Self> {
        Ok(Self::with_parts(
            source,
            EndpointResolver::from_config(config),
            Forwarder::new(config.http_timeout_secs)?,
        ))
    }

    pub fn with_parts(source: S, resolver: EndpointResolver, forwarder: Forwarder) -> Self {
        Self {
            source,
            resolver,
            forwarder,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run every stage for one event
    #[instrument(skip(self), fields(bucket = %event.bucket, key = %event.key, size = event.size))]
    pub async fn process(&self, event: &NotificationEvent) -> Result<Outcome> {
        if event.is_empty() {
            info!("Skipping object of size zero");
            return Ok(Outcome::Skipped);
        }

        let tags = self.source.bucket_tags(&event.bucket).await?;
        let endpoint = self.resolver.resolve(&tags)?;

        let compressed = self.source.fetch_object(&event.bucket, &event.key).await?;
        let text = decompress_gzip(&compressed)?;
        drop(compressed);

        let records = parse_access_log(&text)?;
        let payload = encode_json_lines(&records)?;

        info!(endpoint = %endpoint, records = records.len(), "Using Loggly endpoint");
        self.forwarder.forward(&endpoint, payload).await?;

        Ok(Outcome::Forwarded {
            endpoint,
            records: records.len(),
        })
    }

    /// [`Pipeline::process`] plus the success or failure log line
    pub async fn handle(&self, event: &NotificationEvent) -> Result<Outcome> {
        let result = self.process(event).await;

        match &result {
            Ok(Outcome::Forwarded { endpoint, records }) => info!(
                bucket = %event.bucket,
                key = %event.key,
                endpoint = %endpoint,
                records,
                "Successfully uploaded {} to {}",
                event,
                endpoint
            ),
            Ok(Outcome::Skipped) => info!(
                bucket = %event.bucket,
                key = %event.key,
                "Skipped empty object {}",
                event
            ),
            Err(err) => error!(
                bucket = %event.bucket,
                key = %event.key,
                kind = %err.kind(),
                error = %err,
                "Unable to read {} and upload to Loggly",
                event
            ),
        }

        result
    }
}
