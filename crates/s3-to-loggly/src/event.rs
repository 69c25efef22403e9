//! Notification events
//!
//! The trigger delivers an S3 event notification. Each record in it names
//! one written object and becomes one [`NotificationEvent`].

use std::path::Path;

use anyhow::Context;
use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use s3_to_loggly_common::{Result, TranscodeError};

/// One newly written object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub bucket: String,
    /// Object key, already URL-decoded
    pub key: String,
    pub size: u64,
}

impl NotificationEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, size: u64) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size,
        }
    }

    /// Build from one record of an S3 event
    ///
    /// Keys arrive form-encoded (`+` for space, `%xx` escapes).
    pub fn from_record(record: &S3EventRecord) -> Result<Self> {
        let bucket = record
            .s3
            .bucket
            .name
            .clone()
            .ok_or_else(|| TranscodeError::format("S3 event record has no bucket name"))?;

        let raw_key = record
            .s3
            .object
            .key
            .as_deref()
            .ok_or_else(|| TranscodeError::format("S3 event record has no object key"))?;

        let size = record
            .s3
            .object
            .size
            .ok_or_else(|| TranscodeError::format("S3 event record has no object size"))?;

        Ok(Self {
            bucket,
            key: decode_key(raw_key)?,
            size: u64::try_from(size).map_err(|_| {
                TranscodeError::format(format!("S3 event record has negative size {}", size))
            })?,
        })
    }

    /// Zero-byte objects are skipped without fetching
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

fn decode_key(raw: &str) -> Result<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|key| key.into_owned())
        .map_err(|e| TranscodeError::format(format!("Invalid object key '{}': {}", raw, e)))
}

/// Read an S3 event notification from a JSON file
pub fn load_s3_event(path: &Path) -> anyhow::Result<S3Event> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse S3 event from {}", path.display()))
}
