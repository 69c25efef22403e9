//! S3 to Loggly
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Forwards Application Load Balancer access logs written to S3 into Loggly.
//!
//! For every object-created notification the pipeline:
//!
//! 1. resolves the Loggly endpoint from the bucket's tags ([`endpoint`])
//! 2. downloads the object ([`storage`])
//! 3. gunzips it ([`decompression`])
//! 4. parses each log line into an [`record::AccessLogRecord`]
//! 5. encodes the records as JSON lines ([`encoder`])
//! 6. posts the result to Loggly ([`forwarder`])
//!
//! # Example
//!
//! ```no_run
//! use s3_to_loggly::config::PipelineConfig;
//! use s3_to_loggly::event::NotificationEvent;
//! use s3_to_loggly::pipeline::Pipeline;
//! use s3_to_loggly::storage::{S3Storage, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::from_env()?;
//!     let storage = S3Storage::new(StorageConfig::from_env()).await?;
//!     let pipeline = Pipeline::new(&config, storage)?;
//!
//!     let event = NotificationEvent::new("logs-1", "alb/2024/01/01/x.log.gz", 512);
//!     pipeline.handle(&event).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decompression;
pub mod encoder;
pub mod endpoint;
pub mod event;
pub mod forwarder;
pub mod lambda;
pub mod pipeline;
pub mod record;
pub mod storage;
