//! S3 to Loggly Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the S3 to Loggly transcoder.
//!
//! # Overview
//!
//! - **Error Handling**: the three failure kinds a pipeline invocation can end in
//! - **Logging**: `tracing` subscriber setup driven by `LOG_*` environment variables
//!
//! # Example
//!
//! ```no_run
//! use s3_to_loggly_common::{Result, TranscodeError};
//!
//! fn require_token(token: Option<&str>) -> Result<&str> {
//!     token.ok_or_else(|| TranscodeError::configuration("no destination endpoint resolvable"))
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{ErrorKind, Result, TranscodeError};
