//! Gzip decoding of fetched objects
//!
//! Objects are decoded whole. A truncated or corrupt stream fails the
//! invocation before any record is parsed.

use flate2::read::MultiGzDecoder;
use s3_to_loggly_common::{Result, TranscodeError};
use std::io::Read;
use tracing::{debug, warn};

/// Decompress gzip data into text
///
/// Concatenated gzip members are decoded one after another. Bytes that are
/// not valid UTF-8 are replaced with U+FFFD rather than failing the object.
pub fn decompress_gzip(data: &[u8]) -> Result<String> {
    let mut decoder = MultiGzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| TranscodeError::format(format!("Failed to decompress gzip data: {}", e)))?;
    debug!("Decompressed {} -> {} bytes", data.len(), decompressed.len());

    Ok(match String::from_utf8(decompressed) {
        Ok(text) => text,
        Err(e) => {
            let text = String::from_utf8_lossy(e.as_bytes()).into_owned();
            let replaced = text.matches(char::REPLACEMENT_CHARACTER).count();
            warn!(
                replaced,
                valid_up_to = e.utf8_error().valid_up_to(),
                "Decompressed log is not valid UTF-8, replaced invalid sequences"
            );
            text
        },
    })
}
