//! Application Load Balancer access-log records
//!
//! # Format
//! One entry per line, fields separated by single spaces. The request and
//! user agent are double-quoted and may contain spaces:
//!
//! ```text
//! http 2018-07-02T22:23:00.186641Z app/my-lb/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.000 0.001 0.000 200 200 34 366 "GET http://www.example.com:80/ HTTP/1.1" "curl/7.46.0" - - arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337262-36d228ad5d99923122bbe354"
//! ```
//!
//! See <https://docs.aws.amazon.com/elasticloadbalancing/latest/application/load-balancer-access-logs.html>.
//! Values are kept as the exact text from the log, numbers included.

use s3_to_loggly_common::{Result, TranscodeError};
use serde::Serialize;
use tracing::debug;

/// Column names in log order, as they appear in the emitted JSON
pub const COLUMNS: [&str; COLUMN_COUNT] = [
    "type",
    "timestamp",
    "elb",
    "client:port",
    "target:port",
    "request_processing_time",
    "target_processing_time",
    "response_processing_time",
    "elb_status_code",
    "target_status_code",
    "received_bytes",
    "sent_bytes",
    "request",
    "user_agent",
    "ssl_cipher",
    "ssl_protocol",
    "target_group_arn",
    "trace_id",
];

pub const COLUMN_COUNT: usize = 18;

/// One access-log entry
///
/// Field declaration order is the serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessLogRecord {
    #[serde(rename = "type")]
    pub request_type: String,
    pub timestamp: String,
    pub elb: String,
    #[serde(rename = "client:port")]
    pub client: String,
    #[serde(rename = "target:port")]
    pub target: String,
    pub request_processing_time: String,
    pub target_processing_time: String,
    pub response_processing_time: String,
    pub elb_status_code: String,
    pub target_status_code: String,
    pub received_bytes: String,
    pub sent_bytes: String,
    pub request: String,
    pub user_agent: String,
    pub ssl_cipher: String,
    pub ssl_protocol: String,
    pub target_group_arn: String,
    pub trace_id: String,
}

impl AccessLogRecord {
    /// Bind tokenized fields to columns
    ///
    /// `line` is only used for the error message.
    pub fn from_fields<'a, I>(fields: I, line: u64) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let fields: Vec<&str> = fields.into_iter().collect();
        let fields: [&str; COLUMN_COUNT] = fields.try_into().map_err(|fields: Vec<&str>| {
            TranscodeError::format(format!(
                "line {}: expected {} fields, got {}",
                line,
                COLUMN_COUNT,
                fields.len()
            ))
        })?;

        let [
            request_type,
            timestamp,
            elb,
            client,
            target,
            request_processing_time,
            target_processing_time,
            response_processing_time,
            elb_status_code,
            target_status_code,
            received_bytes,
            sent_bytes,
            request,
            user_agent,
            ssl_cipher,
            ssl_protocol,
            target_group_arn,
            trace_id,
        ] = fields.map(str::to_string);

        Ok(Self {
            request_type,
            timestamp,
            elb,
            client,
            target,
            request_processing_time,
            target_processing_time,
            response_processing_time,
            elb_status_code,
            target_status_code,
            received_bytes,
            sent_bytes,
            request,
            user_agent,
            ssl_cipher,
            ssl_protocol,
            target_group_arn,
            trace_id,
        })
    }
}

/// Parse decompressed log text into records
///
/// Blank lines are ignored. Any line that does not tokenize into exactly
/// [`COLUMN_COUNT`] fields rejects the whole batch.
pub fn parse_access_log(text: &str) -> Result<Vec<AccessLogRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut row = csv::StringRecord::new();

    loop {
        let has_row = reader
            .read_record(&mut row)
            .map_err(|e| TranscodeError::format(format!("Failed to tokenize access log: {}", e)))?;
        if !has_row {
            break;
        }

        let line = row.position().map(|p| p.line()).unwrap_or_default();
        records.push(AccessLogRecord::from_fields(row.iter(), line)?);
    }

    debug!("Parsed {} access log records", records.len());

    Ok(records)
}
