//! Shared fixtures for pipeline integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use aws_lambda_events::event::s3::S3Event;
use flate2::write::GzEncoder;
use flate2::Compression;
use s3_to_loggly::config::PipelineConfig;
use s3_to_loggly::endpoint::BucketTags;
use s3_to_loggly::pipeline::Pipeline;
use s3_to_loggly::storage::ObjectSource;
use s3_to_loggly_common::{Result, TranscodeError};
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::MockServer;

/// A valid ALB access-log line
pub const ALB_LINE: &str = r#"http 2018-07-02T22:23:00.186641Z app/my-loadbalancer/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.000 0.001 0.000 200 200 34 366 "GET http://www.example.com:80/ HTTP/1.1" "curl/7.46.0" - - arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337262-36d228ad5d99923122bbe354""#;

/// JSON line the pipeline emits for [`ALB_LINE`]
pub const ALB_JSON: &str = r#"{"type":"http","timestamp":"2018-07-02T22:23:00.186641Z","elb":"app/my-loadbalancer/50dc6c495c0c9188","client:port":"192.168.131.39:2817","target:port":"10.0.0.1:80","request_processing_time":"0.000","target_processing_time":"0.001","response_processing_time":"0.000","elb_status_code":"200","target_status_code":"200","received_bytes":"34","sent_bytes":"366","request":"GET http://www.example.com:80/ HTTP/1.1","user_agent":"curl/7.46.0","ssl_cipher":"-","ssl_protocol":"-","target_group_arn":"arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067","trace_id":"Root=1-58337262-36d228ad5d99923122bbe354"}"#;

pub fn gzip(content: &str) -> Vec<u8> {
    gzip_bytes(content.as_bytes())
}

pub fn gzip_bytes(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

/// In-memory stand-in for S3 that counts calls
#[derive(Default)]
pub struct InMemoryBucket {
    tags: HashMap<String, BucketTags>,
    objects: HashMap<(String, String), Vec<u8>>,
    failing_tag_buckets: Vec<String>,
    tag_reads: AtomicUsize,
    fetches: AtomicUsize,
}

impl InMemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, bucket: &str, name: &str, value: &str) -> Self {
        self.tags
            .entry(bucket.to_string())
            .or_default()
            .insert(name, value);
        self
    }

    pub fn with_object(mut self, bucket: &str, key: &str, body: Vec<u8>) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), body);
        self
    }

    /// Tag reads for `bucket` fail as if access were denied
    pub fn with_tag_failure(mut self, bucket: &str) -> Self {
        self.failing_tag_buckets.push(bucket.to_string());
        self
    }

    pub fn tag_reads(&self) -> usize {
        self.tag_reads.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectSource for InMemoryBucket {
    async fn bucket_tags(&self, bucket: &str) -> Result<BucketTags> {
        self.tag_reads.fetch_add(1, Ordering::SeqCst);
        if self.failing_tag_buckets.iter().any(|b| b == bucket) {
            return Err(TranscodeError::dependency(format!(
                "Failed to read tags of bucket {}: AccessDenied",
                bucket
            )));
        }
        Ok(self.tags.get(bucket).cloned().unwrap_or_default())
    }

    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| {
                TranscodeError::dependency(format!(
                    "Failed to download s3://{}/{}: NoSuchKey",
                    bucket, key
                ))
            })
    }
}

/// Pipeline config whose ingestion base points at `server`
pub fn config_for(server: &MockServer) -> PipelineConfig {
    PipelineConfig::with_url_base(format!("{}/bulk/", server.uri()))
}

pub fn pipeline(config: &PipelineConfig, bucket: InMemoryBucket) -> Pipeline<InMemoryBucket> {
    Pipeline::new(config, bucket).unwrap()
}

/// S3 event notification with one record per `(bucket, key, size)`
pub fn s3_event(objects: &[(&str, &str, i64)]) -> S3Event {
    let records: Vec<serde_json::Value> = objects
        .iter()
        .map(|(bucket, key, size)| {
            serde_json::json!({
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "us-east-1",
                "eventTime": "2024-01-01T00:05:00.000Z",
                "eventName": "ObjectCreated:Put",
                "userIdentity": { "principalId": "AWS:EXAMPLE" },
                "requestParameters": { "sourceIPAddress": "127.0.0.1" },
                "responseElements": {},
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "configurationId": "alb-logs",
                    "bucket": {
                        "name": bucket,
                        "ownerIdentity": { "principalId": "EXAMPLE" },
                        "arn": format!("arn:aws:s3:::{}", bucket)
                    },
                    "object": {
                        "key": key,
                        "size": size,
                        "eTag": "0123456789abcdef0123456789abcdef",
                        "sequencer": "0A1B2C3D4E5F678901"
                    }
                }
            })
        })
        .collect();

    serde_json::from_value(serde_json::json!({ "Records": records })).unwrap()
}

/// Collects formatted log output on the current thread
///
/// Logging goes to the capture until the returned guard is dropped.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    /// Lines containing every one of `needles`
    pub fn lines_with(&self, needles: &[&str]) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| needles.iter().all(|needle| line.contains(needle)))
            .map(str::to_string)
            .collect()
    }
}

pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}
