//! AWS Lambda entry point
//!
//! Each record of the incoming S3 event is one independent invocation of the
//! pipeline. A failed record does not stop the ones after it, but makes the
//! whole Lambda invocation fail so the trigger's retry policy applies.

use std::sync::Arc;

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{service_fn, LambdaEvent};
use s3_to_loggly_common::{Result, TranscodeError};
use tracing::{error, info, warn};

use crate::event::NotificationEvent;
use crate::pipeline::{Outcome, Pipeline};
use crate::storage::ObjectSource;

/// Tally of one S3 event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventReport {
    pub forwarded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Process every record of an S3 event
///
/// Records are converted and run one at a time, so a malformed record does
/// not keep the others from being forwarded. Returns the first error when
/// any record failed; every failure has already been logged.
pub async fn handle_s3_event<S: ObjectSource>(
    pipeline: &Pipeline<S>,
    event: &S3Event,
) -> Result<EventReport> {
    if event.records.is_empty() {
        warn!("S3 event carried no records");
    }

    let mut report = EventReport::default();
    let mut first_error: Option<TranscodeError> = None;

    for record in &event.records {
        let result = match NotificationEvent::from_record(record) {
            Ok(notification) => pipeline.handle(&notification).await,
            Err(err) => {
                error!(
                    bucket = record.s3.bucket.name.as_deref().unwrap_or("-"),
                    key = record.s3.object.key.as_deref().unwrap_or("-"),
                    kind = %err.kind(),
                    error = %err,
                    "Unable to read S3 event record"
                );
                Err(err)
            },
        };

        match result {
            Ok(Outcome::Forwarded { .. }) => report.forwarded += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(err) => {
                report.failed += 1;
                if first_error.is_none() {
                    first_error = Some(err);
                }
            },
        }
    }

    info!(
        forwarded = report.forwarded,
        skipped = report.skipped,
        failed = report.failed,
        "Processed S3 event"
    );

    match first_error {
        Some(err) => Err(err),
        None => Ok(report),
    }
}

/// Serve S3 events from the Lambda runtime until it shuts down
pub async fn run<S: ObjectSource + 'static>(
    pipeline: Pipeline<S>,
) -> std::result::Result<(), lambda_runtime::Error> {
    let pipeline = Arc::new(pipeline);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Event>| {
        let pipeline = Arc::clone(&pipeline);
        async move {
            handle_s3_event(&pipeline, &event.payload).await?;
            Ok::<(), lambda_runtime::Error>(())
        }
    }))
    .await
}
