//! S3 to Loggly - forwards ALB access logs from S3 to Loggly

use anyhow::Result;
use clap::{Parser, Subcommand};
use s3_to_loggly::{
    config::PipelineConfig,
    event::load_s3_event,
    lambda,
    pipeline::Pipeline,
    storage::{S3Storage, StorageConfig},
};
use s3_to_loggly_common::logging::{init_logging, LogConfig, LogLevel};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "s3-to-loggly")]
#[command(author, version, about = "Forward ALB access logs from S3 to Loggly")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve S3 notifications from the AWS Lambda runtime (default)
    Lambda,

    /// Process an S3 event notification read from a JSON file
    Process {
        /// Path to the S3 event JSON
        #[arg(short, long)]
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Lambda);

    let mut log_config = match command {
        Command::Lambda => LogConfig::for_lambda(),
        Command::Process { .. } => LogConfig::new(),
    };
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    // Environment variables take precedence
    let log_config = log_config.merge_env()?;
    let _guard = init_logging(&log_config)?;

    let config = PipelineConfig::from_env()?;
    config.log_startup();

    let storage = S3Storage::new(StorageConfig::from_env()).await?;
    let pipeline = Pipeline::new(&config, storage)?;

    match command {
        Command::Lambda => {
            info!("Starting Lambda runtime");
            lambda::run(pipeline)
                .await
                .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e))?;
        },
        Command::Process { event } => {
            let s3_event = load_s3_event(&event)?;
            let report = lambda::handle_s3_event(&pipeline, &s3_event).await?;
            info!(
                forwarded = report.forwarded,
                skipped = report.skipped,
                "Processed {}",
                event.display()
            );
        },
    }

    Ok(())
}
