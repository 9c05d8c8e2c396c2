//! `scenegen-worker` -- submit a batch of scene generation requests.
//!
//! Usage: `scenegen-worker <csv_file> [interval_seconds]`
//!
//! Parses the input CSV, creates a fresh `test-<timestamp>` batch directory
//! under `DATA_DIR`, and submits every row to the generation API one at a
//! time. Completed images arrive later through the `scenegen-api` callback
//! server. See [`WorkerConfig::from_env`] for the environment variables.
//!
//! The task index built here only lives for this run and feeds the final
//! summary. The callback server is a separate process; it rehydrates its
//! own index from the data root at startup and scans for tasks created
//! after that.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scenegen_client::api::SceneGenApi;
use scenegen_core::batch::Batch;
use scenegen_core::correlator::TaskIndex;
use scenegen_core::input::parse_rows;
use scenegen_worker::config::WorkerConfig;
use scenegen_worker::submitter::SubmissionLoop;

const USAGE: &str = "Usage: scenegen-worker <csv_file> [interval_seconds]";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenegen_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Batch run failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let csv_path = args.next().context(USAGE)?;

    let mut config = WorkerConfig::from_env()?;
    if let Some(raw) = args.next() {
        if config.apply_interval_arg(&raw) {
            tracing::info!(
                interval_secs = config.policy.request_interval.as_secs(),
                "Using custom request interval",
            );
        }
    }

    let text = tokio::fs::read_to_string(&csv_path)
        .await
        .with_context(|| format!("Failed to read input file {csv_path}"))?;
    let input = parse_rows(&text).context("Failed to parse input file")?;
    for skipped in &input.skipped {
        tracing::warn!(line = skipped.line, reason = %skipped.reason, "Skipping input row");
    }

    let batch = Batch::create(&config.data_dir, &chrono::Local::now())
        .await
        .context("Failed to create batch directory")?;
    tracing::info!(batch = batch.name(), rows = input.rows.len(), "Created batch directory");

    let api = SceneGenApi::new(config.api_url.clone(), config.submit_timeout)?;
    let index = Arc::new(TaskIndex::new(config.data_dir.clone()));
    let report = SubmissionLoop::new(api, batch, config.callback_url.clone())
        .with_policy(config.policy.clone())
        .with_index(Arc::clone(&index))
        .run(&input.rows)
        .await;

    for task_id in report.accepted_task_ids() {
        tracing::debug!(task_id, "Awaiting callback");
    }
    tracing::info!(
        registered = index.len().await,
        abandoned = report.abandoned(),
        "Batch run finished",
    );
    Ok(())
}
