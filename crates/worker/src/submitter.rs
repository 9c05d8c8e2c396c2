//! Submission Loop: push every input row to the generation API, one at a
//! time.
//!
//! Each row gets up to [`RetryPolicy::max_attempts`] attempts. A
//! rate-limited attempt waits `retry_wait_base * attempt` before retrying;
//! any other failure abandons the row at once. Rows are separated by the
//! fixed [`RetryPolicy::request_interval`] whatever their outcome, and that
//! pacing is what keeps the aggregate request rate under the remote limit.
//!
//! An accepted request gets its task directory and descriptor record
//! written immediately so the later callback can be correlated.

use std::sync::Arc;

use async_trait::async_trait;
use scenegen_client::api::{SceneGenApi, SubmitError};
use scenegen_client::messages::{SubmitRequest, SubmitResponse};
use scenegen_core::batch::Batch;
use scenegen_core::correlator::TaskIndex;
use scenegen_core::input::SceneRow;
use scenegen_core::retry::RetryPolicy;

/// Anything that can submit a generation request.
#[async_trait]
pub trait SceneSubmitter: Send + Sync {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, SubmitError>;
}

#[async_trait]
impl<T: SceneSubmitter + ?Sized> SceneSubmitter for Arc<T> {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, SubmitError> {
        (**self).submit(request).await
    }
}

#[async_trait]
impl SceneSubmitter for SceneGenApi {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, SubmitError> {
        SceneGenApi::submit(self, request).await
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What happened to one input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The API accepted the request and the task record was written.
    Accepted { task_id: String, attempts: u32 },
    /// Every allowed attempt was rate limited.
    RateLimited { attempts: u32 },
    /// A non-rate-limit failure; the row was abandoned.
    Failed { attempts: u32, error: String },
}

/// Outcome of one row, by 0-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub row: usize,
    pub outcome: RowOutcome,
}

/// Summary of one run of the loop.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub batch: String,
    pub rows: Vec<RowReport>,
}

impl BatchReport {
    /// Task ids of accepted rows, in input order.
    pub fn accepted_task_ids(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|r| match &r.outcome {
                RowOutcome::Accepted { task_id, .. } => Some(task_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of rows that were not accepted.
    pub fn abandoned(&self) -> usize {
        self.rows.len() - self.accepted_task_ids().len()
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

/// Sequential, rate-limit aware submission of a batch of rows.
pub struct SubmissionLoop<S> {
    submitter: S,
    batch: Batch,
    callback_url: String,
    policy: RetryPolicy,
    index: Option<Arc<TaskIndex>>,
}

impl<S: SceneSubmitter> SubmissionLoop<S> {
    /// Create a loop writing accepted tasks into `batch`, asking the remote
    /// API to call back on `callback_url`.
    pub fn new(submitter: S, batch: Batch, callback_url: impl Into<String>) -> Self {
        Self {
            submitter,
            batch,
            callback_url: callback_url.into(),
            policy: RetryPolicy::default(),
            index: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register accepted tasks in `index` as they are created.
    pub fn with_index(mut self, index: Arc<TaskIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Submit every row in order. Never fails: per-row problems are logged
    /// and recorded in the returned report.
    pub async fn run(&self, rows: &[SceneRow]) -> BatchReport {
        let mut report = BatchReport {
            batch: self.batch.name().to_string(),
            rows: Vec::with_capacity(rows.len()),
        };

        for (i, row) in rows.iter().enumerate() {
            tracing::info!(
                row = i + 1,
                total = rows.len(),
                app_id = row.app_id,
                scenes = row.scenes.len(),
                "Submitting generation request",
            );

            let outcome = self.submit_row(row).await;
            report.rows.push(RowReport { row: i, outcome });

            if let Some(delay) = self.policy.pacing_after(i, rows.len()) {
                tracing::info!(delay_secs = delay.as_secs(), "Waiting before next request");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::info!(
            batch = %report.batch,
            accepted = report.accepted_task_ids().len(),
            abandoned = report.abandoned(),
            "All requests sent",
        );
        report
    }

    async fn submit_row(&self, row: &SceneRow) -> RowOutcome {
        let request = SubmitRequest::from_row(row, &self.callback_url);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let error = match self.attempt(row, &request).await {
                Ok(task_id) => {
                    return RowOutcome::Accepted {
                        task_id,
                        attempts: attempt,
                    }
                }
                Err(e) => e,
            };

            if !error.is_rate_limited() {
                tracing::error!(attempt, error = %error, "Submission failed, abandoning row");
                return RowOutcome::Failed {
                    attempts: attempt,
                    error: error.to_string(),
                };
            }

            match self.policy.rate_limit_wait(attempt) {
                Some(wait) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        wait_secs = wait.as_secs(),
                        "Rate limited, retrying after wait",
                    );
                    tokio::time::sleep(wait).await;
                }
                None => {
                    tracing::warn!(
                        attempts = attempt,
                        error = %error,
                        "Still rate limited after all attempts, abandoning row",
                    );
                    return RowOutcome::RateLimited { attempts: attempt };
                }
            }
        }
    }

    /// One submission plus persistence of the task record.
    async fn attempt(&self, row: &SceneRow, request: &SubmitRequest) -> Result<String, SubmitError> {
        let response = self.submitter.submit(request).await?;
        let task_dir = self
            .batch
            .create_task(&response.task_id, &row.role_desc, &row.scenes)
            .await?;

        if let Some(index) = &self.index {
            index.register(response.task_id.clone(), task_dir).await;
        }

        tracing::info!(
            task_id = %response.task_id,
            queue_count = response.queue_count,
            "Task created",
        );
        Ok(response.task_id)
    }
}
