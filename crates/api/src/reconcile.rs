//! Callback reconciliation: turn a completion callback into image files in
//! the task's directory.
//!
//! Steps for a successful callback: locate the task directory, read the
//! recorded scene list, map each delivery to a file stem, then download
//! every image. One failing image does not stop the rest. Callbacks for the
//! same task are serialized so concurrent deliveries cannot interleave
//! writes to the same files.

use std::path::PathBuf;
use std::sync::Arc;

use scenegen_client::fetch::ImageFetcher;
use scenegen_client::messages::CallbackRequest;
use scenegen_core::correlator::TaskIndex;
use scenegen_core::descriptor;
use scenegen_core::error::CoreError;
use scenegen_core::locks::TaskLocks;
use scenegen_core::mapping::{MappedResult, PositionalMapper, ResultMapper};
use scenegen_core::naming::fallback_stem;

/// What a callback amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The remote side reported failure; nothing was written.
    TaskFailed,
    /// No task directory exists for the id; nothing was written.
    NotFound,
    /// Deliveries were processed.
    Reconciled {
        /// Files written, in delivery order.
        written: Vec<PathBuf>,
        /// Deliveries that could not be downloaded or written.
        failed: usize,
    },
}

/// Applies completion callbacks to the data root.
pub struct Reconciler {
    index: Arc<TaskIndex>,
    fetcher: ImageFetcher,
    mapper: Arc<dyn ResultMapper>,
    locks: TaskLocks,
}

impl Reconciler {
    /// Create a reconciler using the positional scene mapping.
    pub fn new(index: Arc<TaskIndex>, fetcher: ImageFetcher) -> Self {
        Self::with_mapper(index, fetcher, Arc::new(PositionalMapper))
    }

    pub fn with_mapper(
        index: Arc<TaskIndex>,
        fetcher: ImageFetcher,
        mapper: Arc<dyn ResultMapper>,
    ) -> Self {
        Self {
            index,
            fetcher,
            mapper,
            locks: TaskLocks::new(),
        }
    }

    /// Apply one callback. Never fails: every problem is logged and
    /// reflected in the outcome.
    pub async fn reconcile(&self, callback: &CallbackRequest) -> ReconcileOutcome {
        let task_id = callback.task_id.as_str();

        if !callback.is_success() {
            tracing::warn!(task_id, msg = %callback.msg, "Task reported failure");
            return ReconcileOutcome::TaskFailed;
        }

        let task_dir = match self.index.locate(task_id).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(task_id, error = %e, "No directory for task");
                return ReconcileOutcome::NotFound;
            }
        };

        let scenes = match descriptor::read_scenes(&task_dir).await {
            Ok(scenes) => scenes,
            Err(CoreError::Malformed(detail)) => {
                tracing::warn!(task_id, %detail, "Descriptor has no scene list, using fallback names");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(task_id, error = %e, "Descriptor unreadable, using fallback names");
                Vec::new()
            }
        };

        let guard = self.locks.acquire(task_id).await;

        let deliveries = callback.deliveries();
        let mapped = self.mapper.map(&scenes, &deliveries);

        let mut written = Vec::with_capacity(mapped.len());
        let mut failed = 0;
        for result in &mapped {
            let stem = self.stem_for(task_id, result);
            match self
                .fetcher
                .materialize(&result.url, &task_dir, &stem)
                .await
            {
                Ok(path) => written.push(path),
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        task_id,
                        url = %result.url,
                        stem = %stem,
                        error = %e,
                        "Image download failed",
                    );
                }
            }
        }

        drop(guard);
        self.locks.prune().await;

        tracing::info!(
            task_id,
            written = written.len(),
            failed,
            "Callback reconciled",
        );
        ReconcileOutcome::Reconciled { written, failed }
    }

    /// The mapped stem, unless it would land on the descriptor record, in
    /// which case the delivery gets the fallback name.
    fn stem_for(&self, task_id: &str, result: &MappedResult) -> String {
        let file_name = self.fetcher.file_name(&result.url, &result.stem);
        if file_name.eq_ignore_ascii_case(descriptor::DESCRIPTOR_FILE) {
            tracing::warn!(task_id, stem = %result.stem, "Image name collides with descriptor record");
            return fallback_stem(result.index);
        }
        result.stem.clone()
    }
}
