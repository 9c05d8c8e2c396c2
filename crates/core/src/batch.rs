//! Batch and task directory layout.
//!
//! ```text
//! <data root>/
//!   test-20240101-120000/      <- one batch per submission run
//!     <task_id>/               <- one task per accepted request
//!       desc.txt
//!       sunset.png ...
//! ```
//!
//! Directory containment is ownership: a batch owns its tasks, a task owns
//! its descriptor record and images. Nothing here ever deletes.

use std::path::{Path, PathBuf};

use crate::descriptor;
use crate::error::CoreError;
use crate::naming::{is_image_file, is_safe_segment};
use crate::types::Timestamp;

/// Name prefix shared by every batch directory.
pub const BATCH_PREFIX: &str = "test-";

/// `chrono` format for the timestamp part of a batch name.
const BATCH_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Batch directory name for a run started at `started_at`.
///
/// ```
/// use chrono::TimeZone;
/// use scenegen_core::batch::batch_name;
///
/// let t = chrono::Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(batch_name(&t), "test-20240309-070501");
/// ```
pub fn batch_name(started_at: &Timestamp) -> String {
    format!("{BATCH_PREFIX}{}", started_at.format(BATCH_TIME_FORMAT))
}

/// Whether a directory name looks like a batch.
pub fn is_batch_name(name: &str) -> bool {
    name.starts_with(BATCH_PREFIX)
}

/// A batch directory on disk.
#[derive(Debug, Clone)]
pub struct Batch {
    name: String,
    path: PathBuf,
}

impl Batch {
    /// Create the batch directory for a run starting now.
    pub async fn create(root: &Path, started_at: &Timestamp) -> Result<Self, CoreError> {
        let name = batch_name(started_at);
        let path = root.join(&name);
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { name, path })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory for an accepted task and write its descriptor
    /// record. Returns the task directory.
    pub async fn create_task(
        &self,
        task_id: &str,
        role_desc: &str,
        scenes: &[String],
    ) -> Result<PathBuf, CoreError> {
        if !is_safe_segment(task_id) {
            return Err(CoreError::Validation(format!(
                "Task id '{task_id}' cannot be used as a directory name"
            )));
        }
        let task_dir = self.path.join(task_id);
        tokio::fs::create_dir_all(&task_dir).await?;
        descriptor::write(&task_dir, role_desc, scenes).await?;
        Ok(task_dir)
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Names of the child entries of `dir` accepted by `keep`, sorted.
///
/// A missing directory lists as empty.
async fn list_entries<F>(dir: &Path, keep: F) -> Result<Vec<String>, CoreError>
where
    F: Fn(&str, bool) -> bool,
{
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let is_dir = entry.file_type().await?.is_dir();
        if let Some(name) = entry.file_name().to_str() {
            if keep(name, is_dir) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Batch directory names under the data root.
pub async fn list_batches(root: &Path) -> Result<Vec<String>, CoreError> {
    list_entries(root, |name, is_dir| is_dir && is_batch_name(name)).await
}

/// Task ids inside a batch directory.
pub async fn list_tasks(batch_dir: &Path) -> Result<Vec<String>, CoreError> {
    list_entries(batch_dir, |_, is_dir| is_dir).await
}

/// Image file names inside a task directory.
pub async fn list_images(task_dir: &Path) -> Result<Vec<String>, CoreError> {
    list_entries(task_dir, |name, is_dir| !is_dir && is_image_file(name)).await
}
