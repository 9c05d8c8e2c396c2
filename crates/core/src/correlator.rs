//! Task Correlator: find the directory of a task from its opaque id.
//!
//! The durable index is the directory tree itself. [`scan_for`] walks the
//! batch directories under the data root and returns the first one holding
//! a child named after the task. [`TaskIndex`] keeps the results of that
//! walk in memory so a callback normally costs a map lookup instead of a
//! scan over every batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::batch::is_batch_name;
use crate::error::CoreError;
use crate::naming::is_safe_segment;

/// Scan every batch under `root` for a child directory named `task_id`.
///
/// Batches are visited in directory order; the first hit wins and the scan
/// stops there. An unreadable root or batch counts as a miss.
pub async fn scan_for(root: &Path, task_id: &str) -> Result<PathBuf, CoreError> {
    let not_found = || CoreError::TaskNotFound(task_id.to_string());

    if !is_safe_segment(task_id) {
        return Err(not_found());
    }

    let mut entries = tokio::fs::read_dir(root).await.map_err(|_| not_found())?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !is_batch_name(&name) {
            continue;
        }
        let candidate = entry.path().join(task_id);
        if is_dir(&candidate).await {
            return Ok(candidate);
        }
    }

    Err(not_found())
}

/// Walk every batch under `root` and collect `task_id -> directory`.
///
/// When the same id appears in several batches the first batch visited wins,
/// matching [`scan_for`].
pub async fn scan_all(root: &Path) -> Result<HashMap<String, PathBuf>, CoreError> {
    let mut found = HashMap::new();
    let mut batches = tokio::fs::read_dir(root).await?;

    while let Some(batch) = batches.next_entry().await? {
        let is_batch = batch
            .file_name()
            .to_str()
            .is_some_and(is_batch_name);
        if !is_batch || !batch.file_type().await?.is_dir() {
            continue;
        }

        // One unreadable batch should not hide the others.
        let Ok(mut tasks) = tokio::fs::read_dir(batch.path()).await else {
            continue;
        };
        while let Ok(Some(task)) = tasks.next_entry().await {
            let Some(task_id) = task.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_dir(&task.path()).await {
                found.entry(task_id).or_insert_with(|| task.path());
            }
        }
    }

    Ok(found)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// In-memory `task_id -> directory` map over a data root.
///
/// Populated by [`TaskIndex::rehydrate`] at startup and by
/// [`TaskIndex::register`] when tasks are created in-process. Lookups that
/// miss fall back to [`scan_for`], so tasks written by another process after
/// startup are still found.
pub struct TaskIndex {
    root: PathBuf,
    entries: RwLock<HashMap<String, PathBuf>>,
}

impl TaskIndex {
    /// Create an empty index over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the map with one full scan of the data root. Returns the
    /// number of tasks found.
    pub async fn rehydrate(&self) -> Result<usize, CoreError> {
        let found = scan_all(&self.root).await?;
        let count = found.len();
        *self.entries.write().await = found;
        Ok(count)
    }

    /// Record the directory of a task created in this process.
    pub async fn register(&self, task_id: impl Into<String>, task_dir: impl Into<PathBuf>) {
        self.entries
            .write()
            .await
            .insert(task_id.into(), task_dir.into());
    }

    /// Number of tasks currently held in memory.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Locate the directory of `task_id`.
    ///
    /// Cached entries are checked against the filesystem; a stale entry is
    /// dropped and the lookup falls through to a full scan.
    pub async fn locate(&self, task_id: &str) -> Result<PathBuf, CoreError> {
        let cached = self.entries.read().await.get(task_id).cloned();
        if let Some(path) = cached {
            if is_dir(&path).await {
                return Ok(path);
            }
            self.entries.write().await.remove(task_id);
        }

        let path = scan_for(&self.root, task_id).await?;
        self.register(task_id, path.clone()).await;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn layout(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    #[tokio::test]
    async fn scan_finds_task_under_its_batch() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["test-1/aaa", "test-2/bbb"]);

        let path = scan_for(root.path(), "bbb").await.unwrap();
        assert_eq!(path, root.path().join("test-2").join("bbb"));
    }

    #[tokio::test]
    async fn scan_ignores_non_batch_directories() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["static/aaa", "test-1/zzz"]);

        assert_matches!(
            scan_for(root.path(), "aaa").await,
            Err(CoreError::TaskNotFound(id)) if id == "aaa"
        );
    }

    #[tokio::test]
    async fn scan_requires_a_directory() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["test-1"]);
        std::fs::write(root.path().join("test-1").join("aaa"), b"").unwrap();

        assert!(scan_for(root.path(), "aaa").await.is_err());
    }

    #[tokio::test]
    async fn unreadable_root_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        assert_matches!(
            scan_for(&root.path().join("missing"), "aaa").await,
            Err(CoreError::TaskNotFound(_))
        );
    }

    #[tokio::test]
    async fn traversal_ids_never_match() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["test-1/aaa"]);

        for id in ["", ".", "..", "../test-1", "aaa/.."] {
            assert!(scan_for(root.path(), id).await.is_err(), "{id:?} matched");
        }
    }

    #[tokio::test]
    async fn rehydrate_indexes_every_task() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["test-1/a", "test-1/b", "test-2/c", "other/d"]);

        let index = TaskIndex::new(root.path());
        assert_eq!(index.rehydrate().await.unwrap(), 3);
        assert_eq!(index.len().await, 3);
        assert_eq!(
            index.locate("c").await.unwrap(),
            root.path().join("test-2").join("c")
        );
    }

    #[tokio::test]
    async fn locate_falls_back_to_scan_for_new_tasks() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["test-1/a"]);
        let index = TaskIndex::new(root.path());
        index.rehydrate().await.unwrap();

        layout(root.path(), &["test-2/late"]);
        let path = index.locate("late").await.unwrap();
        assert_eq!(path, root.path().join("test-2").join("late"));
        assert_eq!(index.len().await, 2);
    }

    #[tokio::test]
    async fn locate_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["test-1/a"]);
        let index = TaskIndex::new(root.path());

        let first = index.locate("a").await.unwrap();
        let second = index.locate("a").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn stale_entries_are_dropped() {
        let root = tempfile::tempdir().unwrap();
        let index = TaskIndex::new(root.path());
        index.register("gone", root.path().join("test-1").join("gone")).await;

        assert_matches!(index.locate("gone").await, Err(CoreError::TaskNotFound(_)));
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let root = tempfile::tempdir().unwrap();
        layout(root.path(), &["test-1/a"]);
        let index = TaskIndex::new(root.path());

        assert_matches!(index.locate("b").await, Err(CoreError::TaskNotFound(_)));
    }
}
