//! Scene Descriptor Store: the flat text record kept in every task
//! directory.
//!
//! The record is human-readable and line-oriented:
//!
//! ```text
//! Role Description: <free text>
//! Scenes: <scene 0>, <scene 1>, ...
//! ```
//!
//! The order of names on the `Scenes:` line is the positional contract used
//! to match callback result indices, so it is written and read back verbatim.

use std::path::Path;

use crate::error::CoreError;

/// File name of the record inside a task directory.
pub const DESCRIPTOR_FILE: &str = "desc.txt";

/// Label of the line holding the role description.
pub const ROLE_LABEL: &str = "Role Description:";

/// Label of the line holding the ordered scene names.
pub const SCENES_LABEL: &str = "Scenes:";

/// Separator between scene names on the `Scenes:` line.
pub const SCENE_DELIMITER: &str = ", ";

/// Decoded descriptor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub role_desc: String,
    pub scenes: Vec<String>,
}

impl TaskDescriptor {
    /// Render the record text.
    pub fn render(&self) -> String {
        format!(
            "{ROLE_LABEL} {}\n{SCENES_LABEL} {}\n",
            self.role_desc,
            self.scenes.join(SCENE_DELIMITER)
        )
    }

    /// Parse record text. Fails with [`CoreError::Malformed`] when there is
    /// no `Scenes:` line; a missing role line yields an empty description.
    pub fn parse(content: &str) -> Result<Self, CoreError> {
        let scenes = parse_scenes(content)?;
        let role_desc = content
            .lines()
            .find_map(|line| line.strip_prefix(ROLE_LABEL))
            .map(|rest| rest.trim().to_string())
            .unwrap_or_default();

        Ok(Self { role_desc, scenes })
    }
}

/// Extract the ordered scene names from record text.
pub fn parse_scenes(content: &str) -> Result<Vec<String>, CoreError> {
    let line = content
        .lines()
        .find_map(|line| line.strip_prefix(SCENES_LABEL))
        .ok_or_else(|| CoreError::Malformed(format!("no '{SCENES_LABEL}' line")))?;

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    Ok(trimmed.split(SCENE_DELIMITER).map(str::to_string).collect())
}

/// Write the descriptor record for a freshly accepted task.
///
/// `task_dir` must already exist. An existing record is overwritten.
pub async fn write(task_dir: &Path, role_desc: &str, scenes: &[String]) -> Result<(), CoreError> {
    let descriptor = TaskDescriptor {
        role_desc: role_desc.to_string(),
        scenes: scenes.to_vec(),
    };
    tokio::fs::write(task_dir.join(DESCRIPTOR_FILE), descriptor.render()).await?;
    Ok(())
}

/// Read the raw record text.
pub async fn read_raw(task_dir: &Path) -> Result<String, CoreError> {
    match tokio::fs::read_to_string(task_dir.join(DESCRIPTOR_FILE)).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CoreError::TaskNotFound(
            task_dir.display().to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Read and decode the full record.
pub async fn read(task_dir: &Path) -> Result<TaskDescriptor, CoreError> {
    TaskDescriptor::parse(&read_raw(task_dir).await?)
}

/// Read only the ordered scene names.
pub async fn read_scenes(task_dir: &Path) -> Result<Vec<String>, CoreError> {
    parse_scenes(&read_raw(task_dir).await?)
}
