//! Read-only browsing of batches, tasks and materialized images.

use axum::extract::{Path, State};
use axum::Json;
use scenegen_core::batch;
use scenegen_core::descriptor;
use scenegen_core::error::CoreError;
use scenegen_core::naming::is_safe_segment;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::router::FILES_PREFIX;
use crate::state::AppState;

/// Task ids in one batch.
#[derive(Debug, Serialize)]
pub struct BatchDetail {
    pub batch: String,
    pub tasks: Vec<String>,
}

/// One image file in a task directory.
#[derive(Debug, Serialize)]
pub struct ImageEntry {
    pub name: String,
    /// Path under the static file mount.
    pub url: String,
}

/// Images and descriptor record of one task.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    pub batch: String,
    pub task_id: String,
    pub images: Vec<ImageEntry>,
    /// Raw `desc.txt` content, `null` when absent.
    pub description: Option<String>,
}

fn ensure_segment(value: &str, what: &str) -> AppResult<()> {
    if is_safe_segment(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid {what}: {value:?}")))
    }
}

/// GET /api/v1/batches
pub async fn list_batches(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let batches = batch::list_batches(&state.config.data_dir).await?;
    Ok(Json(DataResponse { data: batches }))
}

/// GET /api/v1/batches/{batch}
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_name): Path<String>,
) -> AppResult<Json<DataResponse<BatchDetail>>> {
    ensure_segment(&batch_name, "batch name")?;

    let tasks = batch::list_tasks(&state.config.data_dir.join(&batch_name)).await?;
    Ok(Json(DataResponse {
        data: BatchDetail {
            batch: batch_name,
            tasks,
        },
    }))
}

/// GET /api/v1/batches/{batch}/tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    Path((batch_name, task_id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    ensure_segment(&batch_name, "batch name")?;
    ensure_segment(&task_id, "task id")?;

    let task_dir = state.config.data_dir.join(&batch_name).join(&task_id);

    let images = batch::list_images(&task_dir)
        .await?
        .into_iter()
        .map(|name| ImageEntry {
            url: format!("{FILES_PREFIX}/{batch_name}/{task_id}/{name}"),
            name,
        })
        .collect();

    let description = match descriptor::read_raw(&task_dir).await {
        Ok(content) => Some(content),
        Err(CoreError::TaskNotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(Json(DataResponse {
        data: TaskDetail {
            batch: batch_name,
            task_id,
            images,
            description,
        },
    }))
}
