pub mod batches;
pub mod callback;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /batches                                  list batch names
/// /batches/{batch}                          list task ids in a batch
/// /batches/{batch}/tasks/{task_id}          images and descriptor of a task
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/batches", get(batches::list_batches))
        .route("/batches/{batch}", get(batches::get_batch))
        .route("/batches/{batch}/tasks/{task_id}", get(batches::get_task))
}
