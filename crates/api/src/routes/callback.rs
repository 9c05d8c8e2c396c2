//! Inbound completion callbacks from the generation API.
//!
//! The remote side only needs to know the callback arrived, so every
//! decodable callback is acknowledged with 200 whatever reconciliation
//! made of it. The body is decoded as JSON whatever its `Content-Type`.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use scenegen_client::messages::CallbackRequest;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Acknowledgement body.
#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub status: &'static str,
}

/// POST /callback
async fn receive_callback(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<CallbackAck>> {
    let callback: CallbackRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, bytes = body.len(), "Undecodable callback body");
        AppError::BadRequest(format!("Invalid callback body: {e}"))
    })?;

    tracing::info!(
        task_id = %callback.task_id,
        success = callback.success,
        msg = %callback.msg,
        images = callback.data.imgs.len(),
        "Callback received",
    );

    let outcome = state.reconciler.reconcile(&callback).await;
    tracing::debug!(task_id = %callback.task_id, ?outcome, "Callback handled");

    Ok(Json(CallbackAck { status: "ok" }))
}

/// Mount the callback route (root level, outside the request timeout).
pub fn router() -> Router<AppState> {
    Router::new().route("/callback", post(receive_callback))
}
