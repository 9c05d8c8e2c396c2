//! Wire types exchanged with the remote generation API.
//!
//! Outbound: [`SubmitRequest`] / [`SubmitResponse`] for `POST` submission.
//! Inbound: [`CallbackRequest`], posted back to us once a task finishes.

use serde::{Deserialize, Serialize};

use scenegen_core::input::SceneRow;
use scenegen_core::types::Delivery;

/// The only callback `msg` that triggers materialization.
pub const CALLBACK_SUCCESS_MSG: &str = "success";

/// Body of a submission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub app_id: i64,
    pub role_desc: String,
    pub scenes: Vec<String>,
    pub style: String,
    /// URL the remote API posts the [`CallbackRequest`] to.
    pub callback: String,
}

impl SubmitRequest {
    /// Build the request for an input row.
    pub fn from_row(row: &SceneRow, callback: &str) -> Self {
        Self {
            app_id: row.app_id,
            role_desc: row.role_desc.clone(),
            scenes: row.scenes.clone(),
            style: row.style.clone(),
            callback: callback.to_string(),
        }
    }
}

/// Body of a submission response. `code != 0` means the request was
/// rejected and `msg` says why.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitResponse {
    pub code: i64,
    pub msg: String,
    pub task_id: String,
    pub cost_time: i64,
    pub queue_count: i64,
}

/// One generated image in a callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackImage {
    pub url: String,
    pub index: i64,
}

/// Result payload of a callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackData {
    pub imgs: Vec<CallbackImage>,
}

/// Callback posted by the remote API when a task completes or fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackRequest {
    pub task_id: String,
    pub success: bool,
    pub msg: String,
    pub data: CallbackData,
}

impl CallbackRequest {
    /// Whether this callback carries images to materialize.
    ///
    /// Only the literal message `"success"` counts; the `success` flag is
    /// informational.
    pub fn is_success(&self) -> bool {
        self.msg == CALLBACK_SUCCESS_MSG
    }

    /// The delivered images as `(index, url)` pairs, in payload order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.data
            .imgs
            .iter()
            .map(|img| Delivery::new(img.index, img.url.clone()))
            .collect()
    }
}
