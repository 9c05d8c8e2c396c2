use std::sync::Arc;

use crate::config::ServerConfig;
use crate::reconcile::Reconciler;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Turns completion callbacks into image files.
    pub reconciler: Arc<Reconciler>,
}
