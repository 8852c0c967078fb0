use std::sync::Arc;

use esgscreen_core::service::ScreeningService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; the service holds its store and observer behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub service: ScreeningService,
    pub config: Arc<ServerConfig>,
}
