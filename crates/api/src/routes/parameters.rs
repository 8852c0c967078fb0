use axum::routing::get;
use axum::Router;

use crate::handlers::parameters;
use crate::state::AppState;

/// Parameter catalogue routes mounted at `/parameters`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(parameters::list_parameters))
}
