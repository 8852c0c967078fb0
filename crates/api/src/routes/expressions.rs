use axum::routing::post;
use axum::Router;

use crate::handlers::expressions;
use crate::state::AppState;

/// Expression routes mounted at `/expressions`.
///
/// ```text
/// POST   /validate          -> validate_expression
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(expressions::validate_expression))
}
