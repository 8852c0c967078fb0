//! Authoring-time expression checks.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateExpressionRequest {
    /// Raw expression JSON; parsed here so structural errors carry a path.
    pub expression: serde_json::Value,
    /// Also require every parameter to exist in the catalogue.
    #[serde(default)]
    pub check_catalogue: bool,
}

/// POST /api/v1/expressions/validate
///
/// Returns the normalized parameters the expression reads, or 400 with the
/// first problem found.
pub async fn validate_expression(
    State(state): State<AppState>,
    Json(input): Json<ValidateExpressionRequest>,
) -> AppResult<impl IntoResponse> {
    let check = state
        .service
        .validate_expression(&input.expression, input.check_catalogue)
        .await?;
    Ok(Json(DataResponse { data: check }))
}
