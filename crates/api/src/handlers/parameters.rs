use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/parameters
///
/// The parameter catalogue, ordered by name.
pub async fn list_parameters(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let parameters = state.service.list_parameters().await?;
    Ok(Json(DataResponse { data: parameters }))
}
