//! Handlers for running and managing screenings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use esgscreen_core::service::ScreeningRequest;
use esgscreen_core::subject::SubjectSelector;
use esgscreen_core::types::{DbId, EffectiveDate};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::query::ResultListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body shared by `POST /screenings` and `POST /screenings/validate`.
#[derive(Debug, Deserialize, Validate)]
pub struct ScreeningRequestBody {
    #[validate(custom(function = "validate_selector"))]
    pub selector: SubjectSelector,
    #[validate(range(min = 1, message = "criteria_set_id must be positive"))]
    pub criteria_set_id: DbId,
    #[serde(default)]
    pub as_of_date: Option<EffectiveDate>,
}

impl From<ScreeningRequestBody> for ScreeningRequest {
    fn from(body: ScreeningRequestBody) -> Self {
        ScreeningRequest {
            selector: body.selector,
            criteria_set_id: body.criteria_set_id,
            as_of_date: body.as_of_date,
        }
    }
}

fn selector_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn validate_selector(selector: &SubjectSelector) -> Result<(), ValidationError> {
    match selector {
        SubjectSelector::Portfolio { portfolio_id } if *portfolio_id < 1 => Err(selector_error(
            "portfolio_id",
            "portfolio_id must be positive",
        )),
        SubjectSelector::Companies { company_ids, .. } if company_ids.is_empty() => Err(
            selector_error("company_ids", "company_ids must not be empty"),
        ),
        SubjectSelector::Sector { sector, .. } if sector.trim().is_empty() => {
            Err(selector_error("sector", "sector must not be blank"))
        }
        SubjectSelector::Region { region, .. } if region.trim().is_empty() => {
            Err(selector_error("region", "region must not be blank"))
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/screenings/validate
///
/// Data completeness report for a prospective run. Nothing is persisted.
pub async fn validate_screening(
    State(state): State<AppState>,
    Json(input): Json<ScreeningRequestBody>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let report = state.service.validate(&input.into()).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/screenings
///
/// Screen the selected companies and persist the result.
pub async fn run_screening(
    State(state): State<AppState>,
    Json(input): Json<ScreeningRequestBody>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let request: ScreeningRequest = input.into();
    let result = state.service.screen(&request).await?;

    tracing::info!(
        result_id = result.id,
        criteria_set_id = result.criteria_set_id,
        mode = %result.mode,
        total = result.summary.total_subjects,
        "Screening stored",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// GET /api/v1/screenings
pub async fn list_screenings(
    State(state): State<AppState>,
    Query(params): Query<ResultListParams>,
) -> AppResult<impl IntoResponse> {
    let headers = state.service.list_results(&params.into()).await?;
    Ok(Json(DataResponse { data: headers }))
}

/// GET /api/v1/screenings/{id}
pub async fn get_screening(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let result = state.service.get_result(id).await?;
    Ok(Json(DataResponse { data: result }))
}

/// DELETE /api/v1/screenings/{id}
pub async fn delete_screening(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.service.delete_result(id).await?;
    tracing::info!(result_id = id, "Screening deleted");
    Ok(StatusCode::NO_CONTENT)
}
