//! Route definitions for screening runs and stored results.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::screenings;
use crate::state::AppState;

/// Screening routes mounted at `/screenings`.
///
/// ```text
/// GET    /                  -> list_screenings
/// POST   /                  -> run_screening
/// POST   /validate          -> validate_screening
/// GET    /{id}              -> get_screening
/// DELETE /{id}              -> delete_screening
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(screenings::list_screenings).post(screenings::run_screening),
        )
        .route("/validate", post(screenings::validate_screening))
        .route(
            "/{id}",
            get(screenings::get_screening).delete(screenings::delete_screening),
        )
}
