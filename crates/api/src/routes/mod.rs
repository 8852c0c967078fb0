pub mod expressions;
pub mod health;
pub mod parameters;
pub mod screenings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /expressions/validate                 check an expression (POST)
///
/// /parameters                           parameter catalogue (GET)
///
/// /screenings                           list (GET), run (POST)
/// /screenings/validate                  pre-screening data check (POST)
/// /screenings/{id}                      get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/expressions", expressions::router())
        .nest("/parameters", parameters::router())
        .nest("/screenings", screenings::router())
}
