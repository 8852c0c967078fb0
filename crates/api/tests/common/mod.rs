#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use esgscreen_core::criteria::{CriteriaSet, Rule, Severity};
use esgscreen_core::expression::{ComparisonOperator, Expression, Operand};
use esgscreen_core::memory::InMemoryStore;
use esgscreen_core::parameter::{
    OwnerScope, Parameter, ParameterDataType, ParameterValueRecord, ScalarValue,
};
use esgscreen_core::service::ScreeningService;
use esgscreen_core::subject::Company;
use esgscreen_core::types::DbId;
use http_body_util::BodyExt;
use tower::ServiceExt;

use esgscreen_api::config::ServerConfig;
use esgscreen_api::router::build_app_router;
use esgscreen_api::state::AppState;

pub const CLIENT: DbId = 5;
pub const OTHER_CLIENT: DbId = 6;
pub const PORTFOLIO: DbId = 100;
pub const GLOBAL_SET: DbId = 1;
pub const CLIENT_SET: DbId = 2;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 1,
    }
}

fn carbon_rule() -> Rule {
    Rule {
        id: 1,
        name: "Carbon intensity".into(),
        description: None,
        expression: Expression::comparison(
            "carbon_emissions",
            ComparisonOperator::Ge,
            Operand::from(500),
        ),
        failure_message: None,
        severity: Severity::Exclude,
    }
}

/// Ten companies in a portfolio owned by [`CLIENT`]: 1..=7 emit 300, 8..=10
/// emit 650. Company 11 has no data and is held by no portfolio.
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    let reported = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for id in 1..=10 {
        store.insert_company(Company {
            id,
            name: format!("Company {id}"),
            ticker: None,
            sector: Some("Energy".into()),
            region: Some("Europe".into()),
        });
        store.seed_values([ParameterValueRecord {
            company_id: id,
            parameter_name: "carbon_emissions".into(),
            value: ScalarValue::from(if id <= 7 { 300 } else { 650 }),
            effective_date: reported,
            source: None,
        }]);
    }
    store.insert_company(Company {
        id: 11,
        name: "Undisclosed Ltd".into(),
        ticker: None,
        sector: None,
        region: None,
    });
    store.insert_client(CLIENT);
    store.insert_client(OTHER_CLIENT);
    store.insert_portfolio(PORTFOLIO, CLIENT, (1..=10).collect());
    store.insert_parameter(Parameter {
        id: 1,
        name: "carbon_emissions".into(),
        data_type: ParameterDataType::Number,
        unit: Some("tCO2e".into()),
        owner_scope: OwnerScope::Global,
    });
    for (id, owner_id) in [(GLOBAL_SET, None), (CLIENT_SET, Some(CLIENT))] {
        store.insert_criteria_set(CriteriaSet {
            id,
            name: format!("Set {id}"),
            version: 1,
            is_global: owner_id.is_none(),
            owner_id,
            rules: vec![carbon_rule()],
        });
    }
    Arc::new(store)
}

/// Build the full application router over `store`, with the production
/// middleware stack.
pub fn build_test_app(store: Arc<InMemoryStore>) -> Router {
    let config = test_config();
    let state = AppState {
        service: ScreeningService::new(store),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
