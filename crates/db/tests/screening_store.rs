//! Integration tests for the PostgreSQL store.
//!
//! Exercises the repositories and `PgScreeningStore` against a real database:
//! - Dated and undated value reads, newest first
//! - Value resolution with per-company fallback
//! - Rule ordering within a criteria set
//! - Result insert, listing filters and paging, delete
//! - Client checks for ad hoc selectors
//! - Unique-constraint mapping

use assert_matches::assert_matches;
use chrono::NaiveDate;
use esgscreen_core::error::CoreError;
use esgscreen_core::observe::NoopObserver;
use esgscreen_core::parameter::ScalarValue;
use esgscreen_core::resolver::resolve_parameter_values;
use esgscreen_core::screening::{NewScreeningResult, ResultFilter, ScreeningSummary};
use esgscreen_core::store::{CriteriaStore, ResultStore, SubjectStore};
use esgscreen_core::subject::SubjectSelector;
use esgscreen_core::types::{DbId, EffectiveDate};
use esgscreen_db::repositories::{ClientRepo, ParameterValueRepo};
use esgscreen_db::{storage_error, PgScreeningStore};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> EffectiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn insert_client(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO clients (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_company(pool: &PgPool, name: &str, sector: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO companies (name, sector, region) VALUES ($1, $2, 'Europe') RETURNING id",
    )
    .bind(name)
    .bind(sector)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_parameter(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO parameters (name, data_type) VALUES ($1, 'number') RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_value(
    pool: &PgPool,
    company_id: DbId,
    parameter_id: DbId,
    value: serde_json::Value,
    on: EffectiveDate,
) {
    sqlx::query(
        "INSERT INTO parameter_values (company_id, parameter_id, value, effective_date) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(company_id)
    .bind(parameter_id)
    .bind(value)
    .bind(on)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_criteria_set(pool: &PgPool, owner_id: Option<DbId>) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO criteria_sets (name, version, owner_id) VALUES ('Fossil', 3, $1) RETURNING id",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_rule(pool: &PgPool, criteria_set_id: DbId, name: &str, sort_order: i32) {
    sqlx::query(
        "INSERT INTO rules (criteria_set_id, name, expression, sort_order) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(criteria_set_id)
    .bind(name)
    .bind(json!({
        "type": "comparison",
        "parameter": "carbon_emissions",
        "operator": ">",
        "value": 500
    }))
    .bind(sort_order)
    .execute(pool)
    .await
    .unwrap();
}

fn new_result(criteria_set_id: DbId, owner_id: Option<DbId>) -> NewScreeningResult {
    NewScreeningResult {
        criteria_set_id,
        criteria_set_version: 3,
        owner_id,
        mode: "all".into(),
        as_of_date: date(2024, 6, 30),
        summary: ScreeningSummary::from_subjects(&[]),
        subjects: vec![],
    }
}

// ---------------------------------------------------------------------------
// Parameter values
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_value_reads_respect_as_of_date_newest_first(pool: PgPool) {
    let company = insert_company(&pool, "Acme", "Energy").await;
    let carbon = insert_parameter(&pool, "Carbon_Emissions").await;
    insert_value(&pool, company, carbon, json!(100), date(2022, 1, 1)).await;
    insert_value(&pool, company, carbon, json!(300), date(2024, 1, 1)).await;
    insert_value(&pool, company, carbon, json!(900), date(2025, 1, 1)).await;

    let dated = ParameterValueRepo::list_for_companies(&pool, &[company], Some(date(2024, 6, 1)))
        .await
        .unwrap();
    let dates: Vec<EffectiveDate> = dated.iter().map(|r| r.effective_date).collect();
    assert_eq!(dates, vec![date(2024, 1, 1), date(2022, 1, 1)]);
    assert_eq!(dated[0].parameter_name, "Carbon_Emissions");

    let undated = ParameterValueRepo::list_for_companies(&pool, &[company], None)
        .await
        .unwrap();
    assert_eq!(undated.len(), 3);
    assert_eq!(undated[0].value, json!(900));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_resolution_falls_back_per_company(pool: PgPool) {
    let reported = insert_company(&pool, "Reported", "Energy").await;
    let late = insert_company(&pool, "Late Filer", "Energy").await;
    let carbon = insert_parameter(&pool, "carbon_emissions").await;
    insert_value(&pool, reported, carbon, json!(300), date(2023, 1, 1)).await;
    insert_value(&pool, reported, carbon, json!(950), date(2025, 1, 1)).await;
    insert_value(&pool, late, carbon, json!(700), date(2025, 3, 1)).await;
    insert_value(&pool, late, carbon, json!(9_007_199_254_740_993_u64), date(2025, 6, 1)).await;

    let store = PgScreeningStore::new(pool);
    let resolved =
        resolve_parameter_values(&store, &[reported, late], date(2024, 1, 1), &NoopObserver)
            .await
            .unwrap();

    assert_eq!(resolved[&reported].get("carbon_emissions"), Some(&ScalarValue::from(300)));
    let fallback = resolved[&late].get("carbon_emissions").unwrap();
    assert_eq!(serde_json::to_value(fallback).unwrap(), json!(9_007_199_254_740_993_u64));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_parameter_name_is_a_validation_error(pool: PgPool) {
    insert_parameter(&pool, "Water_Use").await;
    let err = sqlx::query("INSERT INTO parameters (name, data_type) VALUES ('water_use', 'number')")
        .execute(&pool)
        .await
        .unwrap_err();

    assert_matches!(
        storage_error(err),
        CoreError::Validation(msg) if msg.contains("uq_parameters_name")
    );
}

// ---------------------------------------------------------------------------
// Criteria sets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_rules_load_in_authored_order(pool: PgPool) {
    let client = insert_client(&pool, "Pension Fund").await;
    let set_id = insert_criteria_set(&pool, Some(client)).await;
    insert_rule(&pool, set_id, "third", 2).await;
    insert_rule(&pool, set_id, "first", 0).await;
    insert_rule(&pool, set_id, "second", 1).await;

    let store = PgScreeningStore::new(pool);
    let set = store.get_criteria_set(set_id).await.unwrap().unwrap();
    let names: Vec<&str> = set.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
    assert_eq!(set.version, 3);
    assert_eq!(set.owner_id, Some(client));
    assert!(!set.is_global);

    assert!(store.get_criteria_set(set_id + 1).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_ad_hoc_selector_requires_known_client(pool: PgPool) {
    let client = insert_client(&pool, "Endowment").await;
    let first = insert_company(&pool, "First", "Energy").await;
    let second = insert_company(&pool, "Second", "Energy").await;
    assert!(ClientRepo::exists(&pool, client).await.unwrap());
    assert!(!ClientRepo::exists(&pool, client + 100).await.unwrap());

    let store = PgScreeningStore::new(pool);
    let set = store
        .resolve_subjects(&SubjectSelector::Companies {
            client_id: Some(client),
            company_ids: vec![second, first, second],
        })
        .await
        .unwrap();
    assert_eq!(set.company_ids(), vec![second, first]);
    assert_eq!(set.owner_id, Some(client));

    let missing = client + 100;
    assert_matches!(
        store
            .resolve_subjects(&SubjectSelector::Sector {
                client_id: Some(missing),
                sector: "energy".into(),
            })
            .await,
        Err(CoreError::NotFound { entity: "Client", id }) if id == missing
    );
}

// ---------------------------------------------------------------------------
// Screening results
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_result_insert_returns_generated_columns(pool: PgPool) {
    let client = insert_client(&pool, "Insurer").await;
    let set_id = insert_criteria_set(&pool, None).await;
    let store = PgScreeningStore::new(pool);

    let created = store.create_result(new_result(set_id, Some(client))).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.criteria_set_version, 3);

    let fetched = store.get_result(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.created_at, created.created_at);
    assert_eq!(fetched.owner_id, Some(client));
    assert_eq!(fetched.as_of_date, date(2024, 6, 30));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_result_listing_filters_and_pages(pool: PgPool) {
    let client = insert_client(&pool, "Insurer").await;
    let global_set = insert_criteria_set(&pool, None).await;
    let other_set = insert_criteria_set(&pool, None).await;
    let store = PgScreeningStore::new(pool);

    let mut ids = Vec::new();
    for (set_id, owner) in [(global_set, Some(client)), (other_set, None), (global_set, None)] {
        ids.push(store.create_result(new_result(set_id, owner)).await.unwrap().id);
    }

    let all = store.list_results(&ResultFilter::default()).await.unwrap();
    let listed: Vec<DbId> = all.iter().map(|h| h.id).collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);

    let by_set = store
        .list_results(&ResultFilter::new(Some(global_set), None, None, None))
        .await
        .unwrap();
    assert_eq!(by_set.len(), 2);

    let by_owner = store
        .list_results(&ResultFilter::new(None, Some(client), None, None))
        .await
        .unwrap();
    assert_eq!(by_owner.len(), 1);
    assert_eq!(by_owner[0].id, ids[0]);

    let page = store
        .list_results(&ResultFilter::new(None, None, Some(1), Some(1)))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, ids[1]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_result_delete_reports_whether_a_row_was_removed(pool: PgPool) {
    let set_id = insert_criteria_set(&pool, None).await;
    let store = PgScreeningStore::new(pool);
    let created = store.create_result(new_result(set_id, None)).await.unwrap();

    assert!(store.delete_result(created.id).await.unwrap());
    assert!(!store.delete_result(created.id).await.unwrap());
    assert!(store.get_result(created.id).await.unwrap().is_none());
}
