//! Repository for `screening_results`.
//!
//! Results are write-once: created by a single INSERT, then only read or
//! deleted.

use esgscreen_core::types::{DbId, EffectiveDate};
use sqlx::PgPool;

use crate::models::screening_result::{InsertedResultRow, ScreeningHeaderRow, ScreeningResultRow};

const HEADER_COLUMNS: &str = "\
    id, criteria_set_id, owner_id, mode, as_of_date, \
    total_subjects, passed, failed, pass_rate, created_at";

const COLUMNS: &str = "\
    id, criteria_set_id, criteria_set_version, owner_id, mode, as_of_date, \
    total_subjects, passed, failed, pass_rate, subjects, created_at";

/// Column values for a new result.
#[derive(Debug, Clone)]
pub struct InsertScreeningResult {
    pub criteria_set_id: DbId,
    pub criteria_set_version: i32,
    pub owner_id: Option<DbId>,
    pub mode: String,
    pub as_of_date: EffectiveDate,
    pub total_subjects: i32,
    pub passed: i32,
    pub failed: i32,
    pub pass_rate: i32,
    pub subjects: serde_json::Value,
}

pub struct ScreeningResultRepo;

impl ScreeningResultRepo {
    /// Returns only the generated columns; the caller already holds the rest.
    pub async fn create(
        pool: &PgPool,
        input: &InsertScreeningResult,
    ) -> Result<InsertedResultRow, sqlx::Error> {
        sqlx::query_as::<_, InsertedResultRow>(
            "INSERT INTO screening_results \
                (criteria_set_id, criteria_set_version, owner_id, mode, as_of_date, \
                 total_subjects, passed, failed, pass_rate, subjects) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id, created_at",
        )
        .bind(input.criteria_set_id)
        .bind(input.criteria_set_version)
        .bind(input.owner_id)
        .bind(&input.mode)
        .bind(input.as_of_date)
        .bind(input.total_subjects)
        .bind(input.passed)
        .bind(input.failed)
        .bind(input.pass_rate)
        .bind(&input.subjects)
        .fetch_one(pool)
        .await
    }

    /// Newest first, optionally filtered by criteria set and owner.
    pub async fn list(
        pool: &PgPool,
        criteria_set_id: Option<DbId>,
        owner_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ScreeningHeaderRow>, sqlx::Error> {
        let query = format!(
            "SELECT {HEADER_COLUMNS} FROM screening_results \
             WHERE ($1::bigint IS NULL OR criteria_set_id = $1) \
               AND ($2::bigint IS NULL OR owner_id = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ScreeningHeaderRow>(&query)
            .bind(criteria_set_id)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ScreeningResultRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM screening_results WHERE id = $1");
        sqlx::query_as::<_, ScreeningResultRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM screening_results WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
