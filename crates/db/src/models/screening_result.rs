//! Persisted screening result rows.
//!
//! Summary counts live in columns for listing; per-subject detail is one
//! JSONB document so a result is written in a single statement.

use esgscreen_core::error::CoreError;
use esgscreen_core::screening::{
    ScreeningResult, ScreeningResultHeader, ScreeningSummary, SubjectResult,
};
use esgscreen_core::types::{DbId, EffectiveDate, Timestamp};
use sqlx::FromRow;

/// A `screening_results` row without the subject detail.
#[derive(Debug, Clone, FromRow)]
pub struct ScreeningHeaderRow {
    pub id: DbId,
    pub criteria_set_id: DbId,
    pub owner_id: Option<DbId>,
    pub mode: String,
    pub as_of_date: EffectiveDate,
    pub total_subjects: i32,
    pub passed: i32,
    pub failed: i32,
    pub pass_rate: i32,
    pub created_at: Timestamp,
}

/// Columns generated by the database on insert.
#[derive(Debug, Clone, FromRow)]
pub struct InsertedResultRow {
    pub id: DbId,
    pub created_at: Timestamp,
}

/// A full `screening_results` row.
#[derive(Debug, Clone, FromRow)]
pub struct ScreeningResultRow {
    pub id: DbId,
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
    pub created_at: Timestamp,
}

fn summary(total_subjects: i32, passed: i32, failed: i32, pass_rate: i32) -> ScreeningSummary {
    ScreeningSummary {
        total_subjects: total_subjects.max(0) as usize,
        passed: passed.max(0) as usize,
        failed: failed.max(0) as usize,
        pass_rate: pass_rate.clamp(0, 100) as u32,
    }
}

/// Convert a count for an INTEGER column.
pub(crate) fn count_column(value: usize) -> Result<i32, CoreError> {
    i32::try_from(value)
        .map_err(|_| CoreError::Internal(format!("Count {value} exceeds column range")))
}

impl From<ScreeningHeaderRow> for ScreeningResultHeader {
    fn from(row: ScreeningHeaderRow) -> Self {
        ScreeningResultHeader {
            id: row.id,
            criteria_set_id: row.criteria_set_id,
            owner_id: row.owner_id,
            mode: row.mode,
            as_of_date: row.as_of_date,
            summary: summary(row.total_subjects, row.passed, row.failed, row.pass_rate),
            created_at: row.created_at,
        }
    }
}

impl TryFrom<ScreeningResultRow> for ScreeningResult {
    type Error = CoreError;

    fn try_from(row: ScreeningResultRow) -> Result<Self, Self::Error> {
        let subjects: Vec<SubjectResult> = serde_json::from_value(row.subjects).map_err(|e| {
            CoreError::Internal(format!("Screening result {} has corrupt detail: {e}", row.id))
        })?;
        Ok(ScreeningResult {
            id: row.id,
            criteria_set_id: row.criteria_set_id,
            criteria_set_version: row.criteria_set_version,
            owner_id: row.owner_id,
            mode: row.mode,
            as_of_date: row.as_of_date,
            summary: summary(row.total_subjects, row.passed, row.failed, row.pass_rate),
            subjects,
            created_at: row.created_at,
        })
    }
}
