//! Repository for `criteria_sets` and their `rules`.

use esgscreen_core::types::DbId;
use sqlx::PgPool;

use crate::models::criteria::{CriteriaSetRow, RuleRow};

const SET_COLUMNS: &str = "id, name, version, owner_id, created_at, updated_at";

const RULE_COLUMNS: &str = "\
    id, criteria_set_id, name, description, expression, failure_message, \
    severity, sort_order, created_at, updated_at";

pub struct CriteriaSetRepo;

impl CriteriaSetRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CriteriaSetRow>, sqlx::Error> {
        let query = format!("SELECT {SET_COLUMNS} FROM criteria_sets WHERE id = $1");
        sqlx::query_as::<_, CriteriaSetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Rules of a set in authored order.
    pub async fn list_rules(
        pool: &PgPool,
        criteria_set_id: DbId,
    ) -> Result<Vec<RuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RULE_COLUMNS} FROM rules \
             WHERE criteria_set_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(criteria_set_id)
            .fetch_all(pool)
            .await
    }
}
