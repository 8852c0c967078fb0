//! Repository for time-versioned `parameter_values`.

use esgscreen_core::types::{DbId, EffectiveDate};
use sqlx::PgPool;

use crate::models::parameter::ParameterValueRow;

pub struct ParameterValueRepo;

impl ParameterValueRepo {
    /// All values for `company_ids`, optionally limited to rows effective on
    /// or before `effective_date_lte`, newest first. Parameter names are
    /// returned as catalogued; callers normalize them.
    pub async fn list_for_companies(
        pool: &PgPool,
        company_ids: &[DbId],
        effective_date_lte: Option<EffectiveDate>,
    ) -> Result<Vec<ParameterValueRow>, sqlx::Error> {
        sqlx::query_as::<_, ParameterValueRow>(
            "SELECT v.company_id, p.name AS parameter_name, v.value, \
                    v.effective_date, v.source \
             FROM parameter_values v \
             JOIN parameters p ON p.id = v.parameter_id \
             WHERE v.company_id = ANY($1) \
               AND ($2::date IS NULL OR v.effective_date <= $2) \
             ORDER BY v.effective_date DESC, v.id DESC",
        )
        .bind(company_ids)
        .bind(effective_date_lte)
        .fetch_all(pool)
        .await
    }
}
