//! Repository for the `parameters` catalogue.

use sqlx::PgPool;

use crate::models::parameter::ParameterRow;

const COLUMNS: &str = "\
    id, name, data_type, unit, owner_scope, client_id, \
    created_at, updated_at";

pub struct ParameterRepo;

impl ParameterRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<ParameterRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM parameters ORDER BY name");
        sqlx::query_as::<_, ParameterRow>(&query).fetch_all(pool).await
    }
}
