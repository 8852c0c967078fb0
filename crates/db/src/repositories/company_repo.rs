//! Repository for the `companies` table.

use esgscreen_core::types::DbId;
use sqlx::PgPool;

use crate::models::company::CompanyRow;

/// Column list for `companies` queries.
const COLUMNS: &str = "id, name, ticker, sector, region, created_at, updated_at";

/// Provides read access to the company universe.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Fetch the companies with the given ids. Missing ids are simply absent
    /// from the result; order follows `id`.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<CompanyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, CompanyRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Companies in a sector, matched case-insensitively.
    pub async fn list_by_sector(
        pool: &PgPool,
        sector: &str,
    ) -> Result<Vec<CompanyRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM companies \
             WHERE lower(sector) = lower(trim($1)) ORDER BY id"
        );
        sqlx::query_as::<_, CompanyRow>(&query)
            .bind(sector)
            .fetch_all(pool)
            .await
    }

    /// Companies in a region, matched case-insensitively.
    pub async fn list_by_region(
        pool: &PgPool,
        region: &str,
    ) -> Result<Vec<CompanyRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM companies \
             WHERE lower(region) = lower(trim($1)) ORDER BY id"
        );
        sqlx::query_as::<_, CompanyRow>(&query)
            .bind(region)
            .fetch_all(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<CompanyRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies ORDER BY id");
        sqlx::query_as::<_, CompanyRow>(&query).fetch_all(pool).await
    }
}
