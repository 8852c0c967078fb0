//! Repository for `portfolios` and their holdings.

use esgscreen_core::types::DbId;
use sqlx::PgPool;

use crate::models::company::{CompanyRow, PortfolioRow};

const COLUMNS: &str = "id, client_id, name, created_at, updated_at";

pub struct PortfolioRepo;

impl PortfolioRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PortfolioRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM portfolios WHERE id = $1");
        sqlx::query_as::<_, PortfolioRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Companies held by a portfolio, in holding order.
    pub async fn list_holdings(
        pool: &PgPool,
        portfolio_id: DbId,
    ) -> Result<Vec<CompanyRow>, sqlx::Error> {
        sqlx::query_as::<_, CompanyRow>(
            "SELECT c.id, c.name, c.ticker, c.sector, c.region, c.created_at, c.updated_at \
             FROM portfolio_holdings h \
             JOIN companies c ON c.id = h.company_id \
             WHERE h.portfolio_id = $1 \
             ORDER BY h.id",
        )
        .bind(portfolio_id)
        .fetch_all(pool)
        .await
    }
}
