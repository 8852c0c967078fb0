//! Company and portfolio rows.

use esgscreen_core::subject::Company;
use esgscreen_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompanyRow {
    pub id: DbId,
    pub name: String,
    pub ticker: Option<String>,
    pub sector: Option<String>,
    pub region: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            name: row.name,
            ticker: row.ticker,
            sector: row.sector,
            region: row.region,
        }
    }
}

/// A row from the `portfolios` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PortfolioRow {
    pub id: DbId,
    pub client_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
