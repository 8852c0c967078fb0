//! PostgreSQL implementation of the core storage traits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use esgscreen_core::criteria::CriteriaSet;
use esgscreen_core::error::CoreError;
use esgscreen_core::parameter::{Parameter, ParameterValueRecord};
use esgscreen_core::screening::{
    NewScreeningResult, ResultFilter, ScreeningResult, ScreeningResultHeader,
};
use esgscreen_core::store::{
    CriteriaStore, ParameterCatalogue, ParameterValueStore, ResultStore, ScreeningStore,
    SubjectStore,
};
use esgscreen_core::subject::{Company, SubjectSelector, SubjectSet};
use esgscreen_core::types::{DbId, EffectiveDate};

use crate::models::screening_result::count_column;
use crate::repositories::screening_result_repo::InsertScreeningResult;
use crate::repositories::{
    ClientRepo, CompanyRepo, CriteriaSetRepo, ParameterRepo, ParameterValueRepo, PortfolioRepo,
    ScreeningResultRepo,
};
use crate::{storage_error, DbPool};

#[derive(Debug, Clone)]
pub struct PgScreeningStore {
    pool: DbPool,
}

impl PgScreeningStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn companies<R: Into<Company>>(rows: Vec<R>) -> Vec<Company> {
    rows.into_iter().map(Into::into).collect()
}

#[async_trait]
impl CriteriaStore for PgScreeningStore {
    async fn get_criteria_set(&self, id: DbId) -> Result<Option<CriteriaSet>, CoreError> {
        let Some(set) = CriteriaSetRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?
        else {
            return Ok(None);
        };
        let rules = CriteriaSetRepo::list_rules(&self.pool, id)
            .await
            .map_err(storage_error)?;
        set.into_criteria_set(rules).map(Some)
    }
}

#[async_trait]
impl ParameterCatalogue for PgScreeningStore {
    async fn list_parameters(&self) -> Result<Vec<Parameter>, CoreError> {
        ParameterRepo::list(&self.pool)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(Parameter::try_from)
            .collect()
    }
}

#[async_trait]
impl ParameterValueStore for PgScreeningStore {
    async fn get_values(
        &self,
        company_ids: &[DbId],
        effective_date_lte: Option<EffectiveDate>,
    ) -> Result<Vec<ParameterValueRecord>, CoreError> {
        ParameterValueRepo::list_for_companies(&self.pool, company_ids, effective_date_lte)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(ParameterValueRecord::try_from)
            .collect()
    }
}

#[async_trait]
impl SubjectStore for PgScreeningStore {
    async fn resolve_subjects(&self, selector: &SubjectSelector) -> Result<SubjectSet, CoreError> {
        if let Some(client_id) = selector.client_id() {
            let known = ClientRepo::exists(&self.pool, client_id)
                .await
                .map_err(storage_error)?;
            if !known {
                return Err(CoreError::NotFound {
                    entity: "Client",
                    id: client_id,
                });
            }
        }

        match selector {
            SubjectSelector::Portfolio { portfolio_id } => {
                let portfolio = PortfolioRepo::find_by_id(&self.pool, *portfolio_id)
                    .await
                    .map_err(storage_error)?
                    .ok_or(CoreError::NotFound {
                        entity: "Portfolio",
                        id: *portfolio_id,
                    })?;
                let holdings = PortfolioRepo::list_holdings(&self.pool, portfolio.id)
                    .await
                    .map_err(storage_error)?;
                Ok(SubjectSet::new(Some(portfolio.client_id), companies(holdings)))
            }
            SubjectSelector::Companies {
                client_id,
                company_ids,
            } => {
                let rows = CompanyRepo::find_by_ids(&self.pool, company_ids)
                    .await
                    .map_err(storage_error)?;
                let found: BTreeMap<DbId, Company> = companies(rows)
                    .into_iter()
                    .map(|c| (c.id, c))
                    .collect();
                // Keep the caller's order; SubjectSet drops duplicates.
                let ordered = company_ids
                    .iter()
                    .map(|id| {
                        found.get(id).cloned().ok_or(CoreError::NotFound {
                            entity: "Company",
                            id: *id,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SubjectSet::new(*client_id, ordered))
            }
            SubjectSelector::Sector { client_id, sector } => {
                let rows = CompanyRepo::list_by_sector(&self.pool, sector)
                    .await
                    .map_err(storage_error)?;
                Ok(SubjectSet::new(*client_id, companies(rows)))
            }
            SubjectSelector::Region { client_id, region } => {
                let rows = CompanyRepo::list_by_region(&self.pool, region)
                    .await
                    .map_err(storage_error)?;
                Ok(SubjectSet::new(*client_id, companies(rows)))
            }
            SubjectSelector::All { client_id } => {
                let rows = CompanyRepo::list_all(&self.pool)
                    .await
                    .map_err(storage_error)?;
                Ok(SubjectSet::new(*client_id, companies(rows)))
            }
        }
    }
}

#[async_trait]
impl ResultStore for PgScreeningStore {
    async fn create_result(
        &self,
        result: NewScreeningResult,
    ) -> Result<ScreeningResult, CoreError> {
        let subjects = serde_json::to_value(&result.subjects).map_err(|e| {
            CoreError::Internal(format!("Failed to encode screening detail: {e}"))
        })?;
        let summary = &result.summary;
        let input = InsertScreeningResult {
            criteria_set_id: result.criteria_set_id,
            criteria_set_version: result.criteria_set_version,
            owner_id: result.owner_id,
            mode: result.mode.clone(),
            as_of_date: result.as_of_date,
            total_subjects: count_column(summary.total_subjects)?,
            passed: count_column(summary.passed)?,
            failed: count_column(summary.failed)?,
            pass_rate: count_column(summary.pass_rate as usize)?,
            subjects,
        };
        let row = ScreeningResultRepo::create(&self.pool, &input)
            .await
            .map_err(storage_error)?;
        tracing::debug!(result_id = row.id, "Persisted screening result");
        Ok(ScreeningResult::from_new(row.id, row.created_at, result))
    }

    async fn list_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ScreeningResultHeader>, CoreError> {
        let rows = ScreeningResultRepo::list(
            &self.pool,
            filter.criteria_set_id,
            filter.owner_id,
            filter.limit,
            filter.offset,
        )
        .await
        .map_err(storage_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_result(&self, id: DbId) -> Result<Option<ScreeningResult>, CoreError> {
        ScreeningResultRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?
            .map(ScreeningResult::try_from)
            .transpose()
    }

    async fn delete_result(&self, id: DbId) -> Result<bool, CoreError> {
        ScreeningResultRepo::delete(&self.pool, id)
            .await
            .map_err(storage_error)
    }
}

#[async_trait]
impl ScreeningStore for PgScreeningStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(storage_error)
    }
}
