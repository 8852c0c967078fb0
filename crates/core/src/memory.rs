//! In-memory implementation of every storage collaborator.
//!
//! Used by unit and HTTP tests and for running the service without a
//! database. Locks are never held across an `.await`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::criteria::CriteriaSet;
use crate::error::CoreError;
use crate::parameter::{Parameter, ParameterValueRecord};
use crate::screening::{NewScreeningResult, ResultFilter, ScreeningResult, ScreeningResultHeader};
use crate::store::{
    CriteriaStore, ParameterCatalogue, ParameterValueStore, ResultStore, ScreeningStore,
    SubjectStore,
};
use crate::subject::{Company, SubjectSelector, SubjectSet};
use crate::types::{DbId, EffectiveDate};

#[derive(Debug, Clone)]
struct Portfolio {
    client_id: DbId,
    company_ids: Vec<DbId>,
}

#[derive(Debug, Default)]
struct State {
    clients: BTreeSet<DbId>,
    companies: BTreeMap<DbId, Company>,
    portfolios: BTreeMap<DbId, Portfolio>,
    parameters: Vec<Parameter>,
    values: Vec<ParameterValueRecord>,
    criteria_sets: BTreeMap<DbId, CriteriaSet>,
    results: BTreeMap<DbId, ScreeningResult>,
    next_result_id: DbId,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    value_reads: AtomicUsize,
    fail_writes: AtomicBool,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_client(&self, id: DbId) {
        self.write().clients.insert(id);
    }

    pub fn insert_company(&self, company: Company) {
        self.write().companies.insert(company.id, company);
    }

    pub fn insert_portfolio(&self, id: DbId, client_id: DbId, company_ids: Vec<DbId>) {
        self.write().portfolios.insert(
            id,
            Portfolio {
                client_id,
                company_ids,
            },
        );
    }

    pub fn insert_criteria_set(&self, criteria_set: CriteriaSet) {
        self.write()
            .criteria_sets
            .insert(criteria_set.id, criteria_set);
    }

    pub fn insert_parameter(&self, parameter: Parameter) {
        self.write().parameters.push(parameter);
    }

    pub fn seed_values(&self, rows: impl IntoIterator<Item = ParameterValueRecord>) {
        self.write().values.extend(rows);
    }

    /// Make every subsequent result write fail, to exercise persistence errors.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail health checks and catalogue reads, as a lost database would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), CoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::Internal("Store is unavailable".to_string()));
        }
        Ok(())
    }

    /// Number of `get_values` calls served so far.
    pub fn value_reads(&self) -> usize {
        self.value_reads.load(Ordering::SeqCst)
    }

    pub fn result_count(&self) -> usize {
        self.read().results.len()
    }
}

fn same_label(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| a.trim().eq_ignore_ascii_case(b.trim()))
}

#[async_trait]
impl CriteriaStore for InMemoryStore {
    async fn get_criteria_set(&self, id: DbId) -> Result<Option<CriteriaSet>, CoreError> {
        Ok(self.read().criteria_sets.get(&id).cloned())
    }
}

#[async_trait]
impl ParameterCatalogue for InMemoryStore {
    async fn list_parameters(&self) -> Result<Vec<Parameter>, CoreError> {
        self.ensure_available()?;
        let mut parameters = self.read().parameters.clone();
        parameters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parameters)
    }
}

#[async_trait]
impl ParameterValueStore for InMemoryStore {
    async fn get_values(
        &self,
        company_ids: &[DbId],
        effective_date_lte: Option<EffectiveDate>,
    ) -> Result<Vec<ParameterValueRecord>, CoreError> {
        self.value_reads.fetch_add(1, Ordering::SeqCst);
        let mut rows: Vec<ParameterValueRecord> = self
            .read()
            .values
            .iter()
            .filter(|r| company_ids.contains(&r.company_id))
            .filter(|r| effective_date_lte.map_or(true, |lte| r.effective_date <= lte))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
        Ok(rows)
    }
}

#[async_trait]
impl SubjectStore for InMemoryStore {
    async fn resolve_subjects(&self, selector: &SubjectSelector) -> Result<SubjectSet, CoreError> {
        let state = self.read();
        let lookup = |id: &DbId| {
            state
                .companies
                .get(id)
                .cloned()
                .ok_or(CoreError::NotFound {
                    entity: "Company",
                    id: *id,
                })
        };

        if let Some(client_id) = selector.client_id() {
            if !state.clients.contains(&client_id) {
                return Err(CoreError::NotFound {
                    entity: "Client",
                    id: client_id,
                });
            }
        }

        match selector {
            SubjectSelector::Portfolio { portfolio_id } => {
                let portfolio =
                    state
                        .portfolios
                        .get(portfolio_id)
                        .ok_or(CoreError::NotFound {
                            entity: "Portfolio",
                            id: *portfolio_id,
                        })?;
                let companies = portfolio
                    .company_ids
                    .iter()
                    .map(lookup)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SubjectSet::new(Some(portfolio.client_id), companies))
            }
            SubjectSelector::Companies {
                client_id,
                company_ids,
            } => {
                let companies = company_ids
                    .iter()
                    .map(lookup)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SubjectSet::new(*client_id, companies))
            }
            SubjectSelector::Sector { client_id, sector } => {
                let companies = state
                    .companies
                    .values()
                    .filter(|c| same_label(c.sector.as_deref(), sector))
                    .cloned()
                    .collect();
                Ok(SubjectSet::new(*client_id, companies))
            }
            SubjectSelector::Region { client_id, region } => {
                let companies = state
                    .companies
                    .values()
                    .filter(|c| same_label(c.region.as_deref(), region))
                    .cloned()
                    .collect();
                Ok(SubjectSet::new(*client_id, companies))
            }
            SubjectSelector::All { client_id } => Ok(SubjectSet::new(
                *client_id,
                state.companies.values().cloned().collect(),
            )),
        }
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn create_result(
        &self,
        result: NewScreeningResult,
    ) -> Result<ScreeningResult, CoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::Internal(
                "Failed to persist screening result".to_string(),
            ));
        }
        let mut state = self.write();
        state.next_result_id += 1;
        let id = state.next_result_id;
        let stored = ScreeningResult::from_new(id, chrono::Utc::now(), result);
        state.results.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ScreeningResultHeader>, CoreError> {
        let state = self.read();
        Ok(state
            .results
            .values()
            .rev()
            .map(ScreeningResult::header)
            .filter(|h| filter.matches(h))
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn get_result(&self, id: DbId) -> Result<Option<ScreeningResult>, CoreError> {
        Ok(self.read().results.get(&id).cloned())
    }

    async fn delete_result(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.write().results.remove(&id).is_some())
    }
}

#[async_trait]
impl ScreeningStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        self.ensure_available()
    }
}
