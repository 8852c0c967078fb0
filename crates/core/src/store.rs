//! Storage collaborators used by the screening service.
//!
//! The core never talks to a database directly. Implementations live in the
//! `db` crate (PostgreSQL) and in [`crate::memory`] (tests, local tooling).

use async_trait::async_trait;

use crate::criteria::CriteriaSet;
use crate::error::CoreError;
use crate::parameter::{Parameter, ParameterValueRecord};
use crate::screening::{NewScreeningResult, ResultFilter, ScreeningResult, ScreeningResultHeader};
use crate::subject::{SubjectSelector, SubjectSet};
use crate::types::{DbId, EffectiveDate};

#[async_trait]
pub trait CriteriaStore: Send + Sync {
    /// Load a criteria set with its rules in authored order.
    async fn get_criteria_set(&self, id: DbId) -> Result<Option<CriteriaSet>, CoreError>;
}

#[async_trait]
pub trait ParameterValueStore: Send + Sync {
    /// All value rows for `company_ids`, optionally limited to
    /// `effective_date <= effective_date_lte`, newest first.
    async fn get_values(
        &self,
        company_ids: &[DbId],
        effective_date_lte: Option<EffectiveDate>,
    ) -> Result<Vec<ParameterValueRecord>, CoreError>;
}

#[async_trait]
pub trait ParameterCatalogue: Send + Sync {
    /// Every parameter definition, ordered by name.
    async fn list_parameters(&self) -> Result<Vec<Parameter>, CoreError>;
}

#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// Resolve the companies a selector covers.
    ///
    /// Unknown portfolio or company ids are [`CoreError::NotFound`].
    async fn resolve_subjects(&self, selector: &SubjectSelector) -> Result<SubjectSet, CoreError>;
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist a result in a single atomic write.
    async fn create_result(&self, result: NewScreeningResult)
        -> Result<ScreeningResult, CoreError>;

    async fn list_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ScreeningResultHeader>, CoreError>;

    async fn get_result(&self, id: DbId) -> Result<Option<ScreeningResult>, CoreError>;

    /// Returns `true` if a result was removed.
    async fn delete_result(&self, id: DbId) -> Result<bool, CoreError>;
}

/// Everything the screening service needs from storage.
#[async_trait]
pub trait ScreeningStore:
    CriteriaStore + ParameterCatalogue + ParameterValueStore + SubjectStore + ResultStore
{
    /// Cheap connectivity check.
    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
