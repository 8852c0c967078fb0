//! Screening orchestration.
//!
//! One parameterized service handles every screening mode; the subject
//! selector decides which companies are covered. The order of work is:
//! resolve subjects, authorize the criteria set against the subject owner,
//! resolve parameter values, evaluate rules per subject, summarize, persist.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::criteria::CriteriaSet;
use crate::error::CoreError;
use crate::expression::parse_expression;
use crate::observe::{NoopObserver, ScreeningObserver};
use crate::parameter::{Parameter, ParameterValues};
use crate::prescreen::{build_validation_report, ValidationReport};
use crate::requirements::{required_parameters, required_parameters_for_rules};
use crate::resolver::resolve_parameter_values;
use crate::screening::{
    screen_subject, NewScreeningResult, ResultFilter, ScreeningResult, ScreeningResultHeader,
    ScreeningSummary, SubjectResult,
};
use crate::store::{CriteriaStore, ParameterCatalogue, ResultStore, ScreeningStore, SubjectStore};
use crate::subject::{SubjectSelector, SubjectSet};
use crate::types::{DbId, EffectiveDate};

/// Input shared by `validate` and `screen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningRequest {
    pub selector: SubjectSelector,
    pub criteria_set_id: DbId,
    /// Defaults to today's UTC date.
    #[serde(default)]
    pub as_of_date: Option<EffectiveDate>,
}

impl ScreeningRequest {
    fn effective_as_of(&self) -> EffectiveDate {
        self.as_of_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

/// Outcome of an authoring-time expression check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionCheck {
    pub valid: bool,
    pub required_parameters: Vec<String>,
}

/// Storage status as seen by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreHealth {
    pub reachable: bool,
    /// Size of the parameter catalogue; `None` when it could not be read.
    pub parameters: Option<usize>,
}

impl StoreHealth {
    pub fn is_healthy(&self) -> bool {
        self.reachable && self.parameters.is_some()
    }
}

#[derive(Clone)]
pub struct ScreeningService {
    store: Arc<dyn ScreeningStore>,
    observer: Arc<dyn ScreeningObserver>,
}

impl ScreeningService {
    pub fn new(store: Arc<dyn ScreeningStore>) -> Self {
        Self {
            store,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScreeningObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Check that storage answers and the parameter catalogue is readable.
    pub async fn store_health(&self) -> StoreHealth {
        if let Err(err) = self.store.health_check().await {
            tracing::warn!(error = %err, "Screening store is unreachable");
            return StoreHealth {
                reachable: false,
                parameters: None,
            };
        }
        let parameters = match self.store.list_parameters().await {
            Ok(parameters) => Some(parameters.len()),
            Err(err) => {
                tracing::warn!(error = %err, "Parameter catalogue could not be read");
                None
            }
        };
        StoreHealth {
            reachable: true,
            parameters,
        }
    }

    /// Parse and validate a raw expression. With `check_catalogue` every
    /// referenced parameter must also exist in the parameter catalogue with a
    /// compatible data type.
    pub async fn validate_expression(
        &self,
        raw: &serde_json::Value,
        check_catalogue: bool,
    ) -> Result<ExpressionCheck, CoreError> {
        let expression = parse_expression(raw)?;
        if check_catalogue {
            let catalogue = self.store.list_parameters().await?;
            expression.validate_against_catalogue(&catalogue)?;
        }
        Ok(ExpressionCheck {
            valid: true,
            required_parameters: required_parameters(&expression).into_iter().collect(),
        })
    }

    /// Load the criteria set and the subjects, and check the set may be used.
    async fn prepare(
        &self,
        request: &ScreeningRequest,
    ) -> Result<(CriteriaSet, SubjectSet), CoreError> {
        let criteria_set = self
            .store
            .get_criteria_set(request.criteria_set_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CriteriaSet",
                id: request.criteria_set_id,
            })?;
        let subjects = self.store.resolve_subjects(&request.selector).await?;
        criteria_set.authorize_for(subjects.owner_id)?;
        Ok((criteria_set, subjects))
    }

    /// Report data completeness for a prospective screening run.
    pub async fn validate(
        &self,
        request: &ScreeningRequest,
    ) -> Result<ValidationReport, CoreError> {
        let as_of = request.effective_as_of();
        let (criteria_set, subjects) = self.prepare(request).await?;
        let required = required_parameters_for_rules(&criteria_set.rules);

        let resolved = if required.is_empty() {
            Default::default()
        } else {
            resolve_parameter_values(
                self.store.as_ref(),
                &subjects.company_ids(),
                as_of,
                self.observer.as_ref(),
            )
            .await?
        };

        Ok(build_validation_report(
            &subjects.subjects,
            &required,
            &resolved,
            as_of,
            self.observer.as_ref(),
        ))
    }

    /// Screen the selected companies and persist the result.
    pub async fn screen(&self, request: &ScreeningRequest) -> Result<ScreeningResult, CoreError> {
        let as_of = request.effective_as_of();
        let (criteria_set, subjects) = self.prepare(request).await?;
        criteria_set.validate()?;

        let resolved = resolve_parameter_values(
            self.store.as_ref(),
            &subjects.company_ids(),
            as_of,
            self.observer.as_ref(),
        )
        .await?;

        let empty = ParameterValues::new();
        let subject_results: Vec<SubjectResult> = subjects
            .subjects
            .iter()
            .map(|company| {
                let values = resolved.get(&company.id).unwrap_or(&empty);
                let result = screen_subject(company, &criteria_set.rules, values);
                self.observer
                    .subject_screened(company.id, result.passed, result.failed_rule_count());
                result
            })
            .collect();

        let summary = ScreeningSummary::from_subjects(&subject_results);
        let stored = self
            .store
            .create_result(NewScreeningResult {
                criteria_set_id: criteria_set.id,
                criteria_set_version: criteria_set.version,
                owner_id: subjects.owner_id,
                mode: request.selector.mode().to_string(),
                as_of_date: as_of,
                summary,
                subjects: subject_results,
            })
            .await?;

        self.observer.screening_completed(stored.id, &stored.summary);
        Ok(stored)
    }

    pub async fn list_parameters(&self) -> Result<Vec<Parameter>, CoreError> {
        self.store.list_parameters().await
    }

    pub async fn list_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ScreeningResultHeader>, CoreError> {
        self.store.list_results(filter).await
    }

    pub async fn get_result(&self, id: DbId) -> Result<ScreeningResult, CoreError> {
        self.store
            .get_result(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ScreeningResult",
                id,
            })
    }

    pub async fn delete_result(&self, id: DbId) -> Result<(), CoreError> {
        if self.store.delete_result(id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: "ScreeningResult",
                id,
            })
        }
    }
}
