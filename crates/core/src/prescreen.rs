//! Pre-screening data completeness check.
//!
//! Reports which companies lack values for parameters the criteria set
//! requires, so a user can be warned before committing to a screening run.
//! Read-only; safe to call repeatedly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::observe::ScreeningObserver;
use crate::resolver::ResolvedValues;
use crate::subject::Company;
use crate::types::{DbId, EffectiveDate};

/// Parameters missing for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIssue {
    pub company_id: DbId,
    pub company_name: String,
    pub missing_parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub as_of_date: EffectiveDate,
    pub total_companies: usize,
    pub companies_with_complete_data: usize,
    pub companies_with_missing_data: usize,
    pub required_parameters: Vec<String>,
    /// Parameters no company in the set has any value for.
    pub missing_parameters: Vec<String>,
    /// Companies with missing data, most missing parameters first.
    pub company_issues: Vec<CompanyIssue>,
}

/// Build the report from already-resolved values.
///
/// With no required parameters the report is trivially valid. With no
/// companies nothing can be missing, so the global-missing list is empty.
pub fn build_validation_report(
    companies: &[Company],
    required: &BTreeSet<String>,
    resolved: &ResolvedValues,
    as_of_date: EffectiveDate,
    observer: &dyn ScreeningObserver,
) -> ValidationReport {
    let total_companies = companies.len();
    if required.is_empty() {
        return ValidationReport {
            is_valid: true,
            as_of_date,
            total_companies,
            companies_with_complete_data: total_companies,
            companies_with_missing_data: 0,
            required_parameters: Vec::new(),
            missing_parameters: Vec::new(),
            company_issues: Vec::new(),
        };
    }

    let mut missing_everywhere: Option<BTreeSet<String>> = None;
    let mut company_issues = Vec::new();

    for company in companies {
        let missing: BTreeSet<String> = match resolved.get(&company.id) {
            Some(values) => required
                .iter()
                .filter(|name| !values.contains(name))
                .cloned()
                .collect(),
            None => required.clone(),
        };

        for parameter in &missing {
            observer.parameter_unavailable(company.id, parameter);
        }

        missing_everywhere = Some(match missing_everywhere {
            None => missing.clone(),
            Some(acc) => acc.intersection(&missing).cloned().collect(),
        });

        if !missing.is_empty() {
            company_issues.push(CompanyIssue {
                company_id: company.id,
                company_name: company.name.clone(),
                missing_parameters: missing.into_iter().collect(),
            });
        }
    }

    // Stable: ties keep subject order.
    company_issues.sort_by(|a, b| b.missing_parameters.len().cmp(&a.missing_parameters.len()));

    let companies_with_missing_data = company_issues.len();
    ValidationReport {
        is_valid: company_issues.is_empty(),
        as_of_date,
        total_companies,
        companies_with_complete_data: total_companies - companies_with_missing_data,
        companies_with_missing_data,
        required_parameters: required.iter().cloned().collect(),
        missing_parameters: missing_everywhere
            .map(|set| set.into_iter().collect())
            .unwrap_or_default(),
        company_issues,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::observe::NoopObserver;
    use crate::parameter::{ParameterValues, ScalarValue};

    fn as_of() -> EffectiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn company(id: DbId) -> Company {
        Company {
            id,
            name: format!("Company {id}"),
            ticker: None,
            sector: None,
            region: None,
        }
    }

    fn required(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn with(names: &[&str]) -> ParameterValues {
        names
            .iter()
            .map(|n| (*n, ScalarValue::from(1)))
            .collect()
    }

    #[test]
    fn complete_data_is_valid() {
        let companies = vec![company(1), company(2)];
        let resolved: ResolvedValues =
            [(1, with(&["carbon", "water"])), (2, with(&["carbon", "water"]))].into();
        let report = build_validation_report(
            &companies,
            &required(&["carbon", "water"]),
            &resolved,
            as_of(),
            &NoopObserver,
        );
        assert!(report.is_valid);
        assert_eq!(report.companies_with_complete_data, 2);
        assert!(report.missing_parameters.is_empty());
        assert!(report.company_issues.is_empty());
    }

    #[test]
    fn parameter_missing_everywhere_is_reported_globally() {
        let companies = vec![company(1), company(2), company(3)];
        let resolved: ResolvedValues = [
            (1, with(&["carbon"])),
            (2, with(&["carbon"])),
            (3, ParameterValues::new()),
        ]
        .into();
        let report = build_validation_report(
            &companies,
            &required(&["carbon", "p"]),
            &resolved,
            as_of(),
            &NoopObserver,
        );
        assert!(!report.is_valid);
        assert_eq!(report.missing_parameters, vec!["p"]);
        assert_eq!(report.companies_with_missing_data, 3);
        assert_eq!(report.companies_with_complete_data, 0);
    }

    #[test]
    fn issues_are_sorted_worst_first() {
        let companies = vec![company(1), company(2), company(3)];
        let resolved: ResolvedValues = [
            (1, with(&["a", "b"])),
            (2, ParameterValues::new()),
            (3, with(&["a"])),
        ]
        .into();
        let report = build_validation_report(
            &companies,
            &required(&["a", "b", "c"]),
            &resolved,
            as_of(),
            &NoopObserver,
        );
        let order: Vec<DbId> = report.company_issues.iter().map(|i| i.company_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(report.company_issues[0].missing_parameters, vec!["a", "b", "c"]);
        assert_eq!(report.missing_parameters, vec!["c"]);
    }

    #[test]
    fn no_required_parameters_is_trivially_valid() {
        let report = build_validation_report(
            &[company(1)],
            &BTreeSet::new(),
            &ResolvedValues::new(),
            as_of(),
            &NoopObserver,
        );
        assert!(report.is_valid);
        assert_eq!(report.total_companies, 1);
        assert_eq!(report.companies_with_complete_data, 1);
    }

    #[test]
    fn no_companies_has_no_global_missing() {
        let report = build_validation_report(
            &[],
            &required(&["carbon"]),
            &ResolvedValues::new(),
            as_of(),
            &NoopObserver,
        );
        assert!(report.is_valid);
        assert!(report.missing_parameters.is_empty());
        assert_eq!(report.required_parameters, vec!["carbon"]);
    }
}
