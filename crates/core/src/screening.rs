//! Per-subject rule evaluation and screening result types.
//!
//! Rule expressions use violation semantics: an expression that holds means
//! the company exhibits the undesired condition. Each rule is assessed with
//! three-valued logic so missing data is never mistaken for compliance:
//!
//! | assessment | outcome         | passed |
//! |------------|-----------------|--------|
//! | true       | `violated`      | no     |
//! | false      | `satisfied`     | yes    |
//! | unknown    | `indeterminate` | no     |
//!
//! Only failing rules with `exclude` severity flip a subject to failed.

use serde::{Deserialize, Serialize};

use crate::criteria::{Rule, Severity};
use crate::expression::{Expression, Truth};
use crate::parameter::{ParameterValues, ScalarValue};
use crate::subject::Company;
use crate::types::{DbId, EffectiveDate, Timestamp};

/// Default page size for result listings.
pub const DEFAULT_LIST_LIMIT: i64 = 25;

/// Maximum page size for result listings.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Generic reason used when a composite rule fails without a configured message.
pub const GENERIC_FAILURE_REASON: &str = "Rule condition not met";

/// Outcome of one rule for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    Satisfied,
    Violated,
    Indeterminate,
}

impl From<Truth> for RuleOutcome {
    fn from(truth: Truth) -> Self {
        match truth {
            Truth::True => Self::Violated,
            Truth::False => Self::Satisfied,
            Truth::Unknown => Self::Indeterminate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: DbId,
    pub rule_name: String,
    pub severity: Severity,
    pub outcome: RuleOutcome,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<ScalarValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub company_id: DbId,
    pub company_name: String,
    pub passed: bool,
    pub rule_results: Vec<RuleResult>,
}

impl SubjectResult {
    pub fn failed_rule_count(&self) -> usize {
        self.rule_results.iter().filter(|r| !r.passed).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningSummary {
    pub total_subjects: usize,
    pub passed: usize,
    pub failed: usize,
    /// Rounded integer percentage; `0` when there are no subjects.
    pub pass_rate: u32,
}

impl ScreeningSummary {
    pub fn from_subjects(subjects: &[SubjectResult]) -> Self {
        let total_subjects = subjects.len();
        let passed = subjects.iter().filter(|s| s.passed).count();
        let pass_rate = if total_subjects == 0 {
            0
        } else {
            (passed as f64 / total_subjects as f64 * 100.0).round() as u32
        };
        Self {
            total_subjects,
            passed,
            failed: total_subjects - passed,
            pass_rate,
        }
    }
}

/// A screening result before the store assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScreeningResult {
    pub criteria_set_id: DbId,
    pub criteria_set_version: i32,
    pub owner_id: Option<DbId>,
    pub mode: String,
    pub as_of_date: EffectiveDate,
    pub summary: ScreeningSummary,
    pub subjects: Vec<SubjectResult>,
}

/// A persisted, immutable screening result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub id: DbId,
    pub criteria_set_id: DbId,
    pub criteria_set_version: i32,
    pub owner_id: Option<DbId>,
    pub mode: String,
    pub as_of_date: EffectiveDate,
    pub summary: ScreeningSummary,
    pub subjects: Vec<SubjectResult>,
    pub created_at: Timestamp,
}

impl ScreeningResult {
    pub fn from_new(id: DbId, created_at: Timestamp, new: NewScreeningResult) -> Self {
        Self {
            id,
            criteria_set_id: new.criteria_set_id,
            criteria_set_version: new.criteria_set_version,
            owner_id: new.owner_id,
            mode: new.mode,
            as_of_date: new.as_of_date,
            summary: new.summary,
            subjects: new.subjects,
            created_at,
        }
    }

    pub fn header(&self) -> ScreeningResultHeader {
        ScreeningResultHeader {
            id: self.id,
            criteria_set_id: self.criteria_set_id,
            owner_id: self.owner_id,
            mode: self.mode.clone(),
            as_of_date: self.as_of_date,
            summary: self.summary,
            created_at: self.created_at,
        }
    }
}

/// Listing view of a result, without per-subject detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResultHeader {
    pub id: DbId,
    pub criteria_set_id: DbId,
    pub owner_id: Option<DbId>,
    pub mode: String,
    pub as_of_date: EffectiveDate,
    pub summary: ScreeningSummary,
    pub created_at: Timestamp,
}

/// Filters for listing stored results. Construct with [`ResultFilter::new`]
/// so paging values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultFilter {
    pub criteria_set_id: Option<DbId>,
    pub owner_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}

impl ResultFilter {
    pub fn new(
        criteria_set_id: Option<DbId>,
        owner_id: Option<DbId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Self {
        Self {
            criteria_set_id,
            owner_id,
            limit: limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    pub fn matches(&self, header: &ScreeningResultHeader) -> bool {
        self.criteria_set_id
            .map_or(true, |id| id == header.criteria_set_id)
            && self.owner_id.map_or(true, |id| Some(id) == header.owner_id)
    }
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

/// Evaluate one rule against a subject's resolved values.
pub fn evaluate_rule(rule: &Rule, values: &ParameterValues) -> RuleResult {
    let outcome = RuleOutcome::from(rule.expression.assess(values));
    let passed = outcome == RuleOutcome::Satisfied;
    let display = rule.expression.extract_actual_value_and_threshold(values);

    let missing_parameters = if outcome == RuleOutcome::Indeterminate {
        rule.expression.missing_parameters(values)
    } else {
        Vec::new()
    };

    let failure_reason = match outcome {
        RuleOutcome::Satisfied => None,
        RuleOutcome::Indeterminate => Some(format!(
            "Missing data for parameter(s): {}",
            missing_parameters.join(", ")
        )),
        RuleOutcome::Violated => Some(violation_reason(rule, values)),
    };

    let (actual_value, threshold) = match display {
        Some(d) => (d.actual_value, Some(d.threshold)),
        None => (None, None),
    };

    RuleResult {
        rule_id: rule.id,
        rule_name: rule.name.clone(),
        severity: rule.severity,
        outcome,
        passed,
        failure_reason,
        actual_value,
        threshold,
        missing_parameters,
    }
}

fn violation_reason(rule: &Rule, values: &ParameterValues) -> String {
    if let Some(msg) = rule.failure_message.as_deref().filter(|m| !m.trim().is_empty()) {
        return msg.to_string();
    }
    match &rule.expression {
        Expression::Comparison(cmp) => match values.get(&cmp.parameter) {
            Some(actual) => format!(
                "{} is {actual}, which meets the exclusion condition {}",
                cmp.parameter,
                cmp.threshold()
            ),
            None => format!("{} meets the exclusion condition {}", cmp.parameter, cmp.threshold()),
        },
        Expression::Logical(_) => GENERIC_FAILURE_REASON.to_string(),
    }
}

/// Evaluate every rule, in authored order, for one company.
pub fn screen_subject(
    company: &Company,
    rules: &[Rule],
    values: &ParameterValues,
) -> SubjectResult {
    let rule_results: Vec<RuleResult> = rules.iter().map(|r| evaluate_rule(r, values)).collect();
    let passed = !rule_results
        .iter()
        .any(|r| r.severity == Severity::Exclude && !r.passed);
    SubjectResult {
        company_id: company.id,
        company_name: company.name.clone(),
        passed,
        rule_results,
    }
}
