//! Criteria sets and the rules they contain.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::expression::Expression;
use crate::types::DbId;

/// Valid severity strings.
pub const SEVERITY_EXCLUDE: &str = "exclude";
pub const SEVERITY_WARN: &str = "warn";
pub const SEVERITY_INFO: &str = "info";

/// All valid severity strings.
pub const VALID_SEVERITIES: &[&str] = &[SEVERITY_EXCLUDE, SEVERITY_WARN, SEVERITY_INFO];

/// How a failing rule affects the subject. Only `Exclude` changes the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Exclude,
    Warn,
    Info,
}

impl Severity {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            SEVERITY_EXCLUDE => Ok(Self::Exclude),
            SEVERITY_WARN => Ok(Self::Warn),
            SEVERITY_INFO => Ok(Self::Info),
            _ => Err(format!(
                "Invalid severity '{s}'. Must be one of: {}",
                VALID_SEVERITIES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exclude => SEVERITY_EXCLUDE,
            Self::Warn => SEVERITY_WARN,
            Self::Info => SEVERITY_INFO,
        }
    }
}

/// A screening rule. The expression describes the undesired condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: DbId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub expression: Expression,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    pub severity: Severity,
}

/// An ordered, versioned collection of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaSet {
    pub id: DbId,
    pub name: String,
    pub version: i32,
    pub is_global: bool,
    /// Owning client; `None` for global sets.
    pub owner_id: Option<DbId>,
    pub rules: Vec<Rule>,
}

impl CriteriaSet {
    /// A non-global set may only screen subjects owned by the same client.
    pub fn authorize_for(&self, subject_owner: Option<DbId>) -> Result<(), CoreError> {
        if self.is_global {
            return Ok(());
        }
        match (self.owner_id, subject_owner) {
            (Some(owner), Some(subject)) if owner == subject => Ok(()),
            _ => Err(CoreError::Forbidden(format!(
                "Criteria set {} is not available to this client",
                self.id
            ))),
        }
    }

    /// Run typed validation on every rule expression.
    pub fn validate(&self) -> Result<(), CoreError> {
        for rule in &self.rules {
            rule.expression.validate().map_err(|e| match e {
                CoreError::Validation(msg) => {
                    CoreError::Validation(format!("Rule '{}': {msg}", rule.name))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::expression::{ComparisonOperator, Logical, LogicalKind, Operand};

    fn set(is_global: bool, owner_id: Option<DbId>) -> CriteriaSet {
        CriteriaSet {
            id: 7,
            name: "Fossil fuel exclusion".into(),
            version: 1,
            is_global,
            owner_id,
            rules: vec![],
        }
    }

    #[test]
    fn global_sets_are_open_to_everyone() {
        assert!(set(true, None).authorize_for(Some(3)).is_ok());
        assert!(set(true, None).authorize_for(None).is_ok());
    }

    #[test]
    fn client_sets_require_matching_owner() {
        assert!(set(false, Some(3)).authorize_for(Some(3)).is_ok());
        assert_matches!(
            set(false, Some(3)).authorize_for(Some(4)),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            set(false, Some(3)).authorize_for(None),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn severity_round_trips_database_strings() {
        for s in VALID_SEVERITIES {
            assert_eq!(Severity::from_str_value(s).unwrap().as_str(), *s);
        }
        assert!(Severity::from_str_value("block").is_err());
    }

    #[test]
    fn validate_names_the_offending_rule() {
        let mut criteria = set(true, None);
        criteria.rules.push(Rule {
            id: 1,
            name: "No tobacco".into(),
            description: None,
            expression: Expression::Logical(Logical {
                kind: LogicalKind::Not,
                children: vec![],
            }),
            failure_message: None,
            severity: Severity::Exclude,
        });
        criteria.rules.insert(
            0,
            Rule {
                id: 2,
                name: "Carbon cap".into(),
                description: None,
                expression: Expression::comparison(
                    "carbon",
                    ComparisonOperator::Ge,
                    Operand::from(500),
                ),
                failure_message: None,
                severity: Severity::Exclude,
            },
        );
        assert_matches!(
            criteria.validate(),
            Err(CoreError::Validation(msg)) if msg.starts_with("Rule 'No tobacco'")
        );
    }
}
