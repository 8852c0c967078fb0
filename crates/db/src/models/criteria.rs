//! Criteria set and rule rows.

use esgscreen_core::criteria::{CriteriaSet, Rule, Severity};
use esgscreen_core::error::CoreError;
use esgscreen_core::expression::parse_expression;
use esgscreen_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `criteria_sets` table. `owner_id` is NULL for global sets.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CriteriaSetRow {
    pub id: DbId,
    pub name: String,
    pub version: i32,
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RuleRow {
    pub id: DbId,
    pub criteria_set_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub expression: serde_json::Value,
    pub failure_message: Option<String>,
    pub severity: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<RuleRow> for Rule {
    type Error = CoreError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        let expression = parse_expression(&row.expression).map_err(|e| {
            CoreError::Validation(format!("Rule '{}': stored expression is invalid: {e}", row.name))
        })?;
        let severity = Severity::from_str_value(&row.severity).map_err(CoreError::Internal)?;
        Ok(Rule {
            id: row.id,
            name: row.name,
            description: row.description,
            expression,
            failure_message: row.failure_message,
            severity,
        })
    }
}

impl CriteriaSetRow {
    /// Assemble the domain set from its rules, already in authored order.
    pub fn into_criteria_set(self, rules: Vec<RuleRow>) -> Result<CriteriaSet, CoreError> {
        let rules = rules
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CriteriaSet {
            id: self.id,
            name: self.name,
            version: self.version,
            is_global: self.owner_id.is_none(),
            owner_id: self.owner_id,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn set_row(owner_id: Option<DbId>) -> CriteriaSetRow {
        CriteriaSetRow {
            id: 7,
            name: "Paris aligned".into(),
            version: 2,
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rule_row(id: DbId, expression: serde_json::Value, severity: &str) -> RuleRow {
        RuleRow {
            id,
            criteria_set_id: 7,
            name: format!("Rule {id}"),
            description: None,
            expression,
            failure_message: None,
            severity: severity.into(),
            sort_order: id as i32,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn rows_assemble_into_criteria_set() {
        let carbon = json!({
            "type": "comparison",
            "parameter": "carbon_emissions",
            "operator": ">=",
            "value": 500
        });
        let set = set_row(None)
            .into_criteria_set(vec![rule_row(1, carbon, "exclude")])
            .unwrap();
        assert!(set.is_global);
        assert_eq!(set.version, 2);
        assert_eq!(set.rules.len(), 1);
        assert_eq!(set.rules[0].severity, Severity::Exclude);

        let owned = set_row(Some(3)).into_criteria_set(vec![]).unwrap();
        assert!(!owned.is_global);
        assert_eq!(owned.owner_id, Some(3));
    }

    #[test]
    fn malformed_stored_expression_names_the_rule() {
        let broken = json!({"type": "comparison", "parameter": "x", "operator": "~", "value": 1});
        let err = set_row(None)
            .into_criteria_set(vec![rule_row(4, broken, "warn")])
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("Rule 4"));
    }

    #[test]
    fn unknown_severity_is_internal() {
        let expr = json!({"type": "comparison", "parameter": "x", "operator": "==", "value": true});
        assert_matches!(
            Rule::try_from(rule_row(1, expr, "block")),
            Err(CoreError::Internal(_))
        );
    }
}
