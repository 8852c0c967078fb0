//! Expression evaluator. Pure logic, no database access.
//!
//! Two evaluation modes are provided:
//!
//! - [`Expression::evaluate`] is two-valued. A comparison whose parameter has
//!   no value is `false`, whatever the operator.
//! - [`Expression::assess`] is three-valued (Kleene logic). A comparison whose
//!   parameter has no value is [`Truth::Unknown`], and the unknown propagates
//!   unless the surrounding `AND`/`OR` is decided by another child.

use serde::{Deserialize, Serialize};

use super::model::{Comparison, ComparisonOperator, Expression, Logical, LogicalKind, Operand};
use crate::parameter::{normalize_parameter_name, ParameterValues, ScalarValue};

/// Three-valued truth used when data may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }
}

impl From<bool> for Truth {
    fn from(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }
}

/// Display data for a comparison: the value found and the rendered condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDisplay {
    pub actual_value: Option<ScalarValue>,
    pub threshold: String,
}

impl Expression {
    /// Evaluate against the given values; missing parameters make a comparison `false`.
    pub fn evaluate(&self, values: &ParameterValues) -> bool {
        match self {
            Expression::Comparison(cmp) => cmp.evaluate(values),
            Expression::Logical(logical) => logical.evaluate(values),
        }
    }

    /// Evaluate with Kleene logic; missing parameters make a comparison `Unknown`.
    pub fn assess(&self, values: &ParameterValues) -> Truth {
        match self {
            Expression::Comparison(cmp) => match values.get(&cmp.parameter) {
                Some(actual) => Truth::from(cmp.test(actual)),
                None => Truth::Unknown,
            },
            Expression::Logical(logical) => logical.assess(values),
        }
    }

    /// Actual value and rendered threshold, defined only for comparison nodes.
    pub fn extract_actual_value_and_threshold(
        &self,
        values: &ParameterValues,
    ) -> Option<ComparisonDisplay> {
        match self {
            Expression::Comparison(cmp) => Some(ComparisonDisplay {
                actual_value: values.get(&cmp.parameter).cloned(),
                threshold: cmp.threshold(),
            }),
            Expression::Logical(_) => None,
        }
    }

    /// Referenced parameters (normalized) with no value in `values`, in tree order.
    pub fn missing_parameters(&self, values: &ParameterValues) -> Vec<String> {
        let mut missing = Vec::new();
        self.collect_missing(values, &mut missing);
        missing
    }

    fn collect_missing(&self, values: &ParameterValues, out: &mut Vec<String>) {
        match self {
            Expression::Comparison(cmp) => {
                let name = normalize_parameter_name(&cmp.parameter);
                if !values.contains(&name) && !out.contains(&name) {
                    out.push(name);
                }
            }
            Expression::Logical(logical) => {
                for child in &logical.children {
                    child.collect_missing(values, out);
                }
            }
        }
    }
}

impl Comparison {
    fn evaluate(&self, values: &ParameterValues) -> bool {
        values
            .get(&self.parameter)
            .is_some_and(|actual| self.test(actual))
    }

    /// Apply the operator to a value known to be present.
    pub fn test(&self, actual: &ScalarValue) -> bool {
        match (self.operator, &self.value) {
            (op, Operand::Scalar(expected)) if op.is_numeric() => {
                match (actual.as_f64(), expected.as_f64()) {
                    (Some(a), Some(b)) => match op {
                        ComparisonOperator::Lt => a < b,
                        ComparisonOperator::Le => a <= b,
                        ComparisonOperator::Gt => a > b,
                        _ => a >= b,
                    },
                    _ => false,
                }
            }
            (ComparisonOperator::Eq, Operand::Scalar(expected)) => actual == expected,
            (ComparisonOperator::Ne, Operand::Scalar(expected)) => actual != expected,
            (ComparisonOperator::In, Operand::List(items)) => items.contains(actual),
            (ComparisonOperator::NotIn, Operand::List(items)) => !items.contains(actual),
            (ComparisonOperator::Contains, Operand::Scalar(ScalarValue::Text(needle))) => {
                actual.as_str().is_some_and(|haystack| haystack.contains(needle.as_str()))
            }
            // Operand shape does not fit the operator.
            _ => false,
        }
    }

    /// Human-readable rendering of operator and operand, e.g. `>= 500`.
    pub fn threshold(&self) -> String {
        format!("{} {}", self.operator, self.value)
    }
}

impl Logical {
    fn evaluate(&self, values: &ParameterValues) -> bool {
        match self.kind {
            LogicalKind::And => self.children.iter().all(|c| c.evaluate(values)),
            LogicalKind::Or => self.children.iter().any(|c| c.evaluate(values)),
            // Only the first child is meaningful; validation rejects any other shape.
            LogicalKind::Not => self
                .children
                .first()
                .is_some_and(|c| !c.evaluate(values)),
        }
    }

    fn assess(&self, values: &ParameterValues) -> Truth {
        match self.kind {
            LogicalKind::And => {
                let mut result = Truth::True;
                for child in &self.children {
                    match child.assess(values) {
                        Truth::False => return Truth::False,
                        Truth::Unknown => result = Truth::Unknown,
                        Truth::True => {}
                    }
                }
                result
            }
            LogicalKind::Or => {
                let mut result = Truth::False;
                for child in &self.children {
                    match child.assess(values) {
                        Truth::True => return Truth::True,
                        Truth::Unknown => result = Truth::Unknown,
                        Truth::False => {}
                    }
                }
                result
            }
            LogicalKind::Not => self
                .children
                .first()
                .map_or(Truth::False, |c| c.assess(values).not()),
        }
    }
}
