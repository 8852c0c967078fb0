//! Rule condition tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parameter::ScalarValue;

/// A rule condition: a comparison leaf or a logical combination of children.
///
/// Serialized tagged by `type`:
///
/// ```text
/// {"type":"comparison","parameter":"carbon_emissions","operator":">=","value":500}
/// {"type":"logical","kind":"AND","children":[...]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    Comparison(Comparison),
    Logical(Logical),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub parameter: String,
    pub operator: ComparisonOperator,
    pub value: Operand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logical {
    pub kind: LogicalKind,
    pub children: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalKind {
    And,
    Or,
    Not,
}

impl LogicalKind {
    pub const ALL: &'static [&'static str] = &["AND", "OR", "NOT"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not_in")]
    NotIn,
    #[serde(rename = "contains")]
    Contains,
}

impl ComparisonOperator {
    /// Wire spellings of every allowed operator.
    pub const ALL: &'static [&'static str] =
        &["==", "!=", "<", "<=", ">", ">=", "in", "not_in", "contains"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Contains => "contains",
        }
    }

    /// Ordering operators only apply to numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    /// Membership operators take a list operand.
    pub fn is_membership(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    List(Vec<ScalarValue>),
    Scalar(ScalarValue),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Expression {
    /// Convenience constructor for a comparison leaf.
    pub fn comparison(
        parameter: impl Into<String>,
        operator: ComparisonOperator,
        value: Operand,
    ) -> Self {
        Self::Comparison(Comparison {
            parameter: parameter.into(),
            operator,
            value,
        })
    }

    pub fn and(children: Vec<Expression>) -> Self {
        Self::Logical(Logical {
            kind: LogicalKind::And,
            children,
        })
    }

    pub fn or(children: Vec<Expression>) -> Self {
        Self::Logical(Logical {
            kind: LogicalKind::Or,
            children,
        })
    }

    pub fn not(child: Expression) -> Self {
        Self::Logical(Logical {
            kind: LogicalKind::Not,
            children: vec![child],
        })
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Self::Scalar(ScalarValue::from(n))
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Self::Scalar(ScalarValue::from(b))
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Self::Scalar(ScalarValue::from(s))
    }
}
