//! ESG parameters and their dated values.
//!
//! Parameter names are case-insensitive; every lookup goes through
//! [`normalize_parameter_name`] so `Carbon_Emissions` and `carbon_emissions`
//! address the same series.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::types::{DbId, EffectiveDate};

/// Data type declared for a parameter. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterDataType {
    Number,
    Boolean,
    String,
}

impl ParameterDataType {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "string" => Ok(Self::String),
            _ => Err(format!(
                "Invalid parameter data type '{s}'. Must be one of: number, boolean, string"
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }

    /// Whether `value` is a legal value for this data type.
    pub fn accepts(&self, value: &ScalarValue) -> bool {
        matches!(
            (self, value),
            (Self::Number, ScalarValue::Number(_))
                | (Self::Boolean, ScalarValue::Boolean(_))
                | (Self::String, ScalarValue::Text(_))
        )
    }
}

/// Whether a parameter is shared by every tenant or owned by one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerScope {
    Global,
    Client,
}

/// A parameter definition from the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub id: DbId,
    pub name: String,
    pub data_type: ParameterDataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub owner_scope: OwnerScope,
}

/// A typed scalar as it crosses the wire: number, boolean or string.
///
/// Numbers keep their JSON form, so integers survive a round trip unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Boolean(bool),
    Number(Number),
    Text(String),
}

impl ScalarValue {
    /// `None` for NaN and infinities, which JSON cannot carry.
    pub fn float(n: f64) -> Option<Self> {
        Number::from_f64(n).map(Self::Number)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Numbers compare by value: `500` equals `500.0`.
impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => numbers_equal(a, b),
            _ => false,
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    (a.is_f64() || b.is_f64()) && a.as_f64() == b.as_f64()
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

/// One dated value of a parameter for a company, as read from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterValueRecord {
    pub company_id: DbId,
    pub parameter_name: String,
    pub value: ScalarValue,
    pub effective_date: EffectiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Canonical form of a parameter name used for every lookup.
pub fn normalize_parameter_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Effective values for one company, keyed by normalized parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterValues(BTreeMap<String, ScalarValue>);

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value unless one is already present for the parameter.
    ///
    /// Returns `true` when the value was stored (first-wins).
    pub fn insert_if_absent(&mut self, name: &str, value: ScalarValue) -> bool {
        use std::collections::btree_map::Entry;
        match self.0.entry(normalize_parameter_name(name)) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.0.get(&normalize_parameter_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&normalize_parameter_name(name))
    }

    /// Normalized names of every parameter with a value.
    pub fn names(&self) -> BTreeSet<String> {
        self.0.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, ScalarValue)> for ParameterValues {
    fn from_iter<I: IntoIterator<Item = (S, ScalarValue)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.insert_if_absent(name.as_ref(), value);
        }
        values
    }
}
