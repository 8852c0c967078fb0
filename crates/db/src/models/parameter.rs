//! Parameter catalogue and time-versioned value rows.

use esgscreen_core::error::CoreError;
use esgscreen_core::parameter::{
    OwnerScope, Parameter, ParameterDataType, ParameterValueRecord, ScalarValue,
};
use esgscreen_core::types::{DbId, EffectiveDate, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `parameters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParameterRow {
    pub id: DbId,
    pub name: String,
    pub data_type: String,
    pub unit: Option<String>,
    pub owner_scope: String,
    pub client_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ParameterRow> for Parameter {
    type Error = CoreError;

    fn try_from(row: ParameterRow) -> Result<Self, Self::Error> {
        let data_type =
            ParameterDataType::from_str_value(&row.data_type).map_err(CoreError::Internal)?;
        let owner_scope = match row.owner_scope.as_str() {
            "global" => OwnerScope::Global,
            "client" => OwnerScope::Client,
            other => {
                return Err(CoreError::Internal(format!(
                    "Unknown owner scope '{other}' on parameter {}",
                    row.id
                )))
            }
        };
        Ok(Parameter {
            id: row.id,
            name: row.name,
            data_type,
            unit: row.unit,
            owner_scope,
        })
    }
}

/// A `parameter_values` row joined with its parameter name.
#[derive(Debug, Clone, FromRow)]
pub struct ParameterValueRow {
    pub company_id: DbId,
    pub parameter_name: String,
    pub value: serde_json::Value,
    pub effective_date: EffectiveDate,
    pub source: Option<String>,
}

impl TryFrom<ParameterValueRow> for ParameterValueRecord {
    type Error = CoreError;

    fn try_from(row: ParameterValueRow) -> Result<Self, Self::Error> {
        let value: ScalarValue = serde_json::from_value(row.value).map_err(|e| {
            CoreError::Internal(format!(
                "Stored value for '{}' on company {} is not a scalar: {e}",
                row.parameter_name, row.company_id
            ))
        })?;
        Ok(ParameterValueRecord {
            company_id: row.company_id,
            parameter_name: row.parameter_name,
            value,
            effective_date: row.effective_date,
            source: row.source,
        })
    }
}
