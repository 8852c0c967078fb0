//! Authoring-time validation of rule expressions.
//!
//! Runs without any parameter values. [`parse_expression`] is the entry point
//! for expressions arriving as JSON: it checks the raw structure (reporting
//! the path of the offending node), deserializes, then applies the typed
//! checks in [`Expression::validate`].

use serde_json::Value;

use super::model::{ComparisonOperator, Expression, LogicalKind, Operand};
use crate::error::CoreError;
use crate::parameter::{normalize_parameter_name, Parameter, ParameterDataType, ScalarValue};

/// Parse and fully validate an expression from its JSON form.
pub fn parse_expression(raw: &Value) -> Result<Expression, CoreError> {
    validate_structure(raw)?;
    let expr: Expression = serde_json::from_value(raw.clone())
        .map_err(|e| CoreError::Validation(format!("Malformed expression: {e}")))?;
    expr.validate()?;
    Ok(expr)
}

/// Parse and validate an expression from its textual serialization.
pub fn parse_expression_str(text: &str) -> Result<Expression, CoreError> {
    let raw: Value = serde_json::from_str(text)
        .map_err(|e| CoreError::Validation(format!("Expression is not valid JSON: {e}")))?;
    parse_expression(&raw)
}

/// Structural well-formedness of a raw expression tree.
pub fn validate_structure(raw: &Value) -> Result<(), CoreError> {
    check_node(raw, "expression")
}

fn invalid(path: &str, msg: impl AsRef<str>) -> CoreError {
    CoreError::Validation(format!("{path}: {}", msg.as_ref()))
}

fn check_node(node: &Value, path: &str) -> Result<(), CoreError> {
    let obj = node
        .as_object()
        .ok_or_else(|| invalid(path, "must be an object"))?;
    let tag = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(path, "missing 'type'"))?;

    match tag {
        "comparison" => {
            match obj.get("parameter").and_then(Value::as_str) {
                Some(p) if !p.trim().is_empty() => {}
                _ => return Err(invalid(path, "comparison requires a non-empty 'parameter'")),
            }
            let op = obj
                .get("operator")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(path, "comparison requires an 'operator'"))?;
            if !ComparisonOperator::ALL.contains(&op) {
                return Err(invalid(
                    &format!("{path}.operator"),
                    format!(
                        "unknown operator '{op}'. Must be one of: {}",
                        ComparisonOperator::ALL.join(", ")
                    ),
                ));
            }
            match obj.get("value") {
                None | Some(Value::Null) => {
                    Err(invalid(path, "comparison requires a 'value'"))
                }
                Some(_) => Ok(()),
            }
        }
        "logical" => {
            let kind = obj
                .get("kind")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(path, "logical node requires a 'kind'"))?;
            if !LogicalKind::ALL.contains(&kind) {
                return Err(invalid(
                    &format!("{path}.kind"),
                    format!(
                        "unknown kind '{kind}'. Must be one of: {}",
                        LogicalKind::ALL.join(", ")
                    ),
                ));
            }
            let children = obj
                .get("children")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid(path, "logical node requires a 'children' array"))?;
            for (i, child) in children.iter().enumerate() {
                check_node(child, &format!("{path}.children[{i}]"))?;
            }
            Ok(())
        }
        other => Err(invalid(
            &format!("{path}.type"),
            format!("unknown type '{other}'. Must be 'comparison' or 'logical'"),
        )),
    }
}

impl Expression {
    /// Typed checks on an already-deserialized tree.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.validate_at("expression")
    }

    fn validate_at(&self, path: &str) -> Result<(), CoreError> {
        match self {
            Expression::Comparison(cmp) => {
                if cmp.parameter.trim().is_empty() {
                    return Err(invalid(path, "comparison requires a non-empty 'parameter'"));
                }
                let op = cmp.operator;
                match (&cmp.value, op.is_membership()) {
                    (Operand::List(_), false) => {
                        return Err(invalid(path, format!("operator '{op}' takes a single value")))
                    }
                    (Operand::Scalar(_), true) => {
                        let msg = format!("operator '{op}' requires an array value");
                        return Err(invalid(path, msg));
                    }
                    _ => {}
                }
                let numeric = matches!(cmp.value, Operand::Scalar(ScalarValue::Number(_)));
                if op.is_numeric() && !numeric {
                    return Err(invalid(path, format!("operator '{op}' requires a numeric value")));
                }
                if op == ComparisonOperator::Contains
                    && !matches!(cmp.value, Operand::Scalar(ScalarValue::Text(_)))
                {
                    return Err(invalid(path, "operator 'contains' requires a string value"));
                }
                Ok(())
            }
            Expression::Logical(logical) => {
                if logical.kind == LogicalKind::Not && logical.children.len() != 1 {
                    return Err(invalid(
                        path,
                        format!(
                            "NOT requires exactly one child, got {}",
                            logical.children.len()
                        ),
                    ));
                }
                for (i, child) in logical.children.iter().enumerate() {
                    child.validate_at(&format!("{path}.children[{i}]"))?;
                }
                Ok(())
            }
        }
    }

    /// Check that every referenced parameter exists in `catalogue` and that each
    /// comparison fits the parameter's declared data type.
    pub fn validate_against_catalogue(&self, catalogue: &[Parameter]) -> Result<(), CoreError> {
        match self {
            Expression::Comparison(cmp) => {
                let key = normalize_parameter_name(&cmp.parameter);
                let param = catalogue
                    .iter()
                    .find(|p| normalize_parameter_name(&p.name) == key)
                    .ok_or_else(|| {
                        CoreError::Validation(format!("Unknown parameter '{}'", cmp.parameter))
                    })?;
                let op = cmp.operator;
                if op.is_numeric() && param.data_type != ParameterDataType::Number {
                    return Err(CoreError::Validation(format!(
                        "Operator '{op}' cannot be applied to {} parameter '{}'",
                        param.data_type.as_str(),
                        param.name
                    )));
                }
                if op == ComparisonOperator::Contains
                    && param.data_type != ParameterDataType::String
                {
                    return Err(CoreError::Validation(format!(
                        "Operator 'contains' cannot be applied to {} parameter '{}'",
                        param.data_type.as_str(),
                        param.name
                    )));
                }
                let operand_fits = match &cmp.value {
                    Operand::Scalar(v) => param.data_type.accepts(v),
                    Operand::List(items) => items.iter().all(|v| param.data_type.accepts(v)),
                };
                if !operand_fits {
                    return Err(CoreError::Validation(format!(
                        "Value {} does not match {} parameter '{}'",
                        cmp.value,
                        param.data_type.as_str(),
                        param.name
                    )));
                }
                Ok(())
            }
            Expression::Logical(logical) => logical
                .children
                .iter()
                .try_for_each(|child| child.validate_against_catalogue(catalogue)),
        }
    }
}
