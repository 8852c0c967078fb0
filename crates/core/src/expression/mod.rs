//! Rule expression engine.
//!
//! Provides the expression tree, a pure-logic evaluator and authoring-time
//! validation. None of it touches the database.

pub mod evaluator;
pub mod model;
pub mod validate;

pub use evaluator::{ComparisonDisplay, Truth};
pub use model::{Comparison, ComparisonOperator, Expression, Logical, LogicalKind, Operand};
pub use validate::{parse_expression, parse_expression_str, validate_structure};
