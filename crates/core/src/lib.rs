//! ESG portfolio screening engine.
//!
//! Pure domain logic: the rule expression grammar and evaluator, parameter
//! requirement extraction, time-versioned value resolution, the pre-screening
//! completeness check and the screening orchestrator. Storage is reached only
//! through the traits in [`store`]; this crate has no database dependency.

pub mod criteria;
pub mod error;
pub mod expression;
pub mod memory;
pub mod observe;
pub mod parameter;
pub mod prescreen;
pub mod requirements;
pub mod resolver;
pub mod screening;
pub mod service;
pub mod store;
pub mod subject;
pub mod types;
