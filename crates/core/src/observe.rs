//! Observability hook for the screening engine.
//!
//! The engine reports what it does through [`ScreeningObserver`] instead of
//! logging, so callers decide where events go. [`TracingObserver`] forwards
//! them to `tracing`.

use crate::screening::ScreeningSummary;
use crate::types::DbId;

pub trait ScreeningObserver: Send + Sync {
    /// Values were resolved for a company. `fallback` is set when none were
    /// dated on or before the as-of date and the undated read was used.
    fn values_resolved(&self, _company_id: DbId, _value_count: usize, _fallback: bool) {}

    /// A parameter required by the criteria set has no value for a company.
    fn parameter_unavailable(&self, _company_id: DbId, _parameter: &str) {}

    /// All rules were evaluated for a subject.
    fn subject_screened(&self, _company_id: DbId, _passed: bool, _failed_rules: usize) {}

    /// A screening finished and was persisted.
    fn screening_completed(&self, _result_id: DbId, _summary: &ScreeningSummary) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScreeningObserver for NoopObserver {}

/// Emits each event as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScreeningObserver for TracingObserver {
    fn values_resolved(&self, company_id: DbId, value_count: usize, fallback: bool) {
        if fallback {
            tracing::debug!(company_id, value_count, "No dated values; used most recent values");
        } else {
            tracing::trace!(company_id, value_count, "Resolved parameter values");
        }
    }

    fn parameter_unavailable(&self, company_id: DbId, parameter: &str) {
        tracing::debug!(company_id, parameter, "Required parameter unavailable");
    }

    fn subject_screened(&self, company_id: DbId, passed: bool, failed_rules: usize) {
        tracing::trace!(company_id, passed, failed_rules, "Subject screened");
    }

    fn screening_completed(&self, result_id: DbId, summary: &ScreeningSummary) {
        tracing::info!(
            result_id,
            total = summary.total_subjects,
            passed = summary.passed,
            failed = summary.failed,
            pass_rate = summary.pass_rate,
            "Screening completed"
        );
    }
}
