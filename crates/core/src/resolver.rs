//! Parameter value resolution.
//!
//! Picks one effective value per (company, parameter) from the dated
//! time series: the most recent value on or before the as-of date. A company
//! with no value at all on or before that date falls back to its most recent
//! values regardless of date.

use std::collections::{BTreeMap, HashSet};

use crate::error::CoreError;
use crate::observe::ScreeningObserver;
use crate::parameter::{ParameterValueRecord, ParameterValues};
use crate::store::ParameterValueStore;
use crate::types::{DbId, EffectiveDate};

/// Effective values for each requested company. Every requested company has
/// an entry, possibly empty.
pub type ResolvedValues = BTreeMap<DbId, ParameterValues>;

/// Fold value rows into per-company maps, newest first, first value wins.
///
/// Rows are sorted here by `effective_date` descending (stable), so callers
/// may pass them in any order.
pub fn latest_values(rows: &[ParameterValueRecord]) -> BTreeMap<DbId, ParameterValues> {
    let mut ordered: Vec<&ParameterValueRecord> = rows.iter().collect();
    ordered.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));

    let mut by_company: BTreeMap<DbId, ParameterValues> = BTreeMap::new();
    for row in ordered {
        by_company
            .entry(row.company_id)
            .or_default()
            .insert_if_absent(&row.parameter_name, row.value.clone());
    }
    by_company
}

/// Resolve effective values for `company_ids` as of `as_of`.
///
/// Issues at most two store reads: one filtered to `effective_date <= as_of`,
/// and one unfiltered read for the companies the first read found nothing for.
pub async fn resolve_parameter_values<S>(
    store: &S,
    company_ids: &[DbId],
    as_of: EffectiveDate,
    observer: &dyn ScreeningObserver,
) -> Result<ResolvedValues, CoreError>
where
    S: ParameterValueStore + ?Sized,
{
    let mut unique: Vec<DbId> = Vec::with_capacity(company_ids.len());
    let mut seen = HashSet::new();
    for id in company_ids {
        if seen.insert(*id) {
            unique.push(*id);
        }
    }
    if unique.is_empty() {
        return Ok(ResolvedValues::new());
    }

    let dated = store.get_values(&unique, Some(as_of)).await?;
    let mut resolved = latest_values(&dated);

    let without_values: Vec<DbId> = unique
        .iter()
        .copied()
        .filter(|id| !resolved.contains_key(id))
        .collect();

    let mut fallback_ids = HashSet::new();
    if !without_values.is_empty() {
        let pending: HashSet<DbId> = without_values.iter().copied().collect();
        let undated = store.get_values(&without_values, None).await?;
        for (company_id, values) in latest_values(&undated) {
            if pending.contains(&company_id) {
                fallback_ids.insert(company_id);
                resolved.insert(company_id, values);
            }
        }
    }

    for id in &unique {
        let values = resolved.entry(*id).or_default();
        observer.values_resolved(*id, values.len(), fallback_ids.contains(id));
    }
    resolved.retain(|id, _| seen.contains(id));

    Ok(resolved)
}
