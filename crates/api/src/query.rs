//! Query parameter types for list endpoints.

use esgscreen_core::screening::ResultFilter;
use esgscreen_core::types::DbId;
use serde::Deserialize;

/// `?criteria_set_id=&owner_id=&limit=&offset=` for screening result listing.
///
/// Paging values are clamped by [`ResultFilter::new`].
#[derive(Debug, Default, Deserialize)]
pub struct ResultListParams {
    pub criteria_set_id: Option<DbId>,
    pub owner_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ResultListParams> for ResultFilter {
    fn from(params: ResultListParams) -> Self {
        ResultFilter::new(
            params.criteria_set_id,
            params.owner_id,
            params.limit,
            params.offset,
        )
    }
}
