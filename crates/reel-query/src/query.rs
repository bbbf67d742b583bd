use serde::{Deserialize, Serialize};

use crate::filter::FilterGroup;
use crate::sort::Sort;

/// Everything a storage `find` needs: filter, then sort, skip, take and
/// finally the projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub filter: Option<FilterGroup>,
    pub sort: Vec<Sort>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    /// Fields to keep. `_id` is dropped unless listed.
    pub columns: Option<Vec<String>>,
}
