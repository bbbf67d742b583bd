use std::sync::Arc;

use bson::Document;
use reel_query::{FilterGroup, Query};

use crate::error::StoreError;

/// Read-only access to one document collection.
///
/// Implementations may block; callers on an async runtime should run them on
/// a blocking thread.
pub trait Store: Send + Sync {
    /// Filter, then sort, skip, take and project.
    fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Number of documents matching `filter`. `None` counts everything.
    fn count(&self, filter: Option<&FilterGroup>) -> Result<u64, StoreError>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        (**self).find(query)
    }

    fn count(&self, filter: Option<&FilterGroup>) -> Result<u64, StoreError> {
        (**self).count(filter)
    }
}
