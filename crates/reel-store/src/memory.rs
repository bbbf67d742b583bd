use std::sync::Arc;

use arc_swap::ArcSwap;
use bson::Document;
use reel_query::{FilterGroup, Query};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::exec;
use crate::loader::Loader;
use crate::store::Store;

/// An in-memory collection.
///
/// Readers work on a snapshot; [`MemoryStore::replace`] swaps in a new
/// document set without blocking in-flight queries.
pub struct MemoryStore {
    docs: ArcSwap<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    pub fn with_documents(docs: Vec<Document>) -> Self {
        Self {
            docs: ArcSwap::from_pointee(docs),
        }
    }

    /// Drain `loader` into a new store.
    pub fn from_loader<L: Loader + ?Sized>(loader: &L) -> Result<Self, StoreError> {
        let docs = loader.load()?.collect::<Result<Vec<_>, _>>()?;
        info!(documents = docs.len(), "loaded collection");
        Ok(Self::with_documents(docs))
    }

    pub fn replace(&self, docs: Vec<Document>) {
        self.docs.store(Arc::new(docs));
    }

    pub fn len(&self) -> usize {
        self.docs.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let snapshot = self.docs.load();
        let records = exec::find(&snapshot, query)?;
        debug!(returned = records.len(), "find");
        Ok(records)
    }

    fn count(&self, filter: Option<&FilterGroup>) -> Result<u64, StoreError> {
        let snapshot = self.docs.load();
        exec::count(&snapshot, filter)
    }
}
