use std::sync::atomic::{AtomicUsize, Ordering};

use bson::Document;
use reel_query::{FilterGroup, Query};

use crate::error::StoreError;
use crate::store::Store;

/// Wrapper that counts `find` and `count` calls and forwards to a real store.
#[derive(Debug)]
pub struct CountingStore<S> {
    inner: S,
    finds: AtomicUsize,
    counts: AtomicUsize,
}

impl<S: Store> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            finds: AtomicUsize::new(0),
            counts: AtomicUsize::new(0),
        }
    }

    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn counts(&self) -> usize {
        self.counts.load(Ordering::SeqCst)
    }

    /// Total storage calls of any kind.
    pub fn calls(&self) -> usize {
        self.finds() + self.counts()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Store> Store for CountingStore<S> {
    fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find(query)
    }

    fn count(&self, filter: Option<&FilterGroup>) -> Result<u64, StoreError> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        self.inner.count(filter)
    }
}
