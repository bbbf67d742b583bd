use std::sync::Arc;

use reel_query::QueryBuilder;
use reel_store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub builder: QueryBuilder,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, builder: QueryBuilder) -> Self {
        Self { store, builder }
    }
}
