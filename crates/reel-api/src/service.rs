//! Runs a built [`QueryPlan`] against the store and shapes the result.
//!
//! Store calls are synchronous, so they run on the blocking pool.

use std::sync::Arc;

use bson::Document;
use reel_query::QueryPlan;
use reel_store::Store;
use tracing::debug;

use crate::envelope::{MovieResponse, ResponseMode};
use crate::error::ApiError;

/// One page of matches plus the total number of matches.
pub async fn execute(
    store: Arc<dyn Store>,
    plan: &QueryPlan,
) -> Result<(Vec<Document>, u64), ApiError> {
    let query = plan.to_query();
    let filter = plan.filter_for_store();
    let result = tokio::task::spawn_blocking(move || {
        let docs = store.find(&query)?;
        let total = store.count(filter.as_ref())?;
        Ok::<_, ApiError>((docs, total))
    })
    .await??;
    Ok(result)
}

/// First match only; no count.
pub async fn find_one(store: Arc<dyn Store>, plan: &QueryPlan) -> Result<Option<Document>, ApiError> {
    let query = plan.to_single_query();
    let docs = tokio::task::spawn_blocking(move || store.find(&query)).await??;
    Ok(docs.into_iter().next())
}

/// One page of matches; no count.
pub async fn find_page(store: Arc<dyn Store>, plan: &QueryPlan) -> Result<Vec<Document>, ApiError> {
    let query = plan.to_query();
    Ok(tokio::task::spawn_blocking(move || store.find(&query)).await??)
}

/// Execute `plan` and shape the result as `mode` declares. A filter that
/// provably matches nothing never reaches the store.
pub async fn respond(
    store: Arc<dyn Store>,
    mode: ResponseMode,
    plan: QueryPlan,
) -> Result<MovieResponse, ApiError> {
    if plan.is_empty_match() {
        debug!(rejected = plan.rejected.len(), "filter matches nothing; skipping store");
        return Ok(MovieResponse::empty(mode, plan.page));
    }

    Ok(match mode {
        ResponseMode::Paginated => {
            let (docs, total) = execute(store, &plan).await?;
            MovieResponse::paginated(docs, total, plan.page)
        }
        ResponseMode::Single => MovieResponse::single(find_one(store, &plan).await?),
        ResponseMode::Bare => MovieResponse::bare(find_page(store, &plan).await?),
    })
}
