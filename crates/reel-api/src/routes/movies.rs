use axum::Router;
use axum::extract::{RawQuery, State};
use axum::routing::get;
use reel_query::RawParams;

use crate::endpoints::{Endpoint, MOVIE_ENDPOINTS};
use crate::envelope::MovieResponse;
use crate::error::ApiError;
use crate::service;
use crate::state::AppState;

/// One GET route per declared endpoint, all served by [`handle`].
pub fn router() -> Router<AppState> {
    MOVIE_ENDPOINTS.iter().fold(Router::new(), |router, endpoint| {
        router.route(
            endpoint.path,
            get(move |State(state): State<AppState>, RawQuery(query): RawQuery| {
                handle(endpoint, state, query)
            }),
        )
    })
}

#[tracing::instrument(skip_all, fields(endpoint = endpoint.path))]
async fn handle(
    endpoint: &'static Endpoint,
    state: AppState,
    query: Option<String>,
) -> Result<MovieResponse, ApiError> {
    let params = parse_params(query.as_deref());
    let plan = state.builder.build(&endpoint.template, &params)?;
    service::respond(state.store, endpoint.mode, plan).await
}

/// Decode a raw query string. Repeated keys collect into a list.
fn parse_params(query: Option<&str>) -> RawParams {
    match query {
        Some(q) => RawParams::from_pairs(url::form_urlencoded::parse(q.as_bytes())),
        None => RawParams::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_collect() {
        let params = parse_params(Some("ratings=7.5&ratings=8&title=The+Matrix"));
        assert_eq!(
            params.get("ratings").map(|v| v.values()),
            Some(vec!["7.5", "8"])
        );
        assert_eq!(params.first("title"), Some("The Matrix"));
    }

    #[test]
    fn no_query_string() {
        assert!(!parse_params(None).has("title"));
    }
}
