use axum::Json;
use axum::response::{IntoResponse, Response};
use bson::{Bson, Document};
use reel_query::PageSpec;
use serde::Serialize;

/// Response shape an endpoint declares up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// `{ success, pagination, data: [..] }` with a total count.
    Paginated,
    /// `{ success, data: doc | null }`, first match only.
    Single,
    /// A plain JSON array of documents.
    Bare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub data: T,
}

/// A rendered movie result, one variant per [`ResponseMode`].
#[derive(Debug)]
pub enum MovieResponse {
    Paginated(Envelope<Vec<serde_json::Value>>),
    Single(Envelope<Option<serde_json::Value>>),
    Bare(Vec<serde_json::Value>),
}

impl MovieResponse {
    pub fn paginated(docs: Vec<Document>, total: u64, page: PageSpec) -> Self {
        MovieResponse::Paginated(Envelope {
            success: true,
            pagination: Some(Pagination {
                total,
                page: page.page,
                limit: page.limit,
            }),
            data: docs.into_iter().map(to_json).collect(),
        })
    }

    pub fn single(doc: Option<Document>) -> Self {
        MovieResponse::Single(Envelope {
            success: true,
            pagination: None,
            data: doc.map(to_json),
        })
    }

    pub fn bare(docs: Vec<Document>) -> Self {
        MovieResponse::Bare(docs.into_iter().map(to_json).collect())
    }

    /// The response for a query that matches nothing.
    pub fn empty(mode: ResponseMode, page: PageSpec) -> Self {
        match mode {
            ResponseMode::Paginated => Self::paginated(Vec::new(), 0, page),
            ResponseMode::Single => Self::single(None),
            ResponseMode::Bare => Self::bare(Vec::new()),
        }
    }
}

impl IntoResponse for MovieResponse {
    fn into_response(self) -> Response {
        match self {
            MovieResponse::Paginated(body) => Json(body).into_response(),
            MovieResponse::Single(body) => Json(body).into_response(),
            MovieResponse::Bare(body) => Json(body).into_response(),
        }
    }
}

/// Relaxed extended JSON: plain numbers and strings, `{"$date": ..}` for
/// datetimes, `{"$oid": ..}` for object ids.
pub fn to_json(doc: Document) -> serde_json::Value {
    Bson::Document(doc).into_relaxed_extjson()
}
