//! Declarative movie endpoints.
//!
//! Each [`Endpoint`] names its path, the parameters it requires, how its
//! parameters map onto criteria, and the response shape. A single handler
//! serves all of them.

use reel_query::{
    BindingOp, LogicalOp, ParamBinding, QueryTemplate, Requirement, SortBinding,
};

use crate::envelope::ResponseMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Path below the `/movies` prefix.
    pub path: &'static str,
    pub template: QueryTemplate,
    pub mode: ResponseMode,
}

const GENRE: ParamBinding = ParamBinding::text("genre", "genres", BindingOp::Contains);

const TITLE_BINDINGS: &[ParamBinding] = &[ParamBinding::text("title", "title", BindingOp::Equals)];

const GENRE_BINDINGS: &[ParamBinding] = &[GENRE];

const GENRE_OR_YEAR_BINDINGS: &[ParamBinding] = &[
    GENRE,
    ParamBinding::number("year", "year", BindingOp::Equals),
];

const SEARCH_BINDINGS: &[ParamBinding] =
    &[ParamBinding::text("search", "title", BindingOp::Equals)];

const FILTER_BINDINGS: &[ParamBinding] = &[
    ParamBinding::number("year", "year", BindingOp::Min),
    GENRE,
];

const FIND_BINDINGS: &[ParamBinding] = &[
    GENRE,
    ParamBinding::number("year", "year", BindingOp::Equals),
    ParamBinding::number("minYear", "year", BindingOp::Min),
    ParamBinding::number("maxYear", "year", BindingOp::Max),
    ParamBinding::number("yearAfter", "year", BindingOp::Above),
    ParamBinding::number("yearBefore", "year", BindingOp::Below),
    ParamBinding::number("rating", "imdb.rating", BindingOp::Contains),
    ParamBinding::number("ratings", "imdb.rating", BindingOp::Contains),
    ParamBinding::number("minRating", "imdb.rating", BindingOp::Min),
    ParamBinding::number("maxRating", "imdb.rating", BindingOp::Max),
    ParamBinding::number("minRuntime", "runtime", BindingOp::Min),
    ParamBinding::number("maxRuntime", "runtime", BindingOp::Max),
    ParamBinding::date("releasedFrom", "released", BindingOp::Min),
    ParamBinding::date("releasedTo", "released", BindingOp::Max),
    ParamBinding::number("minVotes", "imdb.votes", BindingOp::Min),
    ParamBinding::text("cast", "cast", BindingOp::Contains),
    ParamBinding::text("director", "directors", BindingOp::Contains),
    ParamBinding::text("language", "languages", BindingOp::Contains),
    ParamBinding::text("country", "countries", BindingOp::Contains),
    ParamBinding::text("q", "title", BindingOp::Keyword),
    ParamBinding::number("minWins", "awards.wins", BindingOp::Min),
    ParamBinding::number("maxWins", "awards.wins", BindingOp::Max),
];

const FIND_SORT: SortBinding = SortBinding {
    direction_param: "sort",
    field_param: Some("sortBy"),
    default_field: "year",
    allowed: &["year", "title", "runtime", "released", "imdb.rating"],
};

pub static MOVIE_ENDPOINTS: &[Endpoint] = &[
    // Exact title lookup.
    Endpoint {
        path: "/title",
        template: QueryTemplate {
            required: Requirement::All(&["title"]),
            bindings: TITLE_BINDINGS,
            ..QueryTemplate::new(LogicalOp::And)
        },
        mode: ResponseMode::Single,
    },
    Endpoint {
        path: "/genre",
        template: QueryTemplate {
            required: Requirement::All(&["genre"]),
            bindings: GENRE_BINDINGS,
            ..QueryTemplate::new(LogicalOp::And)
        },
        mode: ResponseMode::Paginated,
    },
    Endpoint {
        path: "/or",
        template: QueryTemplate {
            required: Requirement::AnyOf(&["genre", "year"]),
            bindings: GENRE_OR_YEAR_BINDINGS,
            ..QueryTemplate::new(LogicalOp::Or)
        },
        mode: ResponseMode::Paginated,
    },
    Endpoint {
        path: "/search",
        template: QueryTemplate {
            required: Requirement::All(&["search"]),
            bindings: SEARCH_BINDINGS,
            ..QueryTemplate::new(LogicalOp::And)
        },
        mode: ResponseMode::Single,
    },
    Endpoint {
        path: "/list",
        template: QueryTemplate::new(LogicalOp::And),
        mode: ResponseMode::Bare,
    },
    // Released in or after `year`, optionally within a genre; trimmed docs.
    Endpoint {
        path: "/filter",
        template: QueryTemplate {
            bindings: FILTER_BINDINGS,
            columns: &["year", "genres"],
            ..QueryTemplate::new(LogicalOp::And)
        },
        mode: ResponseMode::Bare,
    },
    Endpoint {
        path: "/find",
        template: QueryTemplate {
            bindings: FIND_BINDINGS,
            sort: Some(FIND_SORT),
            ..QueryTemplate::new(LogicalOp::And)
        },
        mode: ResponseMode::Paginated,
    },
];
