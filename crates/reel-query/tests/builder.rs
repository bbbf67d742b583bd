use bson::doc;
use reel_query::{
    BindingOp, LogicalOp, ParamBinding, QueryBuilder, QueryTemplate, RawParams, Requirement,
    render,
};

const BINDINGS: &[ParamBinding] = &[
    ParamBinding::text("genre", "genres", BindingOp::Contains),
    ParamBinding::number("minYear", "year", BindingOp::Min),
    ParamBinding::number("maxYear", "year", BindingOp::Max),
    ParamBinding::text("q", "title", BindingOp::Keyword),
];

fn template(logical: LogicalOp) -> QueryTemplate {
    QueryTemplate {
        required: Requirement::AnyOf(&["genre", "q"]),
        bindings: BINDINGS,
        ..QueryTemplate::new(logical)
    }
}

fn params(query: &str) -> RawParams {
    serde_json::from_str(query).unwrap()
}

#[test]
fn renders_and_filter() {
    let plan = QueryBuilder::default()
        .build(
            &template(LogicalOp::And),
            &params(r#"{"genre": ["Crime", "Drama"], "minYear": "1990", "maxYear": "1999"}"#),
        )
        .unwrap();

    assert_eq!(
        render::to_document(&plan.filter),
        doc! {
            "$and": [
                { "genres": { "$in": ["Crime", "Drama"] } },
                { "year": { "$gte": 1990_i64, "$lte": 1999_i64 } },
            ]
        }
    );
}

#[test]
fn renders_or_filter() {
    let plan = QueryBuilder::default()
        .build(
            &template(LogicalOp::Or),
            &params(r#"{"genre": "Drama", "q": "heat"}"#),
        )
        .unwrap();

    assert_eq!(
        render::to_document(&plan.filter),
        doc! {
            "$or": [
                { "genres": { "$in": ["Drama"] } },
                { "title": { "$regex": "heat", "$options": "i" } },
            ]
        }
    );
}

#[test]
fn missing_requirement_is_an_error() {
    let err = QueryBuilder::default()
        .build(&template(LogicalOp::And), &params(r#"{"minYear": "1990"}"#))
        .unwrap_err();
    assert_eq!(err.to_string(), "genre or q required");
}
