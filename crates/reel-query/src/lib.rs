mod builder;
mod criterion;
mod error;
mod filter;
mod page;
mod params;
mod query;
pub mod render;
mod sort;

pub use builder::{
    BindingOp, ParamBinding, QueryBuilder, QueryPlan, QueryTemplate, Requirement, SortBinding,
    ValueKind, build_criterion, combine, parse_page, resolve_sort,
};
pub use criterion::Criterion;
pub use error::QueryError;
pub use filter::{FilterGroup, FilterNode, LogicalOp};
pub use page::PageSpec;
pub use params::{RawParams, RawValue};
pub use query::Query;
pub use sort::{Sort, SortDirection};
