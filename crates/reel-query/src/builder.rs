use bson::Bson;
use tracing::{debug, warn};

use crate::criterion::Criterion;
use crate::error::QueryError;
use crate::filter::{FilterGroup, LogicalOp};
use crate::page::PageSpec;
use crate::params::{RawParams, RawValue};
use crate::query::Query;
use crate::render;
use crate::sort::{Sort, SortDirection};

/// How a raw string is coerced before it reaches a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
    Date,
}

/// Which criterion a parameter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOp {
    Equals,
    /// Membership in the supplied set; accepts one or many values.
    Contains,
    /// Lower bound of an inclusive range. Merged with a `Max` on the same field.
    Min,
    /// Upper bound of an inclusive range. Merged with a `Min` on the same field.
    Max,
    Above,
    Below,
    /// Case-insensitive substring match; the input is escaped, not a pattern.
    Keyword,
}

/// Maps one request parameter onto one document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamBinding {
    pub param: &'static str,
    pub field: &'static str,
    pub kind: ValueKind,
    pub op: BindingOp,
}

impl ParamBinding {
    pub const fn new(
        param: &'static str,
        field: &'static str,
        kind: ValueKind,
        op: BindingOp,
    ) -> Self {
        Self {
            param,
            field,
            kind,
            op,
        }
    }

    pub const fn text(param: &'static str, field: &'static str, op: BindingOp) -> Self {
        Self::new(param, field, ValueKind::Text, op)
    }

    pub const fn number(param: &'static str, field: &'static str, op: BindingOp) -> Self {
        Self::new(param, field, ValueKind::Number, op)
    }

    pub const fn date(param: &'static str, field: &'static str, op: BindingOp) -> Self {
        Self::new(param, field, ValueKind::Date, op)
    }
}

/// Parameters that must be present before any query runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    None,
    All(&'static [&'static str]),
    AnyOf(&'static [&'static str]),
}

impl Requirement {
    pub fn check(&self, params: &RawParams) -> Result<(), QueryError> {
        match self {
            Requirement::None => Ok(()),
            Requirement::All(names) => {
                let missing: Vec<&str> = names
                    .iter()
                    .copied()
                    .filter(|n| !params.has(n))
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(QueryError::missing(&missing))
                }
            }
            Requirement::AnyOf(names) => {
                if names.iter().any(|n| params.has(n)) {
                    Ok(())
                } else {
                    Err(QueryError::missing_any(names))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBinding {
    /// Parameter carrying `asc` / `desc`.
    pub direction_param: &'static str,
    /// Optional parameter naming the sort field.
    pub field_param: Option<&'static str>,
    pub default_field: &'static str,
    /// Fields `field_param` may select. Anything else falls back to
    /// `default_field`.
    pub allowed: &'static [&'static str],
}

/// The declarative half of an endpoint: what it requires, how its
/// parameters map onto criteria, and how they combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub required: Requirement,
    pub bindings: &'static [ParamBinding],
    pub logical: LogicalOp,
    pub sort: Option<SortBinding>,
    pub columns: &'static [&'static str],
}

impl QueryTemplate {
    pub const fn new(logical: LogicalOp) -> Self {
        Self {
            required: Requirement::None,
            bindings: &[],
            logical,
            sort: None,
            columns: &[],
        }
    }
}

/// A validated request, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub filter: FilterGroup,
    pub sort: Option<Sort>,
    pub page: PageSpec,
    pub columns: Option<Vec<String>>,
    /// Inputs that failed coercion. Their criteria are still in `filter`,
    /// carrying values that match nothing.
    pub rejected: Vec<QueryError>,
}

impl QueryPlan {
    /// The filter can be shown to match nothing without asking storage.
    pub fn is_empty_match(&self) -> bool {
        self.filter.is_unsatisfiable()
    }

    pub fn to_query(&self) -> Query {
        Query {
            filter: self.filter_for_store(),
            sort: self.sort.iter().cloned().collect(),
            skip: Some(self.page.skip() as usize),
            take: Some(self.page.limit as usize),
            columns: self.columns.clone(),
        }
    }

    /// A query for the first matching document only.
    pub fn to_single_query(&self) -> Query {
        Query {
            skip: None,
            take: Some(1),
            ..self.to_query()
        }
    }

    pub fn filter_for_store(&self) -> Option<FilterGroup> {
        (!self.filter.is_match_all()).then(|| self.filter.clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    max_limit: u64,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LIMIT)
    }
}

impl QueryBuilder {
    pub const DEFAULT_MAX_LIMIT: u64 = 100;

    pub fn new(max_limit: u64) -> Self {
        Self {
            max_limit: max_limit.max(1),
        }
    }

    pub fn max_limit(&self) -> u64 {
        self.max_limit
    }

    /// Validate `params` against `template` and build the filter, sort and
    /// page. Fails only when a required parameter is missing; malformed
    /// values degrade instead.
    pub fn build(
        &self,
        template: &QueryTemplate,
        params: &RawParams,
    ) -> Result<QueryPlan, QueryError> {
        template.required.check(params)?;

        let mut criteria = Vec::with_capacity(template.bindings.len());
        let mut rejected = Vec::new();
        for binding in template.bindings {
            if let Some((criterion, errors)) = coerce_criterion(binding, params.get(binding.param))
            {
                criteria.push(criterion);
                rejected.extend(errors);
            }
        }

        let filter = combine(merge_ranges(criteria), template.logical);
        let sort = template.sort.map(|binding| {
            let field = binding
                .field_param
                .and_then(|p| params.first(p))
                .and_then(|f| binding.allowed.iter().find(|a| **a == f).copied())
                .unwrap_or(binding.default_field);
            resolve_sort(params.first(binding.direction_param), field)
        });
        let page = parse_page(params).with_max_limit(self.max_limit);
        let columns = (!template.columns.is_empty())
            .then(|| template.columns.iter().map(|c| c.to_string()).collect());

        debug!(
            filter = %render::to_document(&filter),
            ?sort,
            page = page.page,
            limit = page.limit,
            "built query"
        );

        Ok(QueryPlan {
            filter,
            sort,
            page,
            columns,
            rejected,
        })
    }
}

/// Lenient `page` / `limit` parse; see [`PageSpec::parse`].
pub fn parse_page(params: &RawParams) -> PageSpec {
    PageSpec::parse(params.first("page"), params.first("limit"))
}

/// Map one raw parameter onto a criterion. Returns `None` when the value is
/// absent or empty. Values that fail numeric or date coercion still produce
/// a criterion, one that matches no document.
pub fn build_criterion(binding: &ParamBinding, raw: Option<&RawValue>) -> Option<Criterion> {
    coerce_criterion(binding, raw).map(|(criterion, _)| criterion)
}

/// Combine criteria under one logical operator. No criteria means no
/// restriction, for `Or` as well as `And`.
pub fn combine(criteria: Vec<Criterion>, logical: LogicalOp) -> FilterGroup {
    match logical {
        LogicalOp::And => FilterGroup::all(criteria),
        LogicalOp::Or => FilterGroup::any(criteria),
    }
}

pub fn resolve_sort(raw_direction: Option<&str>, default_field: &str) -> Sort {
    Sort {
        field: default_field.to_string(),
        direction: SortDirection::parse(raw_direction),
    }
}

fn coerce_criterion(
    binding: &ParamBinding,
    raw: Option<&RawValue>,
) -> Option<(Criterion, Vec<QueryError>)> {
    let raw_values = raw?.values();
    let first = *raw_values.first()?;
    let field = binding.field.to_string();
    let mut errors = Vec::new();

    let mut coerce = |s: &str| match coerce_value(binding, s) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "degrading invalid input to a non-matching value");
            errors.push(e);
            Bson::Double(f64::NAN)
        }
    };

    let criterion = match binding.op {
        BindingOp::Equals => Criterion::Equals {
            field,
            value: coerce(first),
        },
        BindingOp::Contains => Criterion::Contains {
            field,
            values: raw_values.iter().copied().map(&mut coerce).collect(),
        },
        BindingOp::Min => Criterion::Range {
            field,
            min: Some(coerce(first)),
            max: None,
        },
        BindingOp::Max => Criterion::Range {
            field,
            min: None,
            max: Some(coerce(first)),
        },
        BindingOp::Above => Criterion::GreaterThan {
            field,
            value: coerce(first),
        },
        BindingOp::Below => Criterion::LessThan {
            field,
            value: coerce(first),
        },
        BindingOp::Keyword => Criterion::Regex {
            field,
            pattern: regex::escape(first),
            case_insensitive: true,
        },
    };

    Some((criterion, errors))
}

fn coerce_value(binding: &ParamBinding, raw: &str) -> Result<Bson, QueryError> {
    match binding.kind {
        ValueKind::Text => Ok(Bson::String(raw.to_string())),
        ValueKind::Number => parse_number(raw).ok_or_else(|| QueryError::InvalidNumber {
            param: binding.param.to_string(),
            raw: raw.to_string(),
        }),
        ValueKind::Date => parse_date(raw).ok_or_else(|| QueryError::InvalidDate {
            param: binding.param.to_string(),
            raw: raw.to_string(),
        }),
    }
}

/// Integral values become `Int64` so they compare exactly against integer
/// fields; everything else stays `Double`.
fn parse_number(raw: &str) -> Option<Bson> {
    let n = raw.parse::<f64>().ok().filter(|n| n.is_finite())?;
    const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if n.fract() == 0.0 && n.abs() < EXACT {
        Some(Bson::Int64(n as i64))
    } else {
        Some(Bson::Double(n))
    }
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_date(raw: &str) -> Option<Bson> {
    bson::DateTime::parse_rfc3339_str(raw)
        .or_else(|_| bson::DateTime::parse_rfc3339_str(format!("{raw}T00:00:00Z")))
        .ok()
        .map(Bson::DateTime)
}

/// Fold `Min` / `Max` ranges on the same field into a single criterion,
/// keeping the position of the first.
fn merge_ranges(criteria: Vec<Criterion>) -> Vec<Criterion> {
    let mut merged: Vec<Criterion> = Vec::with_capacity(criteria.len());
    for criterion in criteria {
        if let Criterion::Range { field, min, max } = &criterion {
            let existing = merged
                .iter_mut()
                .find(|c| matches!(c, Criterion::Range { field: f, .. } if f == field));
            if let Some(Criterion::Range {
                min: prev_min,
                max: prev_max,
                ..
            }) = existing
            {
                if min.is_some() {
                    *prev_min = min.clone();
                }
                if max.is_some() {
                    *prev_max = max.clone();
                }
                continue;
            }
        }
        merged.push(criterion);
    }
    merged
}
