use std::cmp::Ordering;

use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};
use reel_query::{Criterion, FilterGroup, FilterNode, LogicalOp};

use crate::error::StoreError;

/// A filter tree with its regexes compiled, borrowed from the query.
#[derive(Debug)]
pub(crate) enum Predicate<'a> {
    And(Vec<Predicate<'a>>),
    Or(Vec<Predicate<'a>>),
    Eq(&'a str, &'a Bson),
    In(&'a str, &'a [Bson]),
    Range(&'a str, Option<&'a Bson>, Option<&'a Bson>),
    Gt(&'a str, &'a Bson),
    Lt(&'a str, &'a Bson),
    Regex(&'a str, Regex),
}

impl<'a> Predicate<'a> {
    pub(crate) fn compile(group: &'a FilterGroup) -> Result<Self, StoreError> {
        let children = group
            .children
            .iter()
            .map(|node| match node {
                FilterNode::Condition(c) => compile_criterion(c),
                FilterNode::Group(g) => Predicate::compile(g),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match group.logical {
            LogicalOp::And => Predicate::And(children),
            LogicalOp::Or => Predicate::Or(children),
        })
    }

    pub(crate) fn matches(&self, doc: &Document) -> bool {
        match self {
            Predicate::And(children) => children.iter().all(|c| c.matches(doc)),
            // An empty OR matches everything, like an empty AND.
            Predicate::Or(children) => {
                children.is_empty() || children.iter().any(|c| c.matches(doc))
            }
            Predicate::Eq(field, val) => any_value(doc, field, |v| value_eq(v, val)),
            Predicate::In(field, vals) => {
                any_value(doc, field, |v| vals.iter().any(|q| value_eq(v, q)))
            }
            Predicate::Range(field, min, max) => any_value(doc, field, |v| {
                min.is_none_or(|m| value_cmp(v, m).is_some_and(|o| o != Ordering::Less))
                    && max.is_none_or(|m| value_cmp(v, m).is_some_and(|o| o != Ordering::Greater))
            }),
            Predicate::Gt(field, val) => {
                any_value(doc, field, |v| value_cmp(v, val) == Some(Ordering::Greater))
            }
            Predicate::Lt(field, val) => {
                any_value(doc, field, |v| value_cmp(v, val) == Some(Ordering::Less))
            }
            Predicate::Regex(field, re) => any_value(doc, field, |v| match v {
                Bson::String(s) => re.is_match(s),
                _ => false,
            }),
        }
    }
}

fn compile_criterion(criterion: &Criterion) -> Result<Predicate<'_>, StoreError> {
    Ok(match criterion {
        Criterion::Equals { field, value } => Predicate::Eq(field, value),
        Criterion::Contains { field, values } => Predicate::In(field, values),
        Criterion::Range { field, min, max } => Predicate::Range(field, min.as_ref(), max.as_ref()),
        Criterion::GreaterThan { field, value } => Predicate::Gt(field, value),
        Criterion::LessThan { field, value } => Predicate::Lt(field, value),
        Criterion::Regex {
            field,
            pattern,
            case_insensitive,
        } => {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(*case_insensitive)
                .build()
                .map_err(|e| StoreError::InvalidQuery(format!("invalid regex pattern: {e}")))?;
            Predicate::Regex(field, re)
        }
    })
}

/// Apply `test` to the value at `path`, or to each element when the value is
/// an array. Missing and null values never match.
fn any_value(doc: &Document, path: &str, test: impl Fn(&Bson) -> bool) -> bool {
    match get_path(doc, path) {
        Some(Bson::Array(items)) => items.iter().any(test),
        Some(Bson::Null) | None => false,
        Some(v) => test(v),
    }
}

/// Resolve a dotted path through embedded documents.
pub(crate) fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(sub) => sub.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn value_eq(stored: &Bson, query: &Bson) -> bool {
    match value_cmp(stored, query) {
        Some(o) => o == Ordering::Equal,
        None => !is_nan(query) && stored == query,
    }
}

/// Ordering between comparable values. Numbers compare exactly across BSON
/// numeric types; NaN and mismatched types are incomparable.
pub(crate) fn value_cmp(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            Some(a.timestamp_millis().cmp(&b.timestamp_millis()))
        }
        _ => match (Number::of(a), Number::of(b)) {
            (Some(a), Some(b)) => a.partial_cmp(b),
            _ => None,
        },
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn of(v: &Bson) -> Option<Self> {
        match v {
            Bson::Int32(n) => Some(Number::Int(*n as i64)),
            Bson::Int64(n) => Some(Number::Int(*n)),
            Bson::Double(n) => Some(Number::Float(*n)),
            _ => None,
        }
    }

    fn is_nan(self) -> bool {
        matches!(self, Number::Float(f) if f.is_nan())
    }

    /// `None` when either side is NaN.
    pub(crate) fn partial_cmp(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
            (Number::Int(a), Number::Float(b)) => int_float_cmp(a, b),
            (Number::Float(a), Number::Int(b)) => int_float_cmp(b, a).map(Ordering::reverse),
        }
    }

    /// Total order for sorting: NaN sorts below every other number.
    pub(crate) fn total_cmp(self, other: Number) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
        }
    }
}

/// Exact comparison of an integer with a double, without rounding the
/// integer through `f64`.
fn int_float_cmp(i: i64, f: f64) -> Option<Ordering> {
    const TWO_63: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return None;
    }
    if f >= TWO_63 {
        return Some(Ordering::Less);
    }
    if f < -TWO_63 {
        return Some(Ordering::Greater);
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)),
        other => Some(other),
    }
}

fn is_nan(v: &Bson) -> bool {
    matches!(v, Bson::Double(f) if f.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn movie() -> Document {
        doc! {
            "title": "The Matrix",
            "year": 1999_i32,
            "runtime": 136_i32,
            "genres": ["Action", "Sci-Fi"],
            "imdb": { "rating": 8.7, "votes": 1_080_566_i32 },
            "released": bson::DateTime::from_millis(922_838_400_000),
            "plot": Bson::Null,
        }
    }

    fn check(criterion: Criterion) -> bool {
        let group = FilterGroup::all(vec![criterion]);
        Predicate::compile(&group).unwrap().matches(&movie())
    }

    #[test]
    fn get_path_dotted() {
        assert_eq!(get_path(&movie(), "imdb.rating"), Some(&Bson::Double(8.7)));
        assert_eq!(get_path(&movie(), "imdb.missing"), None);
        assert_eq!(get_path(&movie(), "title.deeper"), None);
    }

    #[test]
    fn eq_crosses_numeric_types() {
        assert!(check(Criterion::Equals {
            field: "year".into(),
            value: Bson::Int64(1999),
        }));
        assert!(check(Criterion::Equals {
            field: "year".into(),
            value: Bson::Double(1999.0),
        }));
    }

    #[test]
    fn large_integers_compare_exactly_with_doubles() {
        let big = 9_007_199_254_740_993_i64; // 2^53 + 1
        let near = 9_007_199_254_740_992.0; // 2^53
        assert_eq!(
            value_cmp(&Bson::Int64(big), &Bson::Double(near)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            value_cmp(&Bson::Double(near), &Bson::Int64(big)),
            Some(Ordering::Less)
        );
        assert_eq!(
            value_cmp(&Bson::Int64(big), &Bson::Int64(big - 1)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            value_cmp(&Bson::Int32(-3), &Bson::Double(-2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            value_cmp(&Bson::Int64(i64::MAX), &Bson::Double(1e19)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn nan_sorts_below_numbers() {
        let nan = Number::Float(f64::NAN);
        assert_eq!(nan.total_cmp(Number::Int(i64::MIN)), Ordering::Less);
        assert_eq!(nan.total_cmp(Number::Float(f64::NEG_INFINITY)), Ordering::Less);
        assert_eq!(nan.total_cmp(nan), Ordering::Equal);
        assert_eq!(Number::Int(2).total_cmp(nan), Ordering::Greater);
    }

    #[test]
    fn nan_never_matches() {
        let nan = Bson::Double(f64::NAN);
        assert!(!check(Criterion::Equals {
            field: "year".into(),
            value: nan.clone(),
        }));
        assert!(!check(Criterion::Range {
            field: "year".into(),
            min: Some(nan.clone()),
            max: None,
        }));
        assert!(!check(Criterion::LessThan {
            field: "year".into(),
            value: nan,
        }));
    }

    #[test]
    fn contains_matches_array_elements() {
        assert!(check(Criterion::Contains {
            field: "genres".into(),
            values: vec![Bson::String("Sci-Fi".into()), Bson::String("Drama".into())],
        }));
        assert!(!check(Criterion::Contains {
            field: "genres".into(),
            values: vec![Bson::String("Drama".into())],
        }));
    }

    #[test]
    fn range_is_inclusive() {
        let range = |min: i64, max: i64| Criterion::Range {
            field: "runtime".into(),
            min: Some(Bson::Int64(min)),
            max: Some(Bson::Int64(max)),
        };
        assert!(check(range(136, 136)));
        assert!(check(range(90, 136)));
        assert!(!check(range(137, 200)));
    }

    #[test]
    fn strict_bounds_exclude_equal() {
        assert!(!check(Criterion::GreaterThan {
            field: "year".into(),
            value: Bson::Int64(1999),
        }));
        assert!(check(Criterion::GreaterThan {
            field: "year".into(),
            value: Bson::Int64(1998),
        }));
    }

    #[test]
    fn dates_compare_by_millis() {
        let from = bson::DateTime::parse_rfc3339_str("1999-01-01T00:00:00Z").unwrap();
        assert!(check(Criterion::Range {
            field: "released".into(),
            min: Some(Bson::DateTime(from)),
            max: None,
        }));

        let release = Bson::DateTime(
            bson::DateTime::parse_rfc3339_str("1999-03-31T00:00:00Z").unwrap(),
        );
        assert!(check(Criterion::Range {
            field: "released".into(),
            min: Some(release.clone()),
            max: Some(release),
        }));
        let day_before = bson::DateTime::parse_rfc3339_str("1999-03-30T00:00:00Z").unwrap();
        assert!(!check(Criterion::Range {
            field: "released".into(),
            min: None,
            max: Some(Bson::DateTime(day_before)),
        }));
    }

    #[test]
    fn regex_case_insensitive() {
        assert!(check(Criterion::Regex {
            field: "title".into(),
            pattern: "matrix".into(),
            case_insensitive: true,
        }));
        assert!(!check(Criterion::Regex {
            field: "title".into(),
            pattern: "matrix".into(),
            case_insensitive: false,
        }));
    }

    #[test]
    fn null_field_never_matches() {
        assert!(!check(Criterion::Equals {
            field: "plot".into(),
            value: Bson::Null,
        }));
    }

    #[test]
    fn empty_groups_match() {
        let any = FilterGroup::any(vec![]);
        let all = FilterGroup::all(vec![]);
        assert!(Predicate::compile(&any).unwrap().matches(&movie()));
        assert!(Predicate::compile(&all).unwrap().matches(&movie()));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let group = FilterGroup::all(vec![Criterion::Regex {
            field: "title".into(),
            pattern: "[unclosed".into(),
            case_insensitive: false,
        }]);
        let err = Predicate::compile(&group).unwrap_err();
        assert!(err.to_string().contains("invalid regex"), "{err}");
    }
}
