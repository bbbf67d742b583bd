use bson::{Bson, Document};

use crate::criterion::Criterion;
use crate::filter::{FilterGroup, FilterNode, LogicalOp};

/// Render a filter tree as a MongoDB-style filter document.
///
/// - An empty group renders as `{}` (match everything)
/// - A group with one child renders as that child
/// - Otherwise `{ "$and": [...] }` / `{ "$or": [...] }`
/// - Each criterion renders as `{ field: { <operator>: value } }`
pub fn to_document(group: &FilterGroup) -> Document {
    match group.children.len() {
        0 => Document::new(),
        1 => node_to_document(&group.children[0]),
        _ => {
            let key = match group.logical {
                LogicalOp::And => "$and",
                LogicalOp::Or => "$or",
            };
            let children: Vec<Bson> = group
                .children
                .iter()
                .map(|c| Bson::Document(node_to_document(c)))
                .collect();
            let mut doc = Document::new();
            doc.insert(key, children);
            doc
        }
    }
}

fn node_to_document(node: &FilterNode) -> Document {
    match node {
        FilterNode::Condition(c) => criterion_to_document(c),
        FilterNode::Group(g) => to_document(g),
    }
}

fn criterion_to_document(criterion: &Criterion) -> Document {
    let mut ops = Document::new();
    match criterion {
        Criterion::Equals { value, .. } => {
            ops.insert("$eq", value.clone());
        }
        Criterion::Contains { values, .. } => {
            ops.insert("$in", values.clone());
        }
        Criterion::Range { min, max, .. } => {
            if let Some(min) = min {
                ops.insert("$gte", min.clone());
            }
            if let Some(max) = max {
                ops.insert("$lte", max.clone());
            }
        }
        Criterion::Regex {
            pattern,
            case_insensitive,
            ..
        } => {
            ops.insert("$regex", pattern.as_str());
            if *case_insensitive {
                ops.insert("$options", "i");
            }
        }
        Criterion::GreaterThan { value, .. } => {
            ops.insert("$gt", value.clone());
        }
        Criterion::LessThan { value, .. } => {
            ops.insert("$lt", value.clone());
        }
    }

    let mut doc = Document::new();
    doc.insert(criterion.field(), ops);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn genre() -> Criterion {
        Criterion::Contains {
            field: "genres".into(),
            values: vec![Bson::String("Drama".into())],
        }
    }

    fn year() -> Criterion {
        Criterion::Equals {
            field: "year".into(),
            value: Bson::Int64(1999),
        }
    }

    #[test]
    fn empty_group_is_empty_document() {
        assert_eq!(to_document(&FilterGroup::any(vec![])), doc! {});
        assert_eq!(to_document(&FilterGroup::all(vec![])), doc! {});
    }

    #[test]
    fn single_child_is_unwrapped() {
        let doc = to_document(&FilterGroup::all(vec![genre()]));
        assert_eq!(doc, doc! { "genres": { "$in": ["Drama"] } });
    }

    #[test]
    fn and_versus_or() {
        let all = to_document(&FilterGroup::all(vec![genre(), year()]));
        let any = to_document(&FilterGroup::any(vec![genre(), year()]));
        assert_eq!(
            all,
            doc! { "$and": [
                { "genres": { "$in": ["Drama"] } },
                { "year": { "$eq": 1999_i64 } },
            ] }
        );
        assert_eq!(
            any,
            doc! { "$or": [
                { "genres": { "$in": ["Drama"] } },
                { "year": { "$eq": 1999_i64 } },
            ] }
        );
    }

    #[test]
    fn range_uses_inclusive_operators() {
        let doc = to_document(&FilterGroup::all(vec![Criterion::Range {
            field: "runtime".into(),
            min: Some(Bson::Int64(90)),
            max: Some(Bson::Int64(120)),
        }]));
        assert_eq!(
            doc,
            doc! { "runtime": { "$gte": 90_i64, "$lte": 120_i64 } }
        );
    }

    #[test]
    fn regex_with_options() {
        let doc = to_document(&FilterGroup::all(vec![Criterion::Regex {
            field: "title".into(),
            pattern: "^heat".into(),
            case_insensitive: true,
        }]));
        assert_eq!(
            doc,
            doc! { "title": { "$regex": "^heat", "$options": "i" } }
        );
    }

    #[test]
    fn strict_bounds() {
        let doc = to_document(&FilterGroup::all(vec![
            Criterion::GreaterThan {
                field: "year".into(),
                value: Bson::Int64(1990),
            },
            Criterion::LessThan {
                field: "year".into(),
                value: Bson::Int64(2000),
            },
        ]));
        assert_eq!(
            doc,
            doc! { "$and": [
                { "year": { "$gt": 1990_i64 } },
                { "year": { "$lt": 2000_i64 } },
            ] }
        );
    }
}
