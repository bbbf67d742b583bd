use std::cmp::Ordering;

use bson::{Bson, Document};
use reel_query::{FilterGroup, Query, Sort, SortDirection};

use crate::error::StoreError;
use crate::matcher::{Number, Predicate, get_path, value_cmp};

/// Run `query` over an in-memory slice: filter, sort, skip, take, project.
pub(crate) fn find(docs: &[Document], query: &Query) -> Result<Vec<Document>, StoreError> {
    let mut records = filter(docs, query.filter.as_ref())?;
    sort_records(&query.sort, &mut records);

    let skip = query.skip.unwrap_or(0);
    let take = query.take.unwrap_or(usize::MAX);
    Ok(records
        .into_iter()
        .skip(skip)
        .take(take)
        .map(|doc| match &query.columns {
            Some(columns) => project(doc, columns),
            None => doc.clone(),
        })
        .collect())
}

pub(crate) fn count(docs: &[Document], group: Option<&FilterGroup>) -> Result<u64, StoreError> {
    Ok(filter(docs, group)?.len() as u64)
}

fn filter<'d>(
    docs: &'d [Document],
    group: Option<&FilterGroup>,
) -> Result<Vec<&'d Document>, StoreError> {
    let predicate = group.map(Predicate::compile).transpose()?;
    Ok(docs
        .iter()
        .filter(|doc| predicate.as_ref().is_none_or(|p| p.matches(doc)))
        .collect())
}

/// Stable multi-key sort. Missing and null values sort first ascending,
/// then NaN, then other numbers.
fn sort_records(sorts: &[Sort], records: &mut [&Document]) {
    if sorts.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        for sort in sorts {
            let ord = compare_field_values(get_path(a, &sort.field), get_path(b, &sort.field));
            let ord = match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

pub(crate) fn compare_field_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let a = a.filter(|v| !matches!(v, Bson::Null));
    let b = b.filter(|v| !matches!(v, Bson::Null));
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (Number::of(a), Number::of(b)) {
            (Some(x), Some(y)) => x.total_cmp(y),
            _ => value_cmp(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b))),
        },
    }
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 1,
        Bson::String(_) => 2,
        Bson::Document(_) => 3,
        Bson::Array(_) => 4,
        Bson::Boolean(_) => 5,
        Bson::DateTime(_) => 6,
        _ => 7,
    }
}

/// Keep only `columns` (dotted paths allowed), in column order.
fn project(doc: &Document, columns: &[String]) -> Document {
    let mut out = Document::new();
    for column in columns {
        if let Some(value) = get_path(doc, column) {
            insert_path(&mut out, column, value.clone());
        }
    }
    out
}

fn insert_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(sub)) = doc.get_mut(head) {
                insert_path(sub, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn records() -> Vec<Document> {
        vec![
            doc! { "_id": 1, "title": "Heat", "year": 1995, "imdb": { "rating": 8.3 } },
            doc! { "_id": 2, "title": "Alien", "year": 1979, "imdb": { "rating": 8.5 } },
            doc! { "_id": 3, "title": "Tron", "imdb": { "rating": 6.8 } },
            doc! { "_id": 4, "title": "Se7en", "year": 1995_i64, "imdb": { "rating": 8.6 } },
        ]
    }

    fn ids(docs: &[Document]) -> Vec<i32> {
        docs.iter().map(|d| d.get_i32("_id").unwrap()).collect()
    }

    #[test]
    fn sort_desc_puts_missing_last() {
        let query = Query {
            sort: vec![Sort {
                field: "year".into(),
                direction: SortDirection::Desc,
            }],
            ..Default::default()
        };
        let out = find(&records(), &query).unwrap();
        // Ties keep insertion order.
        assert_eq!(ids(&out), vec![1, 4, 2, 3]);
    }

    #[test]
    fn multi_key_sort() {
        let query = Query {
            sort: vec![
                Sort {
                    field: "year".into(),
                    direction: SortDirection::Asc,
                },
                Sort {
                    field: "imdb.rating".into(),
                    direction: SortDirection::Desc,
                },
            ],
            ..Default::default()
        };
        let out = find(&records(), &query).unwrap();
        assert_eq!(ids(&out), vec![3, 2, 4, 1]);
    }

    #[test]
    fn skip_and_take() {
        let query = Query {
            skip: Some(1),
            take: Some(2),
            ..Default::default()
        };
        let out = find(&records(), &query).unwrap();
        assert_eq!(ids(&out), vec![2, 3]);

        let past_end = Query {
            skip: Some(10),
            take: Some(2),
            ..Default::default()
        };
        assert!(find(&records(), &past_end).unwrap().is_empty());
    }

    #[test]
    fn projection_drops_id_and_keeps_nested() {
        let query = Query {
            take: Some(1),
            columns: Some(vec!["year".into(), "imdb.rating".into()]),
            ..Default::default()
        };
        let out = find(&records(), &query).unwrap();
        assert_eq!(out, vec![doc! { "year": 1995, "imdb": { "rating": 8.3 } }]);
    }

    #[test]
    fn nan_ratings_keep_the_sort_consistent() {
        let docs: Vec<Document> = (0..200)
            .map(|i| {
                let rating = if i % 3 == 0 { f64::NAN } else { ((i * 37) % 100) as f64 / 10.0 };
                doc! { "_id": i, "imdb": { "rating": rating } }
            })
            .collect();
        let query = Query {
            sort: vec![Sort {
                field: "imdb.rating".into(),
                direction: SortDirection::Asc,
            }],
            ..Default::default()
        };
        let out = find(&docs, &query).unwrap();
        let ratings: Vec<f64> = out
            .iter()
            .map(|d| d.get_document("imdb").unwrap().get_f64("rating").unwrap())
            .collect();

        let nan_count = ratings.iter().take_while(|r| r.is_nan()).count();
        assert_eq!(nan_count, 67);
        let rest = &ratings[nan_count..];
        assert!(rest.iter().all(|r| !r.is_nan()));
        assert!(rest.windows(2).all(|w| w[0] <= w[1]), "out of order: {rest:?}");
    }

    #[test]
    fn compare_orders_types() {
        assert_eq!(
            compare_field_values(Some(&Bson::Int32(3)), Some(&Bson::String("a".into()))),
            Ordering::Less
        );
        assert_eq!(
            compare_field_values(Some(&Bson::Null), None),
            Ordering::Equal
        );
    }
}
