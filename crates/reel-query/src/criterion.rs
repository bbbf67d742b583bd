use bson::Bson;
use serde::{Deserialize, Serialize};

/// A single condition over one document field.
///
/// Values are already typed: numeric inputs that failed to parse are carried
/// as `Bson::Double(NaN)`, which compares false against every stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum Criterion {
    Equals {
        field: String,
        value: Bson,
    },
    /// The field value (or any element of an array field) is one of `values`.
    Contains {
        field: String,
        values: Vec<Bson>,
    },
    /// Inclusive on both bounds. At least one bound is present.
    Range {
        field: String,
        min: Option<Bson>,
        max: Option<Bson>,
    },
    Regex {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    GreaterThan {
        field: String,
        value: Bson,
    },
    LessThan {
        field: String,
        value: Bson,
    },
}

impl Criterion {
    pub fn field(&self) -> &str {
        match self {
            Criterion::Equals { field, .. }
            | Criterion::Contains { field, .. }
            | Criterion::Range { field, .. }
            | Criterion::Regex { field, .. }
            | Criterion::GreaterThan { field, .. }
            | Criterion::LessThan { field, .. } => field,
        }
    }

    /// True when no document can ever satisfy this criterion.
    pub fn is_unsatisfiable(&self) -> bool {
        match self {
            Criterion::Equals { value, .. }
            | Criterion::GreaterThan { value, .. }
            | Criterion::LessThan { value, .. } => is_nan(value),
            Criterion::Contains { values, .. } => values.iter().all(is_nan),
            Criterion::Range { min, max, .. } => {
                min.as_ref().is_some_and(is_nan) || max.as_ref().is_some_and(is_nan)
            }
            Criterion::Regex { .. } => false,
        }
    }
}

fn is_nan(value: &Bson) -> bool {
    matches!(value, Bson::Double(f) if f.is_nan())
}
