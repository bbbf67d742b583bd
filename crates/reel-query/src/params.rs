use std::collections::HashMap;

use serde::Deserialize;

/// A query-string value as delivered by the transport: a single value, or a
/// list when the parameter was repeated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    One(String),
    Many(Vec<String>),
}

impl RawValue {
    /// Non-empty, trimmed values. A scalar becomes a one-element list.
    pub fn values(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            RawValue::One(s) => vec![s.as_str()],
            RawValue::Many(v) => v.iter().map(String::as_str).collect(),
        };
        all.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// First non-empty value.
    pub fn first(&self) -> Option<&str> {
        self.values().into_iter().next()
    }
}

/// Raw, string-typed request parameters keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawParams(HashMap<String, RawValue>);

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `(name, value)` pairs. Repeated names collect into
    /// [`RawValue::Many`] in arrival order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (k, v) in pairs {
            params.push(k, v);
        }
        params
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let entry = match self.0.remove(&name) {
            None => RawValue::One(value),
            Some(RawValue::One(prev)) => RawValue::Many(vec![prev, value]),
            Some(RawValue::Many(mut prev)) => {
                prev.push(value);
                RawValue::Many(prev)
            }
        };
        self.0.insert(name, entry);
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.0.get(name)
    }

    /// First non-empty value of `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(RawValue::first)
    }

    /// True when `name` carries at least one non-empty value.
    pub fn has(&self, name: &str) -> bool {
        self.first(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_normalizes_to_singleton() {
        let v = RawValue::One("7.5".into());
        assert_eq!(v.values(), vec!["7.5"]);
    }

    #[test]
    fn empty_entries_are_dropped() {
        let v = RawValue::Many(vec!["".into(), " Drama ".into(), "  ".into()]);
        assert_eq!(v.values(), vec!["Drama"]);
        assert_eq!(RawValue::One("   ".into()).first(), None);
    }

    #[test]
    fn repeated_pairs_collect() {
        let params = RawParams::from_pairs([("ratings", "7"), ("genre", "Drama"), ("ratings", "8")]);
        assert_eq!(
            params.get("ratings"),
            Some(&RawValue::Many(vec!["7".into(), "8".into()]))
        );
        assert_eq!(params.get("genre"), Some(&RawValue::One("Drama".into())));
        assert!(params.has("genre"));
        assert!(!params.has("year"));
    }

    #[test]
    fn deserializes_either_shape() {
        let params: RawParams =
            serde_json::from_str(r#"{"ratings": ["7", "8"], "genre": "Drama"}"#).unwrap();
        assert_eq!(params.first("genre"), Some("Drama"));
        assert_eq!(params.get("ratings").unwrap().values(), vec!["7", "8"]);
    }
}
