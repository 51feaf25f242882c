//! Query-parameter accumulation and wire encoding.
//!
//! Parameters are keyed by their final wire name (`filter[bundleId]`,
//! `limit[builds]`, `sort`, ...). Setting a key that is already present
//! replaces its value wholesale and keeps the key's original position, so the
//! encoded query is stable however many times a chain revisits a key.

use std::fmt;

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One or more values for a set-valued parameter.
pub trait QueryValues {
    fn into_values(self) -> Vec<String>;
}

impl QueryValues for &str {
    fn into_values(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl QueryValues for String {
    fn into_values(self) -> Vec<String> {
        vec![self]
    }
}

impl QueryValues for &String {
    fn into_values(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl QueryValues for Vec<String> {
    fn into_values(self) -> Vec<String> {
        self
    }
}

impl QueryValues for Vec<&str> {
    fn into_values(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl QueryValues for &[&str] {
    fn into_values(self) -> Vec<String> {
        self.iter().map(|v| v.to_string()).collect()
    }
}

impl<const N: usize> QueryValues for [&str; N] {
    fn into_values(self) -> Vec<String> {
        self.iter().map(|v| v.to_string()).collect()
    }
}

/// A pending parameter value before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParamValue {
    List(Vec<String>),
    Limit(u32),
    Sort(Vec<(String, SortDirection)>),
    Flag(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::List(values) => f.write_str(&values.join(",")),
            ParamValue::Limit(n) => write!(f, "{n}"),
            ParamValue::Sort(keys) => {
                let encoded: Vec<String> = keys
                    .iter()
                    .map(|(attr, dir)| match dir {
                        SortDirection::Ascending => attr.clone(),
                        SortDirection::Descending => format!("-{attr}"),
                    })
                    .collect();
                f.write_str(&encoded.join(","))
            }
            ParamValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Accumulated query parameters of one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `filter[<attr>]`; `attr` is already in wire form.
    pub fn set_filter(&mut self, attr: &str, values: Vec<String>) {
        self.set(format!("filter[{attr}]"), ParamValue::List(values));
    }

    pub fn set_include(&mut self, relationships: Vec<String>) {
        self.set("include".to_string(), ParamValue::List(relationships));
    }

    pub fn set_fields(&mut self, resource_type: &str, fields: Vec<String>) {
        self.set(format!("fields[{resource_type}]"), ParamValue::List(fields));
    }

    pub fn set_limit(&mut self, n: u32) {
        self.set("limit".to_string(), ParamValue::Limit(n));
    }

    pub fn set_related_limit(&mut self, relationship: &str, n: u32) {
        self.set(format!("limit[{relationship}]"), ParamValue::Limit(n));
    }

    pub fn set_sort(&mut self, keys: Vec<(String, SortDirection)>) {
        self.set("sort".to_string(), ParamValue::Sort(keys));
    }

    pub fn set_exists(&mut self, relationship: &str, present: bool) {
        self.set(format!("exists[{relationship}]"), ParamValue::Flag(present));
    }

    /// Encoded value of a wire key, e.g. `get("filter[bundleId]")`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.to_string())
    }

    /// `(key, value)` pairs in first-set order. Percent-encoding is left to
    /// URL assembly.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    fn set(&mut self, key: String, value: ParamValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_values_are_comma_joined() {
        let mut params = QueryParams::new();
        params.set_filter("bundleId", ["x", "y"].into_values());
        assert_eq!(params.to_pairs(), vec![("filter[bundleId]".to_string(), "x,y".to_string())]);
    }

    #[test]
    fn sort_encodes_descending_with_minus_in_call_order() {
        let mut params = QueryParams::new();
        params.set_sort(vec![
            ("a".to_string(), SortDirection::Ascending),
            ("b".to_string(), SortDirection::Descending),
        ]);
        assert_eq!(params.get("sort").as_deref(), Some("a,-b"));
    }

    #[test]
    fn exists_encodes_boolean_text() {
        let mut params = QueryParams::new();
        params.set_exists("gameCenterEnabledVersions", false);
        assert_eq!(
            params.get("exists[gameCenterEnabledVersions]").as_deref(),
            Some("false")
        );
    }

    #[test]
    fn repeated_key_overwrites_in_place() {
        let mut params = QueryParams::new();
        params.set_filter("bundleId", "first".into_values());
        params.set_limit(10);
        params.set_filter("bundleId", ["second", "third"].into_values());

        assert_eq!(params.len(), 2);
        assert_eq!(
            params.to_pairs(),
            vec![
                ("filter[bundleId]".to_string(), "second,third".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn related_limits_and_fields_are_bracketed() {
        let mut params = QueryParams::new();
        params.set_related_limit("builds", 5);
        params.set_fields("builds", vec!["version".to_string(), "expired".to_string()]);
        assert_eq!(params.get("limit[builds]").as_deref(), Some("5"));
        assert_eq!(params.get("fields[builds]").as_deref(), Some("version,expired"));
        assert_eq!(params.get("limit"), None);
    }

    #[test]
    fn values_accept_scalars_and_sequences() {
        assert_eq!("a".into_values(), ["a"]);
        assert_eq!(String::from("b").into_values(), ["b"]);
        assert_eq!(vec!["c", "d"].into_values(), ["c", "d"]);
        let slice: &[&str] = &["e"];
        assert_eq!(slice.into_values(), ["e"]);
    }
}
