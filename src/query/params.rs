//! Request parameters for a call.

use std::collections::HashMap;

/// Mapping from placeholder name to a single string value.
///
/// Built from a URL query string; when a key repeats, the first value wins.
/// Values are never coerced: every parameter is text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    values: HashMap<String, String>,
}

impl ParameterSet {
    /// Parses a raw (still percent-encoded) query string.
    pub fn from_query_string(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    /// Adds a parameter unless one with the same name already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::default();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}
