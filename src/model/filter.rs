//! Column-value filters

use super::row::Row;
use serde_json::Value;
use std::collections::BTreeMap;

/// Accepted-value sets keyed by column.
///
/// A column with no entry is unfiltered. Empty sets are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    filters: BTreeMap<String, Vec<Value>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace a column filter. An empty set removes it.
    pub fn set(&mut self, key: &str, accepted: Vec<Value>) {
        let mut values: Vec<Value> = Vec::with_capacity(accepted.len());
        for value in accepted {
            if !values.contains(&value) {
                values.push(value);
            }
        }

        if values.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), values);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.filters.remove(key);
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Keep only the filters whose column satisfies `keep`
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.filters.retain(|key, _| keep(key));
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }

    /// Accepted values for a column, empty when unfiltered
    pub fn accepted(&self, key: &str) -> &[Value] {
        self.filters.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Whether a row passes every active filter.
    /// A missing field never matches.
    pub fn accepts(&self, row: &Row) -> bool {
        self.filters.iter().all(|(key, accepted)| match row.get(key) {
            Some(value) => accepted.contains(value),
            None => false,
        })
    }
}
