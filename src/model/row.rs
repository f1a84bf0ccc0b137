//! Rows and the row store
//!
//! Rows are identified by a [`RowId`] handle rather than by their contents,
//! so two records with identical fields remain distinct rows.

use super::column::ColumnDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A raw record: column key to value
pub type Record = Map<String, Value>;

/// Stable identity of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One record plus its identity
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub fields: Record,
}

impl Row {
    pub fn new(id: RowId, fields: Record) -> Self {
        Self { id, fields }
    }

    /// Value for a column key, `None` when the field is absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Holds the raw row sequence and the column descriptors
#[derive(Debug, Default)]
pub struct RowStore {
    rows: Vec<Row>,
    columns: Vec<ColumnDescriptor>,
    next_id: u64,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rows, allocating a fresh id for every record.
    ///
    /// Returns the ids in store order.
    pub fn set_rows(&mut self, records: Vec<Record>) -> Vec<RowId> {
        self.rows = records
            .into_iter()
            .map(|fields| {
                let id = RowId(self.next_id);
                self.next_id += 1;
                Row::new(id, fields)
            })
            .collect();
        self.ids()
    }

    /// Replace all rows, keeping caller-supplied ids
    pub fn set_identified_rows(&mut self, rows: Vec<Row>) -> Vec<RowId> {
        if let Some(max) = rows.iter().map(|r| r.id.0).max() {
            self.next_id = self.next_id.max(max + 1);
        }
        self.rows = rows;
        self.ids()
    }

    /// Replace all columns; order is display order
    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) {
        self.columns = columns;
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id).collect()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.rows.iter().any(|r| r.id == id)
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct values present in a column, in first-seen order.
    /// Missing fields are skipped.
    pub fn distinct_values(&self, key: &str) -> Vec<Value> {
        let mut values: Vec<Value> = Vec::new();
        for value in self.rows.iter().filter_map(|r| r.get(key)) {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_identical_records_get_distinct_ids() {
        let mut store = RowStore::new();
        let ids = store.set_rows(vec![record(json!({"a": 1})), record(json!({"a": 1}))]);

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(store.row(ids[0]).unwrap().fields, store.row(ids[1]).unwrap().fields);
    }

    #[test]
    fn test_set_rows_allocates_fresh_ids_each_time() {
        let mut store = RowStore::new();
        let first = store.set_rows(vec![record(json!({"a": 1}))]);
        let second = store.set_rows(vec![record(json!({"a": 1}))]);

        assert_ne!(first, second);
        assert!(!store.contains(first[0]));
        assert!(store.contains(second[0]));
    }

    #[test]
    fn test_identified_rows_keep_ids_and_bump_counter() {
        let mut store = RowStore::new();
        store.set_identified_rows(vec![Row::new(RowId(41), record(json!({"a": 1})))]);
        assert!(store.contains(RowId(41)));

        let ids = store.set_rows(vec![record(json!({"a": 2}))]);
        assert_eq!(ids, vec![RowId(42)]);
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        let mut store = RowStore::new();
        store.set_rows(vec![
            record(json!({"city": "Oslo"})),
            record(json!({"city": "Bergen"})),
            record(json!({"city": "Oslo"})),
            record(json!({"other": 1})),
        ]);

        assert_eq!(store.distinct_values("city"), vec![json!("Oslo"), json!("Bergen")]);
    }
}
