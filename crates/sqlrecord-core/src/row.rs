//! Database row representation.
//!
//! Rows arrive from the transport as raw strings: every column is either its
//! database text representation or NULL. Typed values are produced later by the
//! coercion layer, which knows each column's declared type.

use std::collections::HashMap;
use std::sync::Arc;

/// Column metadata shared across all rows in a result set.
///
/// This struct is wrapped in `Arc` so all rows from the same query share
/// the same column information, saving memory for large result sets.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// Column names in order
    names: Vec<String>,
    /// Name -> index mapping for O(1) lookup
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Create new column info from a list of column names.
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            name_to_index,
        }
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the index of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Check if a column exists.
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get all column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A single row returned from a database query.
#[derive(Debug, Clone)]
pub struct Row {
    /// Column values in order; `None` is SQL NULL
    values: Vec<Option<String>>,
    /// Shared column metadata
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with the given columns and values.
    ///
    /// For multiple rows from the same result set, prefer `with_columns`
    /// to share the column metadata.
    pub fn new(column_names: Vec<String>, values: Vec<Option<String>>) -> Self {
        let columns = Arc::new(ColumnInfo::new(column_names));
        Self { values, columns }
    }

    /// Create a new row with shared column metadata.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Option<String>>) -> Self {
        Self { values, columns }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, Option<V>)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<Option<String>>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.map(Into::into)))
            .unzip();
        Self::new(names, values)
    }

    /// Get the shared column metadata.
    pub fn column_info(&self) -> Arc<ColumnInfo> {
        Arc::clone(&self.columns)
    }

    /// Get the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if this row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index.
    ///
    /// The outer `Option` is `None` when the index is out of range, the inner
    /// one when the column is NULL.
    pub fn get(&self, index: usize) -> Option<Option<&str>> {
        self.values.get(index).map(Option::as_deref)
    }

    /// Get a value by column name, distinguishing a missing column (outer
    /// `None`) from NULL (inner `None`).
    pub fn get_raw(&self, name: &str) -> Option<Option<&str>> {
        self.columns.index_of(name).and_then(|i| self.get(i))
    }

    /// Get a non-NULL value by column name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get_raw(name).flatten()
    }

    /// Check if a column exists by name.
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Iterate over `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_deref))
    }
}
