//! Table metadata and the per-type schema registry.

use crate::column::Column;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Resolved schema of one model type.
///
/// Columns are indexed by property name (in declaration order) and by column
/// name. A `Table` is built once per model type and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: IndexMap<&'static str, Column>,
    by_column_name: HashMap<String, &'static str>,
    primary_key: Option<&'static str>,
    auto_increment: bool,
    read_only: bool,
}

impl Table {
    /// Start a table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            by_column_name: HashMap::new(),
            primary_key: None,
            auto_increment: false,
            read_only: false,
        }
    }

    /// Add a column. A column flagged as primary key becomes the table's key.
    pub fn column(mut self, column: Column) -> Self {
        if column.primary_key {
            self.primary_key = Some(column.property);
        }
        self.by_column_name
            .insert(column.name.clone(), column.property);
        self.columns.insert(column.property, column);
        self
    }

    /// Mark the primary key as generated by the database.
    pub fn auto_increment(mut self, value: bool) -> Self {
        self.auto_increment = value;
        self
    }

    /// Refuse INSERT, UPDATE and DELETE statements against this table.
    pub fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Property name of the primary key.
    pub fn primary_key(&self) -> Option<&'static str> {
        self.primary_key
    }

    /// Primary key column.
    pub fn primary_key_column(&self) -> Option<&Column> {
        self.primary_key.and_then(|p| self.columns.get(p))
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Look up a column by property name.
    pub fn column_for(&self, property: &str) -> Option<&Column> {
        self.columns.get(property)
    }

    /// Look up a column by property name, failing with a schema error.
    #[allow(clippy::result_large_err)]
    pub fn require(&self, property: &str) -> Result<&Column> {
        self.column_for(property)
            .ok_or_else(|| Error::unknown_property(&self.name, property))
    }

    /// Look up a column by database column name.
    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.by_column_name
            .get(name)
            .and_then(|property| self.columns.get(property))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

type Registry = RwLock<HashMap<TypeId, &'static Table>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Memoized schema for type `T`.
///
/// Every call returns the same `&'static Table`. `build` runs with no lock
/// held, so a schema may read another model's table while it is built. If two
/// threads build the same type at once, the first table registered wins.
pub fn table_for<T: 'static>(build: fn() -> Table) -> &'static Table {
    let key = TypeId::of::<T>();
    if let Some(table) = lookup(key) {
        return table;
    }

    let table = build();
    let mut tables = registry().write().unwrap_or_else(|e| e.into_inner());
    *tables.entry(key).or_insert_with(|| {
        tracing::debug!(
            table = %table.name(),
            columns = table.len(),
            "registered table schema"
        );
        &*Box::leak(Box::new(table))
    })
}

fn lookup(key: TypeId) -> Option<&'static Table> {
    let tables = registry().read().unwrap_or_else(|e| e.into_inner());
    tables.get(&key).copied()
}
