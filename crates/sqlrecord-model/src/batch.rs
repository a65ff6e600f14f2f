//! Batch loading of related models.
//!
//! Loading the owner of every row in a bulk fetch one query at a time is the
//! classic N+1 problem. A [`RelationshipBatch`] instead collects the distinct
//! foreign keys of the whole batch and fetches every related row with a single
//! `IN (...)` query.

use crate::model::Model;
use crate::record::Record;
use chrono::{FixedOffset, Offset, Utc};
use indexmap::IndexMap;
use sqlrecord_core::{Column, Connection, Error, Result, SchemaError, Table, Value};
use sqlrecord_query::Database;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Foreign keys of one relationship column across a batch of models,
/// resolving to models of type `T`.
#[derive(Debug, Clone)]
pub struct RelationshipBatch<T: Model> {
    property: &'static str,
    /// Per-row key, `None` for NULL
    keys: Vec<Option<String>>,
    /// Distinct non-null keys in first-seen order
    distinct: IndexMap<String, Value>,
    _target: PhantomData<T>,
}

impl<T: Model> RelationshipBatch<T> {
    /// Record the foreign key held in `property` for every model.
    #[allow(clippy::result_large_err)]
    pub fn scan<'m, M: Model>(
        models: impl IntoIterator<Item = &'m M>,
        property: &'static str,
    ) -> Result<Self> {
        let column = M::table().require(property)?;
        let mut keys = Vec::new();
        let mut distinct = IndexMap::new();
        for model in models {
            let value = model.get(property);
            let key = if value.is_null() {
                None
            } else {
                column.format(&value, key_timezone())
            };
            if let Some(key) = &key {
                distinct
                    .entry(key.clone())
                    .or_insert_with(|| Value::Text(key.clone()));
            }
            keys.push(key);
        }
        Ok(Self {
            property,
            keys,
            distinct,
            _target: PhantomData,
        })
    }

    /// Property the keys were read from.
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Number of distinct non-null keys.
    pub fn distinct_len(&self) -> usize {
        self.distinct.len()
    }

    /// Fetch the related models, one entry per scanned model.
    ///
    /// Issues no query when every key is NULL. Keys with no matching row
    /// resolve to `None`.
    #[tracing::instrument(level = "debug", skip(self, db), fields(property = self.property, target = T::table().name()))]
    #[allow(clippy::result_large_err)]
    pub fn fetch<C: Connection>(&self, db: &Database<C>) -> Result<Vec<Option<Record<T>>>> {
        if self.distinct.is_empty() {
            return Ok(vec![None; self.keys.len()]);
        }

        let target = T::table();
        let pk = target_key(target)?;
        let config = db.config();
        let keys: Vec<Value> = self.distinct.values().cloned().collect();
        tracing::debug!(keys = keys.len(), "batch loading related models");

        let mut query = db.query_for(target).set_where(
            format!("{} IN (?)", config.dialect.quote_identifier(&pk.name)),
            vec![Value::Array(keys)],
        )?;
        let rows = db.fetch_rows(&mut query)?;

        let mut by_key: HashMap<String, Record<T>> = HashMap::with_capacity(rows.len());
        for row in &rows {
            let record = Record::<T>::from_row(row, config.timezone)?;
            if let Some(key) = pk.format(&record.get(pk.property), key_timezone()) {
                by_key.insert(key, record);
            }
        }

        Ok(self
            .keys
            .iter()
            .map(|key| key.as_ref().and_then(|k| by_key.get(k).cloned()))
            .collect())
    }

    /// Scan `models` and fetch their related models in one step.
    #[allow(clippy::result_large_err)]
    pub fn load<'m, M: Model, C: Connection>(
        db: &Database<C>,
        models: impl IntoIterator<Item = &'m M>,
        property: &'static str,
    ) -> Result<Vec<Option<Record<T>>>> {
        Self::scan(models, property)?.fetch(db)
    }
}

/// Keys are compared in their formatted form; the zone only matters for
/// date/time keys and just has to be the same on both sides.
fn key_timezone() -> FixedOffset {
    Utc.fix()
}

#[allow(clippy::result_large_err)]
fn target_key(table: &'static Table) -> Result<&'static Column> {
    table.primary_key_column().ok_or_else(|| {
        Error::Schema(SchemaError {
            table: table.name().to_string(),
            message: "relationship target has no primary key".to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Post, User, database, user_row};
    use pretty_assertions::assert_eq;

    fn post(author_id: Option<i64>) -> Post {
        Post {
            author_id,
            ..Post::default()
        }
    }

    #[test]
    fn test_scan_collects_distinct_keys() {
        let posts = [post(Some(3)), post(Some(3)), post(None), post(Some(8))];
        let batch = RelationshipBatch::<User>::scan(&posts, "authorId").unwrap();
        assert_eq!(batch.property(), "authorId");
        assert_eq!(batch.distinct_len(), 2);
    }

    #[test]
    fn test_scan_unknown_property() {
        let posts = [post(Some(3))];
        assert!(RelationshipBatch::<User>::scan(&posts, "editorId").is_err());
    }

    #[test]
    fn test_all_null_keys_issue_no_query() {
        let db = database();
        let posts = [post(None), post(None)];
        let authors = RelationshipBatch::<User>::load(&db, &posts, "authorId").unwrap();
        assert_eq!(authors.len(), 2);
        assert!(authors.iter().all(Option::is_none));
        assert!(db.connection().statements().is_empty());
    }

    #[test]
    fn test_fetch_distributes_in_scan_order() {
        let db = database();
        db.connection()
            .reply_rows(vec![user_row(8, "hal", None), user_row(3, "cy", None)]);

        let posts = [post(Some(3)), post(Some(8)), post(Some(3))];
        let authors = RelationshipBatch::<User>::load(&db, &posts, "authorId").unwrap();
        let names: Vec<&str> = authors
            .iter()
            .map(|a| a.as_ref().map_or("-", |u| u.name.as_str()))
            .collect();
        assert_eq!(names, vec!["cy", "hal", "cy"]);
        assert_eq!(
            db.connection().statements(),
            vec!["SELECT * FROM users WHERE (`id` IN (?,?));"]
        );
    }
}
