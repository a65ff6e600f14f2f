//! Dirty tracking and the persistence lifecycle.
//!
//! A [`Record`] wraps a model together with a snapshot of the values it last
//! had in the database. A property is dirty when it is missing from the
//! snapshot or differs from it. The snapshot is retaken after construction and
//! after every successful create, update, upsert and reload.

use crate::auto::{AutoApplicator, WriteReason};
use crate::model::Model;
use chrono::FixedOffset;
use indexmap::IndexMap;
use sqlrecord_core::{Column, Connection, Dialect, Error, Result, Row, Value};
use sqlrecord_query::{Database, Query, Values};
use std::ops::{Deref, DerefMut};

/// A model instance with dirty tracking.
///
/// Dereferences to the wrapped model, so fields are read and written directly.
#[derive(Debug, Clone)]
pub struct Record<M: Model> {
    model: M,
    snapshot: IndexMap<&'static str, Value>,
}

impl<M: Model> Deref for Record<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M: Model> DerefMut for Record<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.model
    }
}

impl<M: Model> Record<M> {
    /// Track an existing model instance; it starts clean.
    pub fn new(model: M) -> Self {
        let mut record = Self {
            model,
            snapshot: IndexMap::new(),
        };
        record.mark_all_clean();
        record
    }

    /// A new instance holding every column's default value; it starts clean.
    #[allow(clippy::result_large_err)]
    pub fn fresh() -> Result<Self> {
        Self::with_values(std::iter::empty::<(&str, Value)>())
    }

    /// A new instance with column defaults, then `values` applied on top.
    ///
    /// The snapshot is taken after the initial values, so the result is clean.
    #[allow(clippy::result_large_err)]
    pub fn with_values<'v, V: Into<Value>>(
        values: impl IntoIterator<Item = (&'v str, V)>,
    ) -> Result<Self> {
        let mut model = M::default();
        for column in M::table().columns() {
            if let Some(default) = &column.default {
                model.set(column.property, default.clone())?;
            }
        }
        for (property, value) in values {
            M::table().require(property)?;
            model.set(property, value.into())?;
        }
        Ok(Self::new(model))
    }

    /// Build a clean record from a database row.
    ///
    /// Columns missing from the row keep their default; unknown row columns
    /// are ignored.
    #[allow(clippy::result_large_err)]
    pub fn from_row(row: &Row, tz: FixedOffset) -> Result<Self> {
        let mut model = M::default();
        apply_row(&mut model, row, tz)?;
        Ok(Self::new(model))
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_inner(self) -> M {
        self.model
    }

    // ==================== Dirty tracking ====================

    /// Properties whose value differs from the snapshot, in column order.
    #[tracing::instrument(level = "trace", skip(self), fields(model = std::any::type_name::<M>()))]
    pub fn dirty_fields(&self) -> Vec<&'static str> {
        let dirty: Vec<&'static str> = M::table()
            .columns()
            .filter(|column| self.is_column_dirty(column))
            .map(|column| column.property)
            .collect();
        tracing::trace!(dirty_count = dirty.len(), "dirty check result");
        dirty
    }

    pub fn is_dirty(&self) -> bool {
        M::table().columns().any(|column| self.is_column_dirty(column))
    }

    pub fn is_field_dirty(&self, property: &str) -> bool {
        M::table()
            .column_for(property)
            .is_some_and(|column| self.is_column_dirty(column))
    }

    fn is_column_dirty(&self, column: &Column) -> bool {
        self.snapshot
            .get(column.property)
            .is_none_or(|last| *last != self.model.get(column.property))
    }

    /// Treat the current values as persisted.
    pub fn mark_all_clean(&mut self) {
        self.snapshot = M::table()
            .columns()
            .map(|column| (column.property, self.model.get(column.property)))
            .collect();
    }

    /// Forget the snapshot; every property becomes dirty.
    pub fn mark_all_dirty(&mut self) {
        self.snapshot.clear();
    }

    // ==================== Primary key ====================

    /// Value of the primary key property, NULL if the table has none.
    pub fn primary_key_value(&self) -> Value {
        M::table()
            .primary_key()
            .map_or(Value::Null, |pk| self.model.get(pk))
    }

    /// Does the primary key hold a value (anything but NULL or "")?
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key_value().is_empty()
    }

    #[allow(clippy::result_large_err)]
    fn primary_key_column(&self) -> Result<&'static Column> {
        let table = M::table();
        match table.primary_key_column() {
            Some(column) if self.has_primary_key() => Ok(column),
            _ => Err(Error::MissingPrimaryKey {
                table: table.name().to_string(),
            }),
        }
    }

    #[allow(clippy::result_large_err)]
    fn where_primary_key<C: Connection>(&self, db: &Database<C>, query: Query) -> Result<Query> {
        let column = self.primary_key_column()?;
        let config = db.config();
        query.set_where(
            format!("{} = ?", config.dialect.quote_identifier(&column.name)),
            vec![self.formatted(column, config.timezone)],
        )
    }

    // ==================== Persistence ====================

    /// Column value as bound in a statement: formatted text or NULL.
    fn formatted(&self, column: &Column, tz: FixedOffset) -> Value {
        column
            .format(&self.model.get(column.property), tz)
            .map_or(Value::Null, Value::Text)
    }

    fn column_values<'c>(
        &self,
        columns: impl Iterator<Item = &'c Column>,
        tz: FixedOffset,
    ) -> IndexMap<String, Value> {
        columns
            .map(|column| (column.name.clone(), self.formatted(column, tz)))
            .collect()
    }

    /// Columns written by INSERT: all of them, minus a generated primary key.
    fn insert_columns() -> impl Iterator<Item = &'static Column> {
        let table = M::table();
        table
            .columns()
            .filter(move |column| !(column.primary_key && table.is_auto_increment()))
    }

    /// INSERT this record.
    ///
    /// For auto-increment tables the primary key is cleared first and set from
    /// the generated id afterwards.
    #[tracing::instrument(level = "debug", skip(self, db), fields(model = std::any::type_name::<M>()))]
    #[allow(clippy::result_large_err)]
    pub fn create<C: Connection>(&mut self, db: &Database<C>) -> Result<()> {
        let table = M::table();
        let pk = table.primary_key().filter(|_| table.is_auto_increment());
        if let Some(pk) = pk {
            self.model.set(pk, Value::Null)?;
        }

        AutoApplicator::new(db.config().now()).apply(&mut self.model, WriteReason::Create)?;

        let values = self.column_values(Self::insert_columns(), db.config().timezone);
        let mut query = db.query_for(table).insert().values(Values::Named(values));
        let result = db.execute(&mut query)?;

        if let (Some(pk), Some(id)) = (pk, result.last_insert_id) {
            self.model.set(pk, Value::Int(id))?;
        }
        self.mark_all_clean();
        Ok(())
    }

    /// UPDATE the dirty columns of this record.
    ///
    /// A clean record issues no statement, even against a read-only table.
    #[tracing::instrument(level = "debug", skip(self, db), fields(model = std::any::type_name::<M>()))]
    #[allow(clippy::result_large_err)]
    pub fn update<C: Connection>(&mut self, db: &Database<C>) -> Result<()> {
        if !self.is_dirty() {
            tracing::trace!("record is clean; skipping update");
            return Ok(());
        }

        self.primary_key_column()?;
        AutoApplicator::new(db.config().now()).apply(&mut self.model, WriteReason::Update)?;

        let table = M::table();
        let dirty = self.dirty_fields();
        let values = self.column_values(
            dirty.iter().filter_map(|property| table.column_for(property)),
            db.config().timezone,
        );
        let query = db.query_for(table).update().values(Values::Named(values));
        let mut query = self.where_primary_key(db, query)?;
        db.execute(&mut query)?;

        self.mark_all_clean();
        Ok(())
    }

    /// INSERT, or update the existing row on a key conflict.
    ///
    /// A generated primary key is left out of the column list and reported
    /// back by the database. With `reload`, the row is re-read afterwards.
    #[tracing::instrument(level = "debug", skip(self, db), fields(model = std::any::type_name::<M>()))]
    #[allow(clippy::result_large_err)]
    pub fn upsert<C: Connection>(&mut self, db: &Database<C>, reload: bool) -> Result<()> {
        AutoApplicator::new(db.config().now()).apply(&mut self.model, WriteReason::Upsert)?;

        let table = M::table();
        let config = db.config();
        let values = self.column_values(Self::insert_columns(), config.timezone);

        let pk_column = table.primary_key_column();
        let marker = pk_column
            .filter(|_| table.is_auto_increment() || config.dialect != Dialect::Mysql)
            .map(|column| column.name.as_str());

        let mut query = db
            .query_for(table)
            .insert()
            .values(Values::Named(values.clone()))
            .on_duplicate_key_update(values, marker);
        let result = db.execute(&mut query)?;

        if table.is_auto_increment() {
            if let (Some(pk), Some(id)) = (table.primary_key(), result.last_insert_id) {
                self.model.set(pk, Value::Int(id))?;
            }
        }
        self.mark_all_clean();

        if reload && self.has_primary_key() {
            self.reload(db)?;
        }
        Ok(())
    }

    /// DELETE the row with this record's primary key.
    #[tracing::instrument(level = "debug", skip(self, db), fields(model = std::any::type_name::<M>()))]
    #[allow(clippy::result_large_err)]
    pub fn delete<C: Connection>(&self, db: &Database<C>) -> Result<u64> {
        let query = db.query_for(M::table()).delete();
        let mut query = self.where_primary_key(db, query)?;
        Ok(db.execute(&mut query)?.rows_affected)
    }

    /// Update when the primary key has a value, create otherwise.
    #[allow(clippy::result_large_err)]
    pub fn save<C: Connection>(&mut self, db: &Database<C>) -> Result<()> {
        if self.has_primary_key() {
            self.update(db)
        } else {
            self.create(db)
        }
    }

    /// [`save`](Self::save), logging failures instead of returning them.
    pub fn try_save<C: Connection>(&mut self, db: &Database<C>) -> bool {
        match self.save(db) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    model = std::any::type_name::<M>(),
                    table = M::table().name(),
                    error = %e,
                    "save failed"
                );
                false
            }
        }
    }

    /// Re-read this record's row. Returns `false` when the row is gone.
    #[tracing::instrument(level = "debug", skip(self, db), fields(model = std::any::type_name::<M>()))]
    #[allow(clippy::result_large_err)]
    pub fn reload<C: Connection>(&mut self, db: &Database<C>) -> Result<bool> {
        let query = db.query_for(M::table());
        let mut query = self.where_primary_key(db, query)?;
        let rows = db.fetch_rows(&mut query)?;
        let Some(row) = rows.first() else {
            return Ok(false);
        };
        apply_row(&mut self.model, row, db.config().timezone)?;
        self.mark_all_clean();
        Ok(true)
    }

    /// Find the row whose columns equal every dirty non-key property.
    ///
    /// NULL values match with `IS NULL`. Returns `None` when nothing is dirty.
    #[tracing::instrument(level = "debug", skip(self, db), fields(model = std::any::type_name::<M>()))]
    #[allow(clippy::result_large_err)]
    pub fn fetch_existing<C: Connection>(&self, db: &Database<C>) -> Result<Option<Self>> {
        let table = M::table();
        let config = db.config();
        let criteria: Vec<&Column> = self
            .dirty_fields()
            .into_iter()
            .filter_map(|property| table.column_for(property))
            .filter(|column| !column.primary_key)
            .collect();
        if criteria.is_empty() {
            return Ok(None);
        }

        let mut query = db.query_for(table);
        for column in criteria {
            let name = config.dialect.quote_identifier(&column.name);
            query = match self.formatted(column, config.timezone) {
                Value::Null => query.and_where(format!("{} IS NULL", name), Vec::new())?,
                value => query.and_where(format!("{} = ?", name), vec![value])?,
            };
        }
        let rows = db.fetch_rows(&mut query.limit(1))?;
        rows.first()
            .map(|row| Self::from_row(row, config.timezone))
            .transpose()
    }

    /// Copy the column values of the stored counterpart, if one exists.
    ///
    /// Fields that are not columns, such as loaded relations, are kept.
    #[allow(clippy::result_large_err)]
    pub fn try_become_existing<C: Connection>(&mut self, db: &Database<C>) -> Result<bool> {
        let Some(existing) = self.fetch_existing(db)? else {
            return Ok(false);
        };
        for column in M::table().columns() {
            self.model.set(column.property, existing.get(column.property))?;
        }
        self.mark_all_clean();
        Ok(true)
    }
}

#[allow(clippy::result_large_err)]
fn apply_row<M: Model>(model: &mut M, row: &Row, tz: FixedOffset) -> Result<()> {
    let table = M::table();
    for (name, raw) in row.iter() {
        if let Some(column) = table.column_named(name) {
            model.set(column.property, column.parse(raw, tz))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Country, Post, Script, User, database, noon, post_row, user_row};
    use chrono::{Offset, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use sqlrecord_core::{Config, ExecResult, params};

    fn stored_user(id: i64, name: &str) -> Record<User> {
        Record::new(User {
            id: Some(id),
            name: name.to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
            ..User::default()
        })
    }

    #[test]
    fn test_dirty_tracking_lifecycle() {
        let mut user = Record::<User>::fresh().unwrap();
        assert_eq!(user.name, "anonymous");
        assert!(!user.is_dirty());
        assert!(user.dirty_fields().is_empty());

        user.email = Some("ann@example.com".to_string());
        assert_eq!(user.dirty_fields(), vec!["email"]);
        assert!(user.is_field_dirty("email"));
        assert!(!user.is_field_dirty("name"));

        user.mark_all_clean();
        assert!(user.dirty_fields().is_empty());

        user.mark_all_dirty();
        assert_eq!(user.dirty_fields().len(), 5);
    }

    #[test]
    fn test_reverting_a_change_makes_it_clean() {
        let mut user = stored_user(1, "ann");
        user.name = "bea".to_string();
        assert!(user.is_dirty());
        user.name = "ann".to_string();
        assert!(!user.is_dirty());
    }

    #[test]
    fn test_with_values_starts_clean() {
        let user = Record::<User>::with_values([("name", "ann")]).unwrap();
        assert_eq!(user.name, "ann");
        assert!(!user.is_dirty());

        let err = Record::<User>::with_values([("nickname", "a")]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_from_row_parses_and_ignores_unknown_columns() {
        let base = user_row(4, "ann", None);
        let row = Row::from_pairs(
            base.iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .chain([("score".to_string(), Some("12".to_string()))]),
        );
        let user = Record::<User>::from_row(&row, Utc.fix()).unwrap();
        assert_eq!(user.id, Some(4));
        assert_eq!(user.email, None);
        assert_eq!(
            user.created_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
        );
        assert!(!user.is_dirty());
    }

    #[test]
    fn test_create_inserts_and_takes_generated_key() {
        let db = database();
        db.connection()
            .reply(ExecResult::affected(1).last_insert_id(7));

        let mut user = Record::<User>::with_values([("name", "ann")]).unwrap();
        user.email = Some("ann@example.com".to_string());
        user.create(&db).unwrap();

        assert_eq!(user.id, Some(7));
        assert_eq!(user.created_at, Some(noon()));
        assert!(!user.is_dirty());

        let calls = db.connection().calls();
        assert_eq!(
            calls[0].0,
            "INSERT INTO users (`name`, `email`, `created_at`, `updated_at`) VALUES (?, ?, ?, ?);"
        );
        assert_eq!(
            calls[0].1,
            params![
                "ann",
                "ann@example.com",
                "2024-03-01 12:00:00",
                "2024-03-01 12:00:00"
            ]
        );
    }

    #[test]
    fn test_create_binds_null_for_empty_nullable_columns() {
        let db = database();
        let mut user = Record::<User>::fresh().unwrap();
        user.create(&db).unwrap();
        let calls = db.connection().calls();
        assert_eq!(calls[0].1[1], Value::Null);
    }

    #[test]
    fn test_update_writes_only_dirty_columns() {
        let db = database();
        let mut user = stored_user(7, "ann");

        user.update(&db).unwrap();
        assert!(db.connection().statements().is_empty());

        user.name = "bea".to_string();
        user.update(&db).unwrap();

        let calls = db.connection().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            "UPDATE users SET `name` = ?, `updated_at` = ? WHERE (`id` = ?);"
        );
        assert_eq!(calls[0].1, params!["bea", "2024-03-01 12:00:00", "7"]);
        assert!(!user.is_dirty());
    }

    #[test]
    fn test_update_needs_primary_key() {
        let db = database();
        let mut user = Record::<User>::fresh().unwrap();
        user.name = "bea".to_string();
        let err = user.update(&db).unwrap_err();
        assert!(matches!(err, Error::MissingPrimaryKey { .. }));
        assert!(db.connection().statements().is_empty());
        assert_eq!(user.updated_at, None);
        assert_eq!(user.dirty_fields(), vec!["name"]);
    }

    #[test]
    fn test_postgres_quotes_generated_where() {
        let db = Database::with_config(
            Script::default(),
            Config::new()
                .dialect(Dialect::Postgres)
                .clock(crate::testing::FixedClock(noon())),
        );
        let user = stored_user(3, "ann");
        user.delete(&db).unwrap();
        assert_eq!(
            db.connection().statements(),
            vec!["DELETE FROM users WHERE (\"id\" = ?);"]
        );
    }

    #[test]
    fn test_delete_reports_affected_rows() {
        let db = database();
        db.connection().reply(ExecResult::affected(0));
        let user = stored_user(3, "ann");
        assert_eq!(user.delete(&db).unwrap(), 0);
        assert_eq!(
            db.connection().statements(),
            vec!["DELETE FROM users WHERE (`id` = ?);"]
        );
    }

    #[test]
    fn test_save_picks_create_or_update() {
        let db = database();
        let mut fresh = Record::<User>::fresh().unwrap();
        fresh.save(&db).unwrap();

        let mut stored = stored_user(2, "ann");
        stored.email = Some("a@example.com".to_string());
        stored.save(&db).unwrap();

        let statements = db.connection().statements();
        assert!(statements[0].starts_with("INSERT INTO users"));
        assert!(statements[1].starts_with("UPDATE users SET"));
    }

    #[test]
    fn test_try_save_logs_and_returns_false() {
        let db = database();
        db.connection().fail("Duplicate entry 'ann' for key 'name'");
        let mut user = Record::<User>::with_values([("name", "ann")]).unwrap();
        assert!(!user.try_save(&db));
        assert!(user.try_save(&db));
    }

    #[test]
    fn test_transport_errors_surface_unchanged() {
        let db = database();
        db.connection().fail("server has gone away");
        let mut user = stored_user(1, "ann");
        user.name = "bea".to_string();
        let err = user.update(&db).unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("server has gone away"));
        assert!(user.is_dirty());
    }

    #[test]
    fn test_upsert_mysql_reports_generated_key() {
        let db = database();
        db.connection()
            .reply(ExecResult::affected(2).last_insert_id(11));

        let mut user = Record::<User>::with_values([("name", "ann")]).unwrap();
        user.upsert(&db, false).unwrap();

        assert_eq!(user.id, Some(11));
        assert!(!user.is_dirty());
        let calls = db.connection().calls();
        assert_eq!(
            calls[0].0,
            "INSERT INTO users (`name`, `email`, `created_at`, `updated_at`) VALUES (?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE `id` = LAST_INSERT_ID(`id`), `name` = ?, `email` = ?, \
             `created_at` = ?, `updated_at` = ?;"
        );
        assert_eq!(calls[0].1.len(), 8);
    }

    #[test]
    fn test_upsert_with_reload() {
        let db = database();
        db.connection()
            .reply(ExecResult::affected(1).last_insert_id(11))
            .reply_rows(vec![user_row(11, "ann", Some("ann@example.com"))]);

        let mut user = Record::<User>::with_values([("name", "ann")]).unwrap();
        user.upsert(&db, true).unwrap();

        assert_eq!(user.email.as_deref(), Some("ann@example.com"));
        assert_eq!(
            user.created_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
        );
        assert!(!user.is_dirty());
        assert_eq!(
            db.connection().statements()[1],
            "SELECT * FROM users WHERE (`id` = ?);"
        );
    }

    #[test]
    fn test_upsert_postgres_targets_primary_key() {
        let db = Database::with_config(
            Script::default(),
            Config::new()
                .dialect(Dialect::Postgres)
                .clock(crate::testing::FixedClock(noon())),
        );
        let mut user = Record::<User>::with_values([("name", "ann")]).unwrap();
        user.upsert(&db, false).unwrap();

        let sql = &db.connection().statements()[0];
        assert!(sql.contains("ON CONFLICT (\"id\") DO UPDATE SET \"id\" = EXCLUDED.\"id\""));
        assert!(sql.ends_with("RETURNING \"id\";"));
    }

    #[test]
    fn test_reload_missing_row() {
        let db = database();
        db.connection().reply_rows(Vec::new());
        let mut user = stored_user(9, "ann");
        assert!(!user.reload(&db).unwrap());
        assert_eq!(user.name, "ann");
    }

    #[test]
    fn test_fetch_existing_matches_dirty_columns() {
        let db = database();
        db.connection()
            .reply_rows(vec![user_row(4, "ann", Some("ann@example.com"))]);

        let mut candidate = Record::<User>::fresh().unwrap();
        candidate.name = "ann".to_string();
        candidate.email = Some("ann@example.com".to_string());
        let found = candidate.fetch_existing(&db).unwrap().unwrap();

        assert_eq!(found.id, Some(4));
        assert!(!found.is_dirty());
        let calls = db.connection().calls();
        assert_eq!(
            calls[0].0,
            "SELECT * FROM users WHERE (`name` = ?) AND (`email` = ?) LIMIT 1;"
        );
        assert_eq!(calls[0].1, params!["ann", "ann@example.com"]);
    }

    #[test]
    fn test_fetch_existing_null_criteria() {
        let db = database();
        let mut candidate = Record::new(User {
            email: Some("old@example.com".to_string()),
            ..User::default()
        });
        candidate.email = None;

        assert!(candidate.fetch_existing(&db).unwrap().is_none());
        assert_eq!(
            db.connection().statements(),
            vec!["SELECT * FROM users WHERE (`email` IS NULL) LIMIT 1;"]
        );
    }

    #[test]
    fn test_fetch_existing_without_criteria() {
        let db = database();
        let candidate = Record::<User>::fresh().unwrap();
        assert!(candidate.fetch_existing(&db).unwrap().is_none());
        assert!(db.connection().statements().is_empty());
    }

    #[test]
    fn test_try_become_existing() {
        let db = database();
        db.connection()
            .reply_rows(vec![user_row(4, "ann", Some("ann@example.com"))]);
        let mut candidate = Record::<User>::fresh().unwrap();
        candidate.email = Some("ann@example.com".to_string());
        assert!(candidate.try_become_existing(&db).unwrap());
        assert_eq!(candidate.id, Some(4));
        assert_eq!(candidate.name, "ann");
        assert!(!candidate.is_dirty());
    }

    #[test]
    fn test_try_become_existing_keeps_loaded_relations() {
        let db = database();
        db.connection()
            .reply_rows(vec![post_row(9, Some(4), "hello")]);
        let author = User {
            id: Some(4),
            name: "ann".to_string(),
            ..User::default()
        };
        let mut post = Record::<Post>::fresh().unwrap();
        post.title = "hello".to_string();
        post.author = Some(author.clone());

        assert!(post.try_become_existing(&db).unwrap());
        assert_eq!(post.id, Some(9));
        assert_eq!(post.author_id, Some(4));
        assert_eq!(post.author, Some(author));
        assert!(!post.is_dirty());
    }

    #[test]
    fn test_read_only_table() {
        let db = database();
        let mut country = Record::new(Country {
            code: "NZ".to_string(),
            name: "New Zealand".to_string(),
        });

        country.update(&db).unwrap();

        country.name = "Aotearoa".to_string();
        assert!(country.update(&db).unwrap_err().is_access_denied());
        assert!(country.delete(&db).unwrap_err().is_access_denied());

        let mut fresh = Record::<Country>::with_values([("code", "AU")]).unwrap();
        assert!(fresh.create(&db).unwrap_err().is_access_denied());
        assert!(db.connection().statements().is_empty());
    }
}
