//! Loading records by key or by query.

use crate::model::Model;
use crate::record::Record;
use sqlrecord_core::{Connection, Error, Result, SchemaError, Value};
use sqlrecord_query::{Database, Query};

impl<M: Model> Record<M> {
    /// A `SELECT *` against this model's table, configured for `db`.
    pub fn query<C: Connection>(db: &Database<C>) -> Query {
        db.query_for(M::table())
    }

    /// Load the record with the given primary key.
    #[allow(clippy::result_large_err)]
    pub fn find<C: Connection>(db: &Database<C>, key: impl Into<Value>) -> Result<Option<Self>> {
        let table = M::table();
        let pk = table.primary_key_column().ok_or_else(|| {
            Error::Schema(SchemaError {
                table: table.name().to_string(),
                message: "find needs a primary key".to_string(),
            })
        })?;
        let config = db.config();
        let key = pk
            .format(&key.into(), config.timezone)
            .map_or(Value::Null, Value::Text);

        let query = Self::query(db).set_where(
            format!("{} = ?", config.dialect.quote_identifier(&pk.name)),
            vec![key],
        )?;
        Self::fetch_one(db, query)
    }

    /// Run `query` and load every row, then attach related models.
    #[tracing::instrument(level = "debug", skip(db, query), fields(model = std::any::type_name::<M>()))]
    #[allow(clippy::result_large_err)]
    pub fn fetch_all<C: Connection>(db: &Database<C>, query: Query) -> Result<Vec<Self>> {
        let mut records = Self::load_records(db, query)?;
        if !records.is_empty() {
            M::load_relationships(db, &mut records)?;
        }
        Ok(records)
    }

    /// Run `query` limited to one row.
    #[allow(clippy::result_large_err)]
    pub fn fetch_one<C: Connection>(db: &Database<C>, query: Query) -> Result<Option<Self>> {
        Ok(Self::fetch_all(db, query.limit(1))?.into_iter().next())
    }

    /// Run `query` and load every row, without touching relationships.
    #[allow(clippy::result_large_err)]
    pub fn load_records<C: Connection>(db: &Database<C>, mut query: Query) -> Result<Vec<Self>> {
        let tz = db.config().timezone;
        db.fetch_rows(&mut query)?
            .iter()
            .map(|row| Self::from_row(row, tz))
            .collect()
    }
}
