//! A connection paired with its configuration.

use crate::query::Query;
use sqlrecord_core::{Config, Connection, ExecResult, Result, Row, Table};

/// Handle used to run queries: a [`Connection`] plus the [`Config`] every
/// statement sent through it is rendered with.
#[derive(Debug)]
pub struct Database<C: Connection> {
    conn: C,
    config: Config,
}

impl<C: Connection> Database<C> {
    /// Wrap a connection with default settings.
    pub fn new(conn: C) -> Self {
        Self::with_config(conn, Config::default())
    }

    pub fn with_config(conn: C, config: Config) -> Self {
        Self { conn, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn into_connection(self) -> C {
        self.conn
    }

    /// Start a `SELECT *` against a table, using this database's dialect and
    /// timezone.
    pub fn query(&self, table: impl Into<String>) -> Query {
        Query::new(table).configured(&self.config)
    }

    /// Start a `SELECT *` against a model's table, carrying its read-only flag.
    pub fn query_for(&self, table: &Table) -> Query {
        self.query(table.name()).read_only(table.is_read_only())
    }

    /// Render and execute a query.
    ///
    /// Transport errors are returned unchanged.
    #[tracing::instrument(level = "debug", skip(self, query), fields(table = %query.table()))]
    #[allow(clippy::result_large_err)]
    pub fn execute(&self, query: &mut Query) -> Result<ExecResult> {
        let sql = query.render()?;
        tracing::debug!(sql = %sql, params = query.params().len(), "executing statement");

        let result = self.conn.execute(&sql, query.params());
        match &result {
            Ok(r) => tracing::trace!(
                rows = r.rows.len(),
                rows_affected = r.rows_affected,
                last_insert_id = ?r.last_insert_id,
                "statement finished"
            ),
            Err(e) => tracing::debug!(error = %e, "statement failed"),
        }
        result
    }

    /// Execute a query and return its rows.
    #[allow(clippy::result_large_err)]
    pub fn fetch_rows(&self, query: &mut Query) -> Result<Vec<Row>> {
        Ok(self.execute(query)?.rows)
    }
}
