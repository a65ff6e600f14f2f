//! The database transport seam.
//!
//! sqlrecord never talks to a database directly. Everything it needs is one
//! blocking call: run this SQL with these positional parameters and report
//! back. Driver crates (or test doubles) implement [`Connection`].

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// Outcome of one executed statement.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Rows changed by an INSERT, UPDATE or DELETE
    pub rows_affected: u64,
    /// Id generated (or reported through `LAST_INSERT_ID` / `RETURNING`)
    pub last_insert_id: Option<i64>,
    /// Rows returned by a SELECT
    pub rows: Vec<Row>,
}

impl ExecResult {
    /// Result of a statement that returned rows.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows_affected: 0,
            last_insert_id: None,
            rows,
        }
    }

    /// Result of a write statement.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    /// Set the generated id.
    pub fn last_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = Some(id);
        self
    }

    /// First returned row, if any.
    pub fn first_row(&self) -> Option<&Row> {
        self.rows.first()
    }
}

/// A blocking database connection.
///
/// `params` holds exactly one value per `?` in `sql`, in order. Arrays and
/// date/time values have already been expanded and formatted; implementations
/// only ever see scalars. Transport failures are returned as
/// [`Error::Transport`](crate::Error::Transport) and surfaced unchanged.
pub trait Connection: Send + Sync {
    #[allow(clippy::result_large_err)]
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        (**self).execute(sql, params)
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        (**self).execute(sql, params)
    }
}

impl<C: Connection + ?Sized> Connection for std::sync::Arc<C> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        (**self).execute(sql, params)
    }
}
