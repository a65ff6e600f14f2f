//! The statement builder.
//!
//! A [`Query`] accumulates the pieces of one statement and renders them into
//! SQL text plus a flat list of positional parameters. Builder methods consume
//! and return the query; methods that register a fragment with bound values
//! validate the placeholder count immediately and return `Result<Self>`.
//!
//! ```
//! use sqlrecord_core::{Value, params};
//! use sqlrecord_query::Query;
//!
//! let (sql, params) = Query::new("fruits")
//!     .delete()
//!     .and_where("type = ?", params!["apple"])?
//!     .and_where("color IN (?)", params![vec!["red", "green"]])?
//!     .and_where("tastes_nice = 1", params![])?
//!     .build()?;
//!
//! assert_eq!(
//!     sql,
//!     "DELETE FROM fruits WHERE (type = ?) AND (color IN (?,?)) AND (tastes_nice = 1);"
//! );
//! assert_eq!(params.len(), 3);
//! # Ok::<(), sqlrecord_core::Error>(())
//! ```

use crate::clause::{Clause, bind_value};
use chrono::{FixedOffset, Offset, Utc};
use indexmap::IndexMap;
use sqlrecord_core::{AccessError, BuilderErrorKind, Config, Dialect, Error, Result, Value};

/// Statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryKind {
    #[default]
    Select,
    Insert,
    InsertIgnore,
    Update,
    Delete,
}

impl QueryKind {
    /// Leading keyword, as reported in access errors.
    pub const fn keyword(self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert | QueryKind::InsertIgnore => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
        }
    }

    /// Does this statement write to the table?
    pub const fn is_write(self) -> bool {
        !matches!(self, QueryKind::Select)
    }

    const fn is_insert(self) -> bool {
        matches!(self, QueryKind::Insert | QueryKind::InsertIgnore)
    }
}

/// Values for an INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Column name to value, in insertion order
    Named(IndexMap<String, Value>),
    /// Bare values for `INSERT ... VALUES (...)`
    Positional(Vec<Value>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Named(map) => map.len(),
            Values::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<IndexMap<String, Value>> for Values {
    fn from(map: IndexMap<String, Value>) -> Self {
        Values::Named(map)
    }
}

impl From<Vec<Value>> for Values {
    fn from(values: Vec<Value>) -> Self {
        Values::Positional(values)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Values {
    fn from(pairs: [(K, V); N]) -> Self {
        Values::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// SET data: structured values or a raw fragment, never both.
#[derive(Debug, Clone, PartialEq)]
enum SetData {
    Values(Values),
    Raw(Clause),
}

/// Assignments applied when an INSERT hits an existing key.
#[derive(Debug, Clone, PartialEq, Default)]
struct OnDuplicate {
    values: IndexMap<String, Value>,
    last_insert_id_from: Option<String>,
}

/// A statement in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    kind: QueryKind,
    table: String,
    projection: String,
    set: Option<SetData>,
    on_duplicate: Option<OnDuplicate>,
    joins: Vec<Clause>,
    wheres: Vec<Clause>,
    group_by: Option<Clause>,
    havings: Vec<Clause>,
    order_by: Option<Clause>,
    limit: Option<u64>,
    offset: Option<u64>,
    read_only: bool,
    dialect: Dialect,
    timezone: FixedOffset,
    params: Vec<Value>,
}

impl Query {
    /// Start a `SELECT *` against a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Select,
            table: table.into(),
            projection: "*".to_string(),
            set: None,
            on_duplicate: None,
            joins: Vec::new(),
            wheres: Vec::new(),
            group_by: None,
            havings: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
            read_only: false,
            dialect: Dialect::default(),
            timezone: Utc.fix(),
            params: Vec::new(),
        }
    }

    /// Apply a database's dialect and timezone.
    pub fn configured(self, config: &Config) -> Self {
        self.dialect(config.dialect).timezone(config.timezone)
    }

    /// Set the SQL dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the timezone date/time parameters are bound in.
    pub fn timezone(mut self, tz: FixedOffset) -> Self {
        self.timezone = tz;
        self
    }

    /// Refuse to render write statements.
    pub fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    // ==================== Statement kind ====================

    /// Turn into a SELECT with the given projection.
    pub fn select(mut self, projection: impl Into<String>) -> Self {
        self.kind = QueryKind::Select;
        self.projection = projection.into();
        self
    }

    /// Turn into `SELECT COUNT(column)`.
    pub fn count(self, column: &str) -> Self {
        self.select(format!("COUNT({})", column))
    }

    pub fn insert(mut self) -> Self {
        self.kind = QueryKind::Insert;
        self
    }

    /// INSERT that silently skips rows hitting a unique key.
    pub fn insert_ignore(mut self) -> Self {
        self.kind = QueryKind::InsertIgnore;
        self
    }

    pub fn update(mut self) -> Self {
        self.kind = QueryKind::Update;
        self
    }

    pub fn delete(mut self) -> Self {
        self.kind = QueryKind::Delete;
        self
    }

    // ==================== SET / VALUES ====================

    /// Replace the SET data with structured values.
    pub fn values(mut self, values: impl Into<Values>) -> Self {
        self.set = Some(SetData::Values(values.into()));
        self
    }

    /// Set one named value, switching out of raw mode if needed.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        match &mut self.set {
            Some(SetData::Values(Values::Named(map))) => {
                map.insert(column.into(), value.into());
            }
            _ => {
                let mut map = IndexMap::new();
                map.insert(column.into(), value.into());
                self.set = Some(SetData::Values(Values::Named(map)));
            }
        }
        self
    }

    /// Replace the SET data with a raw fragment, e.g. `views = views + ?`.
    #[allow(clippy::result_large_err)]
    pub fn raw_update(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        self.set = Some(SetData::Raw(Clause::new(fragment, params)?));
        Ok(self)
    }

    /// Assignments for rows that already exist (upsert).
    ///
    /// `last_insert_id_from` names the column whose value the database should
    /// report back for the touched row.
    pub fn on_duplicate_key_update(
        mut self,
        values: IndexMap<String, Value>,
        last_insert_id_from: Option<&str>,
    ) -> Self {
        self.on_duplicate = Some(OnDuplicate {
            values,
            last_insert_id_from: last_insert_id_from.map(str::to_string),
        });
        self
    }

    // ==================== Clauses ====================

    /// Add a JOIN fragment, e.g. `LEFT JOIN colors c ON c.id = f.color_id`.
    ///
    /// Joins render directly after the statement header, before SET, VALUES
    /// and ON DUPLICATE KEY UPDATE, which is where MySQL's multi-table UPDATE
    /// expects them. Their parameters bind ahead of the SET parameters.
    #[allow(clippy::result_large_err)]
    pub fn join(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        self.joins.push(Clause::new(fragment, params)?);
        Ok(self)
    }

    /// Replace all WHERE clauses with one.
    #[allow(clippy::result_large_err)]
    pub fn set_where(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        self.wheres = vec![Clause::new(fragment, params)?];
        Ok(self)
    }

    /// Add a WHERE clause, ANDed with the existing ones.
    #[allow(clippy::result_large_err)]
    pub fn and_where(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        self.wheres.push(Clause::new(fragment, params)?);
        Ok(self)
    }

    /// Replace all HAVING clauses with one.
    #[allow(clippy::result_large_err)]
    pub fn set_having(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        self.havings = vec![Clause::new(fragment, params)?];
        Ok(self)
    }

    /// Add a HAVING clause, ANDed with the existing ones.
    #[allow(clippy::result_large_err)]
    pub fn and_having(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        self.havings.push(Clause::new(fragment, params)?);
        Ok(self)
    }

    #[allow(clippy::result_large_err)]
    pub fn group_by(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        self.group_by = Some(Clause::new(fragment, params)?);
        Ok(self)
    }

    #[allow(clippy::result_large_err)]
    pub fn order_by(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        self.order_by = Some(Clause::new(fragment, params)?);
        Ok(self)
    }

    pub fn without_order_by(mut self) -> Self {
        self.order_by = None;
        self
    }

    /// Set LIMIT; zero means no limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET; zero means no offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Drop LIMIT and OFFSET.
    pub fn without_limit(mut self) -> Self {
        self.limit = None;
        self.offset = None;
        self
    }

    // ==================== Accessors ====================

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn get_dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parameters bound by the last [`render`](Self::render).
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    // ==================== Rendering ====================

    /// Render the statement.
    ///
    /// The parameter list is rebuilt from scratch on every call and can be
    /// read back with [`params`](Self::params).
    #[tracing::instrument(level = "trace", skip(self), fields(table = %self.table, kind = ?self.kind))]
    #[allow(clippy::result_large_err)]
    pub fn render(&mut self) -> Result<String> {
        self.params.clear();

        if self.read_only && self.kind.is_write() {
            return Err(AccessError {
                table: self.table.clone(),
                statement: self.kind.keyword(),
            }
            .into());
        }

        let tz = self.timezone;
        let mut params = Vec::new();
        let mut parts: Vec<String> = Vec::new();

        parts.push(match self.kind {
            QueryKind::Select => format!("SELECT {} FROM {}", self.projection, self.table),
            QueryKind::Insert | QueryKind::InsertIgnore => format!(
                "{} {}",
                self.dialect
                    .insert_keyword(self.kind == QueryKind::InsertIgnore),
                self.table
            ),
            QueryKind::Update => format!("UPDATE {}", self.table),
            QueryKind::Delete => format!("DELETE FROM {}", self.table),
        });

        for join in &self.joins {
            parts.push(join.render_into(&mut params, tz));
        }

        if matches!(self.kind, QueryKind::Update) || self.kind.is_insert() {
            if let Some(set) = self.render_set(&mut params)? {
                parts.push(set);
            }
        }

        if self.kind == QueryKind::InsertIgnore {
            if let Some(suffix) = self.dialect.insert_ignore_suffix() {
                parts.push(suffix.to_string());
            }
        }

        if self.kind.is_insert() {
            parts.extend(self.render_on_duplicate(&mut params)?);
        }

        if !self.wheres.is_empty() {
            parts.push(format!(
                "WHERE {}",
                render_conditions(&self.wheres, &mut params, tz)
            ));
        }

        if let Some(group_by) = &self.group_by {
            parts.push(format!("GROUP BY {}", group_by.render_into(&mut params, tz)));
        }

        if !self.havings.is_empty() {
            parts.push(format!(
                "HAVING {}",
                render_conditions(&self.havings, &mut params, tz)
            ));
        }

        if let Some(order_by) = &self.order_by {
            parts.push(format!("ORDER BY {}", order_by.render_into(&mut params, tz)));
        }

        if let Some(limit) = self.limit.filter(|&n| n > 0) {
            parts.push(format!("LIMIT {}", limit));
        }
        if let Some(offset) = self.offset.filter(|&n| n > 0) {
            parts.push(format!("OFFSET {}", offset));
        }

        let mut sql = parts.join(" ");
        sql.push(';');

        tracing::trace!(sql = %sql, params = params.len(), "rendered statement");
        self.params = params;
        Ok(sql)
    }

    /// Render and hand over the SQL with its parameters.
    #[allow(clippy::result_large_err)]
    pub fn build(mut self) -> Result<(String, Vec<Value>)> {
        let sql = self.render()?;
        Ok((sql, self.params))
    }

    #[allow(clippy::result_large_err)]
    fn render_set(&self, params: &mut Vec<Value>) -> Result<Option<String>> {
        let tz = self.timezone;
        let Some(set) = &self.set else {
            return Ok(None);
        };

        let sql = match set {
            SetData::Raw(clause) => format!("SET {}", clause.render_into(params, tz)),
            SetData::Values(Values::Named(map)) if self.kind == QueryKind::Update => {
                let assignments = map
                    .iter()
                    .map(|(column, value)| {
                        params.push(self.bind_set_value(column, value)?);
                        Ok(format!("{} = ?", self.dialect.quote_identifier(column)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                format!("SET {}", assignments.join(", "))
            }
            SetData::Values(Values::Positional(_)) if self.kind == QueryKind::Update => {
                return Err(Error::builder(
                    BuilderErrorKind::PositionalValues,
                    format!("UPDATE {} needs column names for its values", self.table),
                ));
            }
            SetData::Values(Values::Named(map)) => {
                let mut columns = Vec::with_capacity(map.len());
                for (column, value) in map {
                    params.push(self.bind_set_value(column, value)?);
                    columns.push(self.dialect.quote_identifier(column));
                }
                format!(
                    "({}) VALUES ({})",
                    columns.join(", "),
                    vec!["?"; map.len()].join(", ")
                )
            }
            SetData::Values(Values::Positional(values)) => {
                for value in values {
                    params.push(self.bind_set_value("?", value)?);
                }
                format!("VALUES ({})", vec!["?"; values.len()].join(", "))
            }
        };
        Ok(Some(sql))
    }

    #[allow(clippy::result_large_err)]
    fn render_on_duplicate(&self, params: &mut Vec<Value>) -> Result<Vec<String>> {
        let Some(on_duplicate) = &self.on_duplicate else {
            return Ok(Vec::new());
        };
        let marker = on_duplicate.last_insert_id_from.as_deref();
        if marker.is_none() && on_duplicate.values.is_empty() {
            return Ok(Vec::new());
        }

        let mut assignments = Vec::with_capacity(on_duplicate.values.len() + 1);
        if let Some(column) = marker {
            assignments.push(self.dialect.last_insert_id_assignment(column));
        }
        for (column, value) in &on_duplicate.values {
            params.push(self.bind_set_value(column, value)?);
            assignments.push(format!("{} = ?", self.dialect.quote_identifier(column)));
        }

        let mut parts = vec![format!(
            "{} {}",
            self.dialect.upsert_clause(marker)?,
            assignments.join(", ")
        )];
        if let Some(returning) = marker.and_then(|column| self.dialect.returning_clause(column)) {
            parts.push(returning);
        }
        Ok(parts)
    }

    #[allow(clippy::result_large_err)]
    fn bind_set_value(&self, column: &str, value: &Value) -> Result<Value> {
        if matches!(value, Value::Array(_)) {
            return Err(Error::builder(
                BuilderErrorKind::Unsupported,
                format!("sequence value for column {} of {}", column, self.table),
            ));
        }
        Ok(bind_value(value, self.timezone))
    }
}

fn render_conditions(clauses: &[Clause], params: &mut Vec<Value>, tz: FixedOffset) -> String {
    clauses
        .iter()
        .map(|clause| format!("({})", clause.render_into(params, tz)))
        .collect::<Vec<_>>()
        .join(" AND ")
}
