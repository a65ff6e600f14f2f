//! sqlrecord - active-record style mapping between Rust structs and SQL rows.
//!
//! sqlrecord provides:
//!
//! - Static table schemas with camelCase to snake_case column naming
//! - Lossless coercion of typed values to and from database strings
//! - A fluent statement builder with sequence-parameter expansion
//! - Dirty tracking, auto-filled timestamps and upserts on every record
//! - Batch loading of related models with one `IN (...)` query
//!
//! The database itself sits behind the blocking [`Connection`] trait; any
//! driver, or a test double, can implement it.
//!
//! # Quick Start
//!
//! ```
//! use sqlrecord::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Hero {
//!     id: Option<i64>,
//!     name: String,
//!     secret_name: String,
//! }
//!
//! impl Model for Hero {
//!     fn schema() -> Table {
//!         Table::new("heroes")
//!             .column(Column::new("id", ColumnType::Integer).primary_key().nullable(true))
//!             .column(Column::new("name", ColumnType::String))
//!             .column(Column::new("secretName", ColumnType::String))
//!             .auto_increment(true)
//!     }
//!
//!     fn get(&self, property: &str) -> Value {
//!         match property {
//!             "id" => self.id.into(),
//!             "name" => self.name.clone().into(),
//!             "secretName" => self.secret_name.clone().into(),
//!             _ => Value::Null,
//!         }
//!     }
//!
//!     fn set(&mut self, property: &str, value: Value) -> Result<()> {
//!         match property {
//!             "id" => self.id = decode_field(property, &value)?,
//!             "name" => self.name = decode_field(property, &value)?,
//!             "secretName" => self.secret_name = decode_field(property, &value)?,
//!             _ => return Err(Error::unknown_property("heroes", property)),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! /// Accepts every statement and reports id 1 as generated.
//! struct Accepting;
//!
//! impl Connection for Accepting {
//!     fn execute(&self, _sql: &str, _params: &[Value]) -> Result<ExecResult> {
//!         Ok(ExecResult::affected(1).last_insert_id(1))
//!     }
//! }
//!
//! # fn main() -> sqlrecord::Result<()> {
//! let db = Database::new(Accepting);
//!
//! let mut hero = Record::<Hero>::with_values([
//!     ("name", "Spider-Man"),
//!     ("secretName", "Peter Parker"),
//! ])?;
//! hero.create(&db)?;
//! assert_eq!(hero.id, Some(1));
//!
//! hero.name = "Spidey".to_string();
//! assert_eq!(hero.dirty_fields(), vec!["name"]);
//! hero.update(&db)?;
//! assert!(!hero.is_dirty());
//!
//! let (sql, params) = db
//!     .query("heroes")
//!     .set_where("secret_name = ?", params!["Peter Parker"])?
//!     .build()?;
//! assert_eq!(sql, "SELECT * FROM heroes WHERE (secret_name = ?);");
//! assert_eq!(params.len(), 1);
//! # Ok(())
//! # }
//! ```

pub use sqlrecord_core::coerce;
pub use sqlrecord_core::{
    AccessError, AutoMode, BuilderError, BuilderErrorKind, Clock, Column, ColumnInfo, ColumnType,
    Config, Connection, DECIMAL_PRECISION, Dialect, Error, ExecResult, FromValue, JsonObject,
    KeyKind, ObjectValue, Relation, Result, Row, SchemaError, SqlEnum, SqlObject, SystemClock,
    Table, TransportError, TransportErrorKind, TypeError, Value, params, parse_timezone,
    table_for, to_snake_case,
};

pub use sqlrecord_query::{
    Clause, Database, Query, QueryKind, QueryPaginator, Values, bind_value, count_placeholders,
};

pub use sqlrecord_model::{
    AutoApplicator, Model, Record, RelationshipBatch, WriteReason, decode_field,
};

/// Everything needed to declare models and run queries.
///
/// ```
/// use sqlrecord::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AutoMode, Column, ColumnType, Config, Connection, Database, Dialect, Error, ExecResult,
        JsonObject, Model, Query, QueryPaginator, Record, RelationshipBatch, Result, Row, SqlEnum,
        Table, Value, decode_field, params,
    };
}
