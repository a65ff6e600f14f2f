//! Core types for sqlrecord.
//!
//! This crate provides the foundations the statement builder and the models
//! are built on:
//!
//! - `Value` and `Row` for data moving to and from the database
//! - `Column`, `ColumnType` and `Table` for resolved schema metadata
//! - `coerce` for converting typed values to and from database strings
//! - `Connection` for the blocking transport seam
//! - `Config`, `Dialect` and `Clock` for per-database settings

pub mod coerce;
pub mod column;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod object;
pub mod row;
pub mod table;
pub mod value;

pub use column::{
    AutoMode, Column, ColumnType, DECIMAL_PRECISION, KeyKind, Relation, SqlEnum, to_snake_case,
};
pub use config::{Clock, Config, SystemClock, parse_timezone};
pub use connection::{Connection, ExecResult};
pub use dialect::Dialect;
pub use error::{
    AccessError, BuilderError, BuilderErrorKind, Error, Result, SchemaError, TransportError,
    TransportErrorKind, TypeError,
};
pub use object::{JsonObject, ObjectValue, SqlObject};
pub use row::{ColumnInfo, Row};
pub use table::{Table, table_for};
pub use value::{FromValue, Value};
