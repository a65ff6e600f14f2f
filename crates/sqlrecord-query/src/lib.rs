//! Statement builder for sqlrecord.
//!
//! `sqlrecord-query` is the **statement construction layer**. It turns verbatim
//! SQL fragments and bound values into one SQL string plus a flat list of `?`
//! parameters.
//!
//! # Role In The Architecture
//!
//! - **`Query`**: fluent SELECT/INSERT/UPDATE/DELETE builder with WHERE,
//!   HAVING, JOIN, GROUP BY, ORDER BY, LIMIT and OFFSET.
//! - **`Clause`**: one fragment with its values; sequence values expand into
//!   placeholder lists.
//! - **`Database`**: a `Connection` plus the `Config` statements render with.
//! - **`QueryPaginator`**: page arithmetic over any SELECT.
//!
//! Most users access these through the `sqlrecord` facade crate.

pub mod clause;
pub mod database;
pub mod paginator;
pub mod query;

pub use clause::{Clause, bind_value, count_placeholders};
pub use database::Database;
pub use paginator::QueryPaginator;
pub use query::{Query, QueryKind, Values};
