//! Models and their persistence lifecycle for sqlrecord.
//!
//! `sqlrecord-model` is the **active-record layer**. It connects user structs
//! to the statement builder in `sqlrecord-query`.
//!
//! # Role In The Architecture
//!
//! - **`Model`**: the trait a struct implements to map onto one table.
//! - **`Record`**: a model plus the snapshot used for dirty tracking, with
//!   create, update, upsert, delete, reload and the `find`/`fetch_*` loaders.
//! - **`AutoApplicator`**: fills auto-managed timestamp columns before writes.
//! - **`RelationshipBatch`**: loads the related models of a whole batch with
//!   one query.

pub mod auto;
pub mod batch;
pub mod fetch;
pub mod model;
pub mod record;

#[cfg(test)]
mod testing;

pub use auto::{AutoApplicator, WriteReason};
pub use batch::RelationshipBatch;
pub use model::{Model, decode_field};
pub use record::Record;
