//! The `Model` trait.

use crate::record::Record;
use sqlrecord_core::{Connection, Error, FromValue, Result, Table, TypeError, Value, table_for};
use sqlrecord_query::Database;

/// A struct persisted as one row of one table.
///
/// Implementations describe their schema once in [`schema`](Model::schema)
/// and expose their column-backed fields by property name through
/// [`get`](Model::get) and [`set`](Model::set).
///
/// # Example
///
/// ```
/// use sqlrecord_core::{Column, ColumnType, Error, Result, Table, Value};
/// use sqlrecord_model::{Model, decode_field};
///
/// #[derive(Debug, Clone, Default)]
/// struct Tag {
///     id: Option<i64>,
///     label: String,
/// }
///
/// impl Model for Tag {
///     fn schema() -> Table {
///         Table::new("tags")
///             .column(Column::new("id", ColumnType::Integer).primary_key().nullable(true))
///             .column(Column::new("label", ColumnType::String))
///             .auto_increment(true)
///     }
///
///     fn get(&self, property: &str) -> Value {
///         match property {
///             "id" => self.id.into(),
///             "label" => self.label.clone().into(),
///             _ => Value::Null,
///         }
///     }
///
///     fn set(&mut self, property: &str, value: Value) -> Result<()> {
///         match property {
///             "id" => self.id = decode_field(property, &value)?,
///             "label" => self.label = decode_field::<Option<String>>(property, &value)?.unwrap_or_default(),
///             _ => return Err(Error::unknown_property("tags", property)),
///         }
///         Ok(())
///     }
/// }
///
/// assert_eq!(Tag::table().name(), "tags");
/// assert_eq!(Tag::table().column_for("label").unwrap().name, "label");
/// ```
pub trait Model: Default + Clone + Send + Sync + 'static {
    /// Build the table schema. Called at most once per type.
    fn schema() -> Table;

    /// The memoized schema.
    fn table() -> &'static Table {
        table_for::<Self>(Self::schema)
    }

    /// Current value of a column-backed property; NULL for unknown names.
    fn get(&self, property: &str) -> Value;

    /// Assign a column-backed property.
    #[allow(clippy::result_large_err)]
    fn set(&mut self, property: &str, value: Value) -> Result<()>;

    /// Attach related models to a freshly fetched batch.
    ///
    /// Implementations typically run one
    /// [`RelationshipBatch`](crate::RelationshipBatch) per relationship
    /// column. The default loads nothing.
    #[allow(unused_variables, clippy::result_large_err)]
    fn load_relationships<C: Connection>(
        db: &Database<C>,
        records: &mut [Record<Self>],
    ) -> Result<()> {
        Ok(())
    }
}

/// Decode a value for a property, naming the property in type errors.
#[allow(clippy::result_large_err)]
pub fn decode_field<T: FromValue>(property: &str, value: &Value) -> Result<T> {
    T::from_value(value).map_err(|e| match e {
        Error::Type(te) => Error::Type(TypeError {
            property: Some(property.to_string()),
            ..te
        }),
        other => other,
    })
}
