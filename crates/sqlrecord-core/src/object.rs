//! Custom serializable column values.
//!
//! A serialized-object column stores any type that can write itself to a
//! string and read itself back. The column keeps a zero-value prototype; every
//! parse clones the prototype and lets the clone deserialize the raw string.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value that serializes itself for storage in a single column.
pub trait SqlObject: fmt::Debug + Send + Sync + 'static {
    /// Serialize to the stored string representation.
    fn to_sql_string(&self) -> String;

    /// Replace this instance's state with the given stored representation.
    fn load_sql_string(&mut self, raw: &str);

    /// Clone into a new boxed instance.
    fn boxed_clone(&self) -> Box<dyn SqlObject>;

    /// Access the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a [`SqlObject`] held inside a [`Value`](crate::Value).
///
/// Two handles are equal when they serialize to the same string, which is
/// the comparison dirty tracking needs.
#[derive(Clone)]
pub struct ObjectValue(Arc<dyn SqlObject>);

impl ObjectValue {
    /// Wrap an object.
    pub fn new(object: impl SqlObject) -> Self {
        Self(Arc::new(object))
    }

    /// Wrap an already boxed object.
    pub fn from_boxed(object: Box<dyn SqlObject>) -> Self {
        Self(Arc::from(object))
    }

    /// Serialize the wrapped object.
    pub fn to_sql_string(&self) -> String {
        self.0.to_sql_string()
    }

    /// Downcast to the concrete object type.
    pub fn downcast_ref<T: SqlObject>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Clone a fresh instance of the wrapped object and load `raw` into it.
    pub fn reload_from(&self, raw: &str) -> Self {
        let mut fresh = self.0.boxed_clone();
        fresh.load_sql_string(raw);
        Self::from_boxed(fresh)
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectValue").field(&self.0).finish()
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.to_sql_string() == other.to_sql_string()
    }
}

/// A serialized-object column stored as JSON.
///
/// Malformed JSON leaves the zero value in place: the coercion layer never
/// fails on bad data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonObject<T>(pub T);

impl<T> SqlObject for JsonObject<T>
where
    T: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
{
    fn to_sql_string(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    fn load_sql_string(&mut self, raw: &str) {
        match serde_json::from_str(raw) {
            Ok(value) => self.0 = value,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed JSON column value");
            }
        }
    }

    fn boxed_clone(&self) -> Box<dyn SqlObject> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
