//! Column definitions.
//!
//! A [`Column`] maps one model property to one database column. Its
//! [`ColumnType`] is fixed when the table is built and drives every conversion
//! between typed values and the strings the database exchanges.

use crate::coerce;
use crate::object::ObjectValue;
use crate::value::Value;
use chrono::FixedOffset;

/// Number of fractional digits a decimal column is written with.
pub const DECIMAL_PRECISION: usize = 4;

/// When the auto-applicator fills a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoMode {
    /// Never filled automatically.
    #[default]
    None,
    /// Filled with the current time on every write, but only if empty.
    OnCreate,
    /// Overwritten with the current time on every write.
    OnEveryWrite,
}

/// Type of the primary key a relationship column points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Integer,
    String,
}

/// Target of a relationship column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Table of the related model
    pub target: &'static str,
    /// Type of the related model's primary key
    pub key_kind: KeyKind,
}

/// Declared type of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    /// Free text; also the fallback for anything not listed below
    String,
    Integer,
    /// Fixed-point number written with [`DECIMAL_PRECISION`] places
    Decimal,
    Boolean,
    DateTime,
    /// String-backed enumeration; holds every allowed backing value
    Enum(&'static [&'static str]),
    /// Custom object; holds the zero-value prototype cloned for every parse
    Serialized(ObjectValue),
    /// Foreign key to another model
    Relationship(Relation),
}

impl ColumnType {
    /// Enum column for a [`SqlEnum`] type.
    pub fn enumeration<E: SqlEnum>() -> Self {
        ColumnType::Enum(E::BACKING)
    }

    /// Serialized-object column with the given zero value.
    pub fn serialized(prototype: impl crate::object::SqlObject) -> Self {
        ColumnType::Serialized(ObjectValue::new(prototype))
    }

    /// Relationship column pointing at an integer-keyed table.
    pub const fn belongs_to(target: &'static str) -> Self {
        ColumnType::Relationship(Relation {
            target,
            key_kind: KeyKind::Integer,
        })
    }

    /// Relationship column pointing at a string-keyed table.
    pub const fn belongs_to_keyed_by_string(target: &'static str) -> Self {
        ColumnType::Relationship(Relation {
            target,
            key_kind: KeyKind::String,
        })
    }

    /// Short name used in log output.
    pub const fn name(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::DateTime => "datetime",
            ColumnType::Enum(_) => "enum",
            ColumnType::Serialized(_) => "serialized",
            ColumnType::Relationship(_) => "relationship",
        }
    }
}

/// A string-backed enumeration stored in an enum column.
///
/// ```
/// use sqlrecord_core::{SqlEnum, Value};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color { Red, Green }
///
/// impl SqlEnum for Color {
///     const BACKING: &'static [&'static str] = &["red", "green"];
///
///     fn backing(&self) -> &'static str {
///         match self {
///             Color::Red => "red",
///             Color::Green => "green",
///         }
///     }
///
///     fn from_backing(raw: &str) -> Option<Self> {
///         match raw {
///             "red" => Some(Color::Red),
///             "green" => Some(Color::Green),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Color::Green.to_value(), Value::Text("green".into()));
/// assert_eq!(Color::from_value(&Value::Text("red".into())), Some(Color::Red));
/// assert_eq!(Color::from_value(&Value::Text("blue".into())), None);
/// ```
pub trait SqlEnum: Sized {
    /// Every backing value, in declaration order.
    const BACKING: &'static [&'static str];

    /// Backing value of this case.
    fn backing(&self) -> &'static str;

    /// Reverse lookup by backing value.
    fn from_backing(raw: &str) -> Option<Self>;

    fn to_value(&self) -> Value {
        Value::Text(self.backing().to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(Self::from_backing)
    }
}

/// Mapping of one model property to one database column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Property name on the model
    pub property: &'static str,
    /// Database column name
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Value a fresh record starts with
    pub default: Option<Value>,
    pub auto: AutoMode,
    pub primary_key: bool,
}

impl Column {
    /// Create a column whose name is derived from the property name.
    pub fn new(property: &'static str, column_type: ColumnType) -> Self {
        Self {
            property,
            name: to_snake_case(property),
            column_type,
            nullable: false,
            default: None,
            auto: AutoMode::None,
            primary_key: false,
        }
    }

    /// Override the derived column name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set nullable flag.
    pub fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set default value.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set auto-fill mode.
    pub fn auto(mut self, mode: AutoMode) -> Self {
        self.auto = mode;
        self
    }

    /// Mark this column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Decimal places, for decimal columns.
    pub fn precision(&self) -> Option<usize> {
        matches!(self.column_type, ColumnType::Decimal).then_some(DECIMAL_PRECISION)
    }

    /// Value a fresh record holds before any initial values are applied.
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self.column_type, ColumnType::Relationship(_))
    }

    /// Format a typed value for the database.
    pub fn format(&self, value: &Value, tz: FixedOffset) -> Option<String> {
        coerce::format(value, &self.column_type, self.nullable, tz)
    }

    /// Parse a database string into a typed value.
    pub fn parse(&self, raw: Option<&str>, tz: FixedOffset) -> Value {
        coerce::parse(raw, &self.column_type, tz)
    }
}

/// Convert a property name to its column name.
///
/// Word boundaries are a lowercase-to-uppercase transition, the last capital of
/// an acronym followed by a lowercase letter, and a digit followed by an
/// uppercase letter. Already snake_cased input is returned unchanged.
///
/// ```
/// use sqlrecord_core::to_snake_case;
///
/// assert_eq!(to_snake_case("mySimpleName"), "my_simple_name");
/// assert_eq!(to_snake_case("HTMLParser"), "html_parser");
/// assert_eq!(to_snake_case("TEST123String"), "test123_string");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next = chars.get(i + 1).copied();

                let should_underscore = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase()));

                if should_underscore && !result.ends_with('_') {
                    result.push('_');
                }
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}
