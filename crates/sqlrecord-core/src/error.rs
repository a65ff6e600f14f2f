//! Error types for sqlrecord operations.

use std::fmt;

/// The primary error type for all sqlrecord operations.
#[derive(Debug)]
pub enum Error {
    /// A statement could not be built from the supplied fragments
    Builder(BuilderError),
    /// A write statement was rendered against a read-only table
    AccessDenied(AccessError),
    /// Failure reported by the database transport, surfaced unchanged
    Transport(TransportError),
    /// An operation needed a primary key value and none was set
    MissingPrimaryKey { table: String },
    /// Unknown table, property or column
    Schema(SchemaError),
    /// A model rejected a value of the wrong shape
    Type(TypeError),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug, Clone)]
pub struct BuilderError {
    pub kind: BuilderErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderErrorKind {
    /// Number of `?` placeholders differs from the number of bound values
    PlaceholderMismatch,
    /// Positional values where column names are required
    PositionalValues,
    /// A sequence parameter contained another sequence
    NestedSequence,
    /// Page size of zero
    InvalidPageSize,
    /// Construct the target dialect cannot express
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct AccessError {
    pub table: String,
    /// Statement keyword that was refused (INSERT, UPDATE, DELETE)
    pub statement: &'static str,
}

#[derive(Debug)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub sql: Option<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection could not be established or was lost
    Connection,
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Other database error
    Database,
}

#[derive(Debug, Clone)]
pub struct SchemaError {
    pub table: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub property: Option<String>,
}

impl Error {
    /// Create a builder error of the given kind.
    pub fn builder(kind: BuilderErrorKind, message: impl Into<String>) -> Self {
        Error::Builder(BuilderError {
            kind,
            message: message.into(),
        })
    }

    /// Create a transport error, typically from a `Connection` implementation.
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Error::Transport(TransportError {
            kind,
            message: message.into(),
            sql: None,
            source: None,
        })
    }

    /// Create a schema error for an unknown property or column.
    pub fn unknown_property(table: &str, property: &str) -> Self {
        Error::Schema(SchemaError {
            table: table.to_string(),
            message: format!("no column for property '{}'", property),
        })
    }

    /// Builder error kind, if this is a builder error.
    pub fn builder_kind(&self) -> Option<BuilderErrorKind> {
        match self {
            Error::Builder(b) => Some(b.kind),
            _ => None,
        }
    }

    /// Is this an access error raised for a read-only table?
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::AccessDenied(_))
    }

    /// Is this an error reported by the database transport?
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Transport(t) => t.sql.as_deref(),
            _ => None,
        }
    }
}

impl TransportError {
    /// Attach the SQL text that was being executed.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Builder(e) => write!(f, "Builder error: {}", e.message),
            Error::AccessDenied(e) => write!(
                f,
                "Access denied: {} on read-only table '{}'",
                e.statement, e.table
            ),
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::MissingPrimaryKey { table } => {
                write!(f, "Primary key of '{}' has no value", table)
            }
            Error::Schema(e) => write!(f, "Schema error in '{}': {}", e.table, e.message),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sql) = &self.sql {
            write!(f, "{} (while executing: {})", self.message, sql)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(property) = &self.property {
            write!(
                f,
                "expected {} for property '{}', found {}",
                self.expected, property, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl From<BuilderError> for Error {
    fn from(err: BuilderError) -> Self {
        Error::Builder(err)
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Error::AccessDenied(err)
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Transport(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for sqlrecord operations.
pub type Result<T> = std::result::Result<T, Error>;
