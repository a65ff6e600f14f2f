//! SQL fragments with bound parameters.
//!
//! Every clause the builder accepts (WHERE, HAVING, JOIN, GROUP BY, ORDER BY,
//! raw SET) is a verbatim fragment plus one value per `?`. A sequence value
//! stands for a comma-separated placeholder list and is expanded at render
//! time: `color IN (?)` bound to `["red", "blue"]` renders as
//! `color IN (?,?)` with two parameters.

use chrono::FixedOffset;
use sqlrecord_core::coerce::format_datetime;
use sqlrecord_core::{BuilderErrorKind, Error, Result, Value};

/// A fragment of SQL and the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    fragment: String,
    params: Vec<Value>,
}

impl Clause {
    /// Register a fragment with its values.
    ///
    /// Fails when the number of `?` differs from the number of values, or when
    /// a sequence value contains another sequence. Placeholders are counted
    /// naively, so a literal `?` inside a quoted string counts as well.
    #[allow(clippy::result_large_err)]
    pub fn new(fragment: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        let fragment = fragment.into();
        let placeholders = count_placeholders(&fragment);
        if placeholders != params.len() {
            return Err(Error::builder(
                BuilderErrorKind::PlaceholderMismatch,
                format!(
                    "'{}' has {} placeholder(s) but {} value(s) were bound",
                    fragment,
                    placeholders,
                    params.len()
                ),
            ));
        }
        for param in &params {
            if let Value::Array(items) = param {
                if items.iter().any(|item| matches!(item, Value::Array(_))) {
                    return Err(Error::builder(
                        BuilderErrorKind::NestedSequence,
                        format!("nested sequence bound in '{}'", fragment),
                    ));
                }
            }
        }
        Ok(Self { fragment, params })
    }

    /// A fragment without placeholders.
    pub fn verbatim(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            params: Vec::new(),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Render the fragment, expanding sequences and pushing the bound values
    /// onto `out` in placeholder order.
    pub fn render_into(&self, out: &mut Vec<Value>, tz: FixedOffset) -> String {
        if self.params.is_empty() {
            return self.fragment.clone();
        }

        let mut sql = String::with_capacity(self.fragment.len() + 8);
        let mut params = self.params.iter();
        for c in self.fragment.chars() {
            if c != '?' {
                sql.push(c);
                continue;
            }
            match params.next() {
                Some(Value::Array(items)) if items.is_empty() => {
                    sql.push('?');
                    out.push(Value::Text(String::new()));
                }
                Some(Value::Array(items)) => {
                    sql.push_str(&vec!["?"; items.len()].join(","));
                    out.extend(items.iter().map(|item| bind_value(item, tz)));
                }
                Some(value) => {
                    sql.push('?');
                    out.push(bind_value(value, tz));
                }
                None => sql.push('?'),
            }
        }
        sql
    }
}

/// Number of `?` placeholders in a fragment.
pub fn count_placeholders(fragment: &str) -> usize {
    fragment.matches('?').count()
}

/// Convert a scalar to the form it is bound with.
///
/// Date/time values become text in the configured timezone; everything else
/// is bound unchanged.
pub fn bind_value(value: &Value, tz: FixedOffset) -> Value {
    match value {
        Value::DateTime(dt) => Value::Text(format_datetime(*dt, tz)),
        other => other.clone(),
    }
}
