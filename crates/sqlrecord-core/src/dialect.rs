//! SQL dialect differences.
//!
//! Every dialect uses `?` positional placeholders. Dialects differ in how
//! identifiers are quoted and in the engine-specific pieces of INSERT: the
//! ignore-duplicates form and the upsert clause with its "report the id of the
//! touched row" hook.

use crate::error::{BuilderErrorKind, Error, Result};
use std::fmt;
use std::str::FromStr;

/// SQL dialect for generating engine-specific syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// MySQL / MariaDB (backtick identifiers, `ON DUPLICATE KEY UPDATE`)
    #[default]
    Mysql,
    /// PostgreSQL (double-quoted identifiers, `ON CONFLICT`)
    Postgres,
    /// SQLite (double-quoted identifiers, `ON CONFLICT`)
    Sqlite,
}

impl Dialect {
    /// Quote an identifier for this dialect.
    ///
    /// Properly escapes embedded quote characters by doubling them:
    /// - For Postgres/SQLite: `"` becomes `""`
    /// - For MySQL: `` ` `` becomes ``` `` ```
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::Postgres | Dialect::Sqlite => {
                let escaped = name.replace('"', "\"\"");
                format!("\"{}\"", escaped)
            }
            Dialect::Mysql => {
                let escaped = name.replace('`', "``");
                format!("`{}`", escaped)
            }
        }
    }

    /// Leading keywords of an INSERT statement.
    pub const fn insert_keyword(self, ignore: bool) -> &'static str {
        match (self, ignore) {
            (Dialect::Mysql, true) => "INSERT IGNORE INTO",
            (Dialect::Sqlite, true) => "INSERT OR IGNORE INTO",
            _ => "INSERT INTO",
        }
    }

    /// Trailing clause needed for insert-ignore, if the dialect spells it that way.
    pub const fn insert_ignore_suffix(self) -> Option<&'static str> {
        match self {
            Dialect::Postgres => Some("ON CONFLICT DO NOTHING"),
            Dialect::Mysql | Dialect::Sqlite => None,
        }
    }

    /// Opening of the upsert clause.
    ///
    /// `conflict` is the column whose id is reported back; the `ON CONFLICT`
    /// dialects need it as the conflict target.
    #[allow(clippy::result_large_err)]
    pub fn upsert_clause(self, conflict: Option<&str>) -> Result<String> {
        match self {
            Dialect::Mysql => Ok("ON DUPLICATE KEY UPDATE".to_string()),
            Dialect::Postgres | Dialect::Sqlite => match conflict {
                Some(column) => Ok(format!(
                    "ON CONFLICT ({}) DO UPDATE SET",
                    self.quote_identifier(column)
                )),
                None => Err(Error::builder(
                    BuilderErrorKind::Unsupported,
                    format!("{self} upserts need a conflict column"),
                )),
            },
        }
    }

    /// Assignment that makes the engine report `column` of the touched row.
    pub fn last_insert_id_assignment(self, column: &str) -> String {
        let quoted = self.quote_identifier(column);
        match self {
            Dialect::Mysql => format!("{quoted} = LAST_INSERT_ID({quoted})"),
            Dialect::Postgres | Dialect::Sqlite => format!("{quoted} = EXCLUDED.{quoted}"),
        }
    }

    /// `RETURNING` clause appended after an upsert, if the dialect needs one.
    pub fn returning_clause(self, column: &str) -> Option<String> {
        match self {
            Dialect::Mysql => None,
            Dialect::Postgres | Dialect::Sqlite => {
                Some(format!("RETURNING {}", self.quote_identifier(column)))
            }
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        })
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(Error::Custom(format!("unknown SQL dialect '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes() {
        assert_eq!(Dialect::Mysql.quote_identifier("is_active"), "`is_active`");
        assert_eq!(Dialect::Mysql.quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(Dialect::Postgres.quote_identifier("is_active"), "\"is_active\"");
        assert_eq!(Dialect::Sqlite.quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_insert_ignore_forms() {
        assert_eq!(Dialect::Mysql.insert_keyword(true), "INSERT IGNORE INTO");
        assert_eq!(Dialect::Sqlite.insert_keyword(true), "INSERT OR IGNORE INTO");
        assert_eq!(Dialect::Postgres.insert_keyword(true), "INSERT INTO");
        assert_eq!(
            Dialect::Postgres.insert_ignore_suffix(),
            Some("ON CONFLICT DO NOTHING")
        );
        assert_eq!(Dialect::Mysql.insert_keyword(false), "INSERT INTO");
    }

    #[test]
    fn test_upsert_hooks() {
        assert_eq!(
            Dialect::Mysql.upsert_clause(None).unwrap(),
            "ON DUPLICATE KEY UPDATE"
        );
        assert_eq!(
            Dialect::Mysql.last_insert_id_assignment("id"),
            "`id` = LAST_INSERT_ID(`id`)"
        );
        assert_eq!(Dialect::Mysql.returning_clause("id"), None);

        assert_eq!(
            Dialect::Postgres.upsert_clause(Some("id")).unwrap(),
            "ON CONFLICT (\"id\") DO UPDATE SET"
        );
        assert_eq!(
            Dialect::Postgres.last_insert_id_assignment("id"),
            "\"id\" = EXCLUDED.\"id\""
        );
        assert_eq!(
            Dialect::Sqlite.returning_clause("id").as_deref(),
            Some("RETURNING \"id\"")
        );

        let err = Dialect::Postgres.upsert_clause(None).unwrap_err();
        assert_eq!(err.builder_kind(), Some(BuilderErrorKind::Unsupported));
    }

    #[test]
    fn test_parse_dialect() {
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::Mysql);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert!("oracle".parse::<Dialect>().is_err());
        assert_eq!(Dialect::default(), Dialect::Mysql);
    }
}
