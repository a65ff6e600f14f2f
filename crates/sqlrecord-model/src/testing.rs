//! Models and a scripted connection shared by the unit tests.

use crate::batch::RelationshipBatch;
use crate::model::{Model, decode_field};
use crate::record::Record;
use chrono::{DateTime, TimeZone, Utc};
use sqlrecord_core::{
    AutoMode, Clock, Column, ColumnType, Config, Connection, Error, ExecResult, Result, Row, Table,
    TransportErrorKind, Value,
};
use sqlrecord_query::Database;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for User {
    fn schema() -> Table {
        Table::new("users")
            .column(Column::new("id", ColumnType::Integer).primary_key().nullable(true))
            .column(Column::new("name", ColumnType::String).default("anonymous"))
            .column(Column::new("email", ColumnType::String).nullable(true))
            .column(
                Column::new("createdAt", ColumnType::DateTime)
                    .nullable(true)
                    .auto(AutoMode::OnCreate),
            )
            .column(
                Column::new("updatedAt", ColumnType::DateTime)
                    .nullable(true)
                    .auto(AutoMode::OnEveryWrite),
            )
            .auto_increment(true)
    }

    fn get(&self, property: &str) -> Value {
        match property {
            "id" => self.id.into(),
            "name" => self.name.clone().into(),
            "email" => self.email.clone().into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, property: &str, value: Value) -> Result<()> {
        match property {
            "id" => self.id = decode_field(property, &value)?,
            "name" => {
                self.name = decode_field::<Option<String>>(property, &value)?.unwrap_or_default()
            }
            "email" => self.email = decode_field(property, &value)?,
            "createdAt" => self.created_at = decode_field(property, &value)?,
            "updatedAt" => self.updated_at = decode_field(property, &value)?,
            _ => return Err(Error::unknown_property("users", property)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub id: Option<i64>,
    pub author_id: Option<i64>,
    pub title: String,
    pub author: Option<User>,
}

impl Model for Post {
    fn schema() -> Table {
        Table::new("posts")
            .column(Column::new("id", ColumnType::Integer).primary_key().nullable(true))
            .column(Column::new("authorId", ColumnType::belongs_to("users")).nullable(true))
            .column(Column::new("title", ColumnType::String))
            .auto_increment(true)
    }

    fn get(&self, property: &str) -> Value {
        match property {
            "id" => self.id.into(),
            "authorId" => self.author_id.into(),
            "title" => self.title.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, property: &str, value: Value) -> Result<()> {
        match property {
            "id" => self.id = decode_field(property, &value)?,
            "authorId" => self.author_id = decode_field(property, &value)?,
            "title" => {
                self.title = decode_field::<Option<String>>(property, &value)?.unwrap_or_default()
            }
            _ => return Err(Error::unknown_property("posts", property)),
        }
        Ok(())
    }

    fn load_relationships<C: Connection>(
        db: &Database<C>,
        records: &mut [Record<Self>],
    ) -> Result<()> {
        let authors =
            RelationshipBatch::<User>::load(db, records.iter().map(|r| r.model()), "authorId")?;
        for (record, author) in records.iter_mut().zip(authors) {
            record.author = author.map(Record::into_inner);
        }
        Ok(())
    }
}

/// A read-only lookup table keyed by a natural string key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Country {
    pub code: String,
    pub name: String,
}

impl Model for Country {
    fn schema() -> Table {
        Table::new("countries")
            .column(Column::new("code", ColumnType::String).primary_key())
            .column(Column::new("name", ColumnType::String))
            .read_only(true)
    }

    fn get(&self, property: &str) -> Value {
        match property {
            "code" => self.code.clone().into(),
            "name" => self.name.clone().into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, property: &str, value: Value) -> Result<()> {
        let text = decode_field::<Option<String>>(property, &value)?.unwrap_or_default();
        match property {
            "code" => self.code = text,
            "name" => self.name = text,
            _ => return Err(Error::unknown_property("countries", property)),
        }
        Ok(())
    }
}

/// Records every statement and answers from a queue of canned replies.
///
/// With an empty queue every statement reports one affected row.
#[derive(Debug, Default)]
pub struct Script {
    log: Mutex<Vec<(String, Vec<Value>)>>,
    replies: Mutex<VecDeque<std::result::Result<ExecResult, &'static str>>>,
}

impl Script {
    pub fn reply(&self, result: ExecResult) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(result));
        self
    }

    pub fn reply_rows(&self, rows: Vec<Row>) -> &Self {
        self.reply(ExecResult::with_rows(rows))
    }

    pub fn fail(&self, message: &'static str) -> &Self {
        self.replies.lock().unwrap().push_back(Err(message));
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }
}

impl Connection for Script {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(Error::transport(TransportErrorKind::Database, message)),
            None => Ok(ExecResult::affected(1)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// MySQL, UTC, clock frozen at [`noon`].
pub fn database() -> Database<Script> {
    Database::with_config(Script::default(), Config::new().clock(FixedClock(noon())))
}

pub fn user_row(id: i64, name: &str, email: Option<&str>) -> Row {
    Row::from_pairs([
        ("id", Some(id.to_string())),
        ("name", Some(name.to_string())),
        ("email", email.map(str::to_string)),
        ("created_at", Some("2024-01-01 08:00:00".to_string())),
        ("updated_at", None),
    ])
}

pub fn post_row(id: i64, author_id: Option<i64>, title: &str) -> Row {
    Row::from_pairs([
        ("id", Some(id.to_string())),
        ("author_id", author_id.map(|a| a.to_string())),
        ("title", Some(title.to_string())),
    ])
}
