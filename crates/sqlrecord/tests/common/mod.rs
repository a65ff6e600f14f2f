//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlrecord::{Clock, Connection, Error, ExecResult, Result, Row, TransportErrorKind, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// Records every statement and answers from a queue of canned replies.
///
/// COUNT queries are answered with `count` when it is set. With an empty
/// queue every other statement reports one affected row.
#[derive(Debug, Default)]
pub struct Script {
    log: Mutex<Vec<(String, Vec<Value>)>>,
    replies: Mutex<VecDeque<Result<ExecResult>>>,
    count: Option<u64>,
}

impl Script {
    pub fn counting(total: u64) -> Self {
        Self {
            count: Some(total),
            ..Self::default()
        }
    }

    pub fn reply(&self, result: ExecResult) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(result));
        self
    }

    pub fn reply_rows(&self, rows: Vec<Row>) -> &Self {
        self.reply(ExecResult::with_rows(rows))
    }

    pub fn fail(&self, kind: TransportErrorKind, message: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(Error::transport(kind, message)));
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
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
        if let Some(total) = self.count.filter(|_| sql.starts_with("SELECT COUNT(")) {
            return Ok(ExecResult::with_rows(vec![Row::from_pairs([(
                "count",
                Some(total.to_string()),
            )])]));
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ExecResult::affected(1)))
    }
}

/// A clock that moves forward one second every time it is read.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        self.start + Duration::seconds(self.ticks.fetch_add(1, Ordering::SeqCst))
    }
}

pub fn start_of_2024() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Turn bound parameters back into the raw strings a database would return.
pub fn as_row(columns: &[&str], params: &[Value]) -> Row {
    Row::from_pairs(
        columns
            .iter()
            .zip(params)
            .map(|(name, value)| (name.to_string(), value.as_str().map(str::to_string))),
    )
}
