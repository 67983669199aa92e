// Scripted query executor shared by the integration suites

#![allow(dead_code)]

use async_trait::async_trait;
use jobly::services::{QueryExecutor, Row, SqlValue, StorageError};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned replies in order and records every statement it receives
#[derive(Default)]
pub struct MockExecutor {
    replies: Mutex<VecDeque<Result<Vec<Row>, StorageError>>>,
    calls: Mutex<Vec<(String, Vec<SqlValue>)>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply; each value must be a JSON object
    pub fn reply(self, rows: Vec<Value>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(rows.into_iter().map(row).collect()));
        self
    }

    /// Queue an empty result set
    pub fn empty(self) -> Self {
        self.reply(vec![])
    }

    pub fn fail(self, err: StorageError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected statement: {}", sql))
    }
}

pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => Row::new(map),
        other => panic!("row must be a JSON object, got {}", other),
    }
}

/// Collapse whitespace so multi-line SQL can be compared
pub fn squash(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
