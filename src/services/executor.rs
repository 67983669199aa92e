use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced by a query executor
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return StorageError::UniqueViolation(constraint)
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return StorageError::ForeignKeyViolation(constraint)
                }
                _ => {}
            }
        }
        StorageError::Database(err)
    }
}

/// Column types a NULL parameter can be bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Bool,
    Int,
    Text,
    Decimal,
}

/// A positional statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(SqlType),
    Bool(bool),
    Int(i64),
    Text(String),
    Decimal(Decimal),
}

impl SqlValue {
    pub fn nullable_int(value: Option<i32>) -> Self {
        value.map_or(SqlValue::Null(SqlType::Int), |v| SqlValue::Int(v.into()))
    }

    pub fn nullable_text(value: Option<String>) -> Self {
        value.map_or(SqlValue::Null(SqlType::Text), SqlValue::Text)
    }

    pub fn nullable_decimal(value: Option<Decimal>) -> Self {
        value.map_or(SqlValue::Null(SqlType::Decimal), SqlValue::Decimal)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        SqlValue::Decimal(value)
    }
}

/// A result row keyed by column name (or alias)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new(columns: Map<String, Value>) -> Self {
        Self(columns)
    }

    /// Read a single column
    pub fn get<T: DeserializeOwned>(&self, column: &str) -> Result<T, StorageError> {
        let value = self
            .0
            .get(column)
            .cloned()
            .ok_or_else(|| StorageError::Decode(format!("missing column {}", column)))?;
        serde_json::from_value(value)
            .map_err(|e| StorageError::Decode(format!("column {}: {}", column, e)))
    }

    /// Decode the whole row into a record keyed by column alias
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StorageError> {
        serde_json::from_value(Value::Object(self.0)).map_err(|e| StorageError::Decode(e.to_string()))
    }
}

impl From<Map<String, Value>> for Row {
    fn from(columns: Map<String, Value>) -> Self {
        Self(columns)
    }
}

/// Submit a parameterized statement and get back its rows.
///
/// Statements use `$n` positional placeholders bound from `params` in order.
/// Statements without a result set return an empty vector.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError>;
}

/// Decode every row into `T`
pub fn decode_all<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StorageError> {
    rows.into_iter().map(Row::decode).collect()
}
