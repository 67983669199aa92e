use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo};
use std::time::Duration;

use super::executor::{QueryExecutor, Row, SqlType, SqlValue, StorageError};

/// PostgreSQL-backed query executor
///
/// Owns the connection pool; every accessor borrows it through the
/// [`QueryExecutor`] trait.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StorageError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StorageError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl QueryExecutor for PostgresClient {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        let query = params.iter().fold(sqlx::query(sql), bind_value);
        let rows = query.fetch_all(&self.pool).await?;

        tracing::trace!("Statement returned {} rows", rows.len());

        rows.iter().map(to_row).collect()
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null(SqlType::Bool) => query.bind(None::<bool>),
        SqlValue::Null(SqlType::Int) => query.bind(None::<i64>),
        SqlValue::Null(SqlType::Text) => query.bind(None::<String>),
        SqlValue::Null(SqlType::Decimal) => query.bind(None::<Decimal>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Decimal(d) => query.bind(*d),
    }
}

/// Convert a driver row into a column map, keeping NUMERIC exact as a string
fn to_row(row: &PgRow) -> Result<Row, StorageError> {
    let mut columns = Map::with_capacity(row.columns().len());

    for column in row.columns() {
        let idx = column.ordinal();
        let value = match column.type_info().name() {
            "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(Value::from),
            "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(Value::from),
            "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::from),
            "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::from),
            "NUMERIC" => row
                .try_get::<Option<Decimal>, _>(idx)?
                .map(|d| Value::String(d.to_string())),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                row.try_get::<Option<String>, _>(idx)?.map(Value::from)
            }
            other => {
                return Err(StorageError::Decode(format!(
                    "unsupported column type {} for {}",
                    other,
                    column.name()
                )))
            }
        };
        columns.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }

    Ok(Row::new(columns))
}
