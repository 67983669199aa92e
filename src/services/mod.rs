// Service exports
pub mod companies;
pub mod executor;
pub mod jobs;
pub mod postgres;
pub mod technologies;
pub mod users;

pub use companies::CompanyStore;
pub use executor::{decode_all, QueryExecutor, Row, SqlType, SqlValue, StorageError};
pub use jobs::JobStore;
pub use postgres::PostgresClient;
pub use technologies::TechnologyStore;
pub use users::UserStore;

use serde::de::DeserializeOwned;

/// Decode the first row, if any
pub(crate) fn first<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Option<T>, StorageError> {
    rows.into_iter().next().map(Row::decode).transpose()
}

/// Read a single integer column from every row
pub(crate) fn ids(rows: Vec<Row>, column: &str) -> Result<Vec<i32>, StorageError> {
    rows.iter().map(|row| row.get::<i32>(column)).collect()
}
