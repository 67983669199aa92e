//! Jobly - job board backend
//!
//! Stores companies, jobs, users and technology tags, and recommends to each
//! user the jobs whose technology requirements exactly match the user's
//! declared qualifications.

pub mod config;
pub mod core;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{exact_matches, Matcher};
pub use errors::{ApiError, ModelError};
pub use services::{QueryExecutor, Row, SqlValue, StorageError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        assert_eq!(exact_matches(&[1, 2], vec![(7, vec![2, 1])]), vec![7]);
    }
}
