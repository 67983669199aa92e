// Core algorithm exports
pub mod matcher;
pub mod sql;

pub use matcher::{exact_matches, Matcher};
pub use sql::{company_filter, job_filter, partial_update, Criteria, Fragment};
