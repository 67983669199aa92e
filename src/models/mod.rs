// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Application, Company, CompanyDetail, Job, JobDetail, Qualification, Requirement, Technology, User, UserDetail};
pub use requests::{CompanyUpdate, JobUpdate, NewCompany, NewJob, NewTechnology, NewUser, TechnologyUpdate, UserUpdate};
pub use responses::{ErrorResponse, HealthResponse, MatchedJobsResponse};
