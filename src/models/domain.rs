use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Company record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: String,
    pub logo_url: Option<String>,
}

/// Company with the jobs it has posted
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

/// Job posting
///
/// Equity travels as an exact decimal and serializes as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Job with the ids of the technologies it requires
#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub technologies: Vec<i32>,
}

/// Skill tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub id: i32,
    pub technology: String,
}

/// Person as seen by every read path; the password column is never selected
/// into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// User with the jobs applied to and the technologies qualified in
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
    pub qualifications: Vec<i32>,
}

/// Job x Technology edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub job_id: i32,
    pub tech_id: i32,
}

/// User x Technology edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qualification {
    pub username: String,
    pub tech_id: i32,
}

/// User x Job edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub username: String,
    pub job_id: i32,
}
