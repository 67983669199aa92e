use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::errors::ModelError;
use crate::services::SqlValue;

/// New company
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 25))]
    pub handle: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub description: String,
    #[validate(url)]
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn check(&self) -> Result<(), ModelError> {
        if self.handle != self.handle.to_lowercase() {
            return Err(ModelError::InvalidArgument(
                "handle must be lowercase".to_string(),
            ));
        }
        non_negative("numEmployees", self.num_employees)
    }
}

/// Partial company update; the handle cannot change
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub num_employees: Option<Option<i32>>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    pub const COLUMNS: &'static [(&'static str, &'static str)] =
        &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

    pub fn check(&self) -> Result<(), ModelError> {
        non_negative("numEmployees", self.num_employees.flatten())
    }

    /// Supplied fields as (logical name, value), in declaration order
    pub fn into_assignments(self) -> Vec<(&'static str, SqlValue)> {
        let mut data = Vec::new();
        if let Some(name) = self.name {
            data.push(("name", SqlValue::Text(name)));
        }
        if let Some(num_employees) = self.num_employees {
            data.push(("numEmployees", SqlValue::nullable_int(num_employees)));
        }
        if let Some(description) = self.description {
            data.push(("description", SqlValue::Text(description)));
        }
        if let Some(logo_url) = self.logo_url {
            data.push(("logoUrl", SqlValue::nullable_text(logo_url)));
        }
        data
    }
}

/// New job posting
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    #[validate(length(min = 1, max = 25))]
    pub company_handle: String,
}

impl NewJob {
    pub fn check(&self) -> Result<(), ModelError> {
        non_negative("salary", self.salary)?;
        equity_in_range(self.equity)
    }
}

/// Partial job update; id and company cannot change
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub equity: Option<Option<Decimal>>,
}

impl JobUpdate {
    pub fn check(&self) -> Result<(), ModelError> {
        non_negative("salary", self.salary.flatten())?;
        equity_in_range(self.equity.flatten())
    }

    pub fn into_assignments(self) -> Vec<(&'static str, SqlValue)> {
        let mut data = Vec::new();
        if let Some(title) = self.title {
            data.push(("title", SqlValue::Text(title)));
        }
        if let Some(salary) = self.salary {
            data.push(("salary", SqlValue::nullable_int(salary)));
        }
        if let Some(equity) = self.equity {
            data.push(("equity", SqlValue::nullable_decimal(equity)));
        }
        data
    }
}

/// New technology tag, also used to rename one
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewTechnology {
    #[validate(length(min = 1, max = 50))]
    pub technology: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TechnologyUpdate {
    #[validate(length(min = 1, max = 50))]
    pub technology: Option<String>,
}

impl TechnologyUpdate {
    pub fn into_assignments(self) -> Vec<(&'static str, SqlValue)> {
        self.technology
            .map(|name| ("technology", SqlValue::Text(name)))
            .into_iter()
            .collect()
    }
}

/// New user, as handed over by the credential layer.
///
/// `password_hash` must already be hashed; it is stored verbatim.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Partial user update.
///
/// `password_hash` is never read from a request body; only the credential
/// layer sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 30))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    #[serde(skip)]
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("isAdmin", "is_admin"),
        ("passwordHash", "password"),
    ];

    pub fn into_assignments(self) -> Vec<(&'static str, SqlValue)> {
        let mut data = Vec::new();
        if let Some(first_name) = self.first_name {
            data.push(("firstName", SqlValue::Text(first_name)));
        }
        if let Some(last_name) = self.last_name {
            data.push(("lastName", SqlValue::Text(last_name)));
        }
        if let Some(email) = self.email {
            data.push(("email", SqlValue::Text(email)));
        }
        if let Some(is_admin) = self.is_admin {
            data.push(("isAdmin", SqlValue::Bool(is_admin)));
        }
        if let Some(password_hash) = self.password_hash {
            data.push(("passwordHash", SqlValue::Text(password_hash)));
        }
        data
    }
}

/// Distinguishes an explicit `null` (Some(None)) from an absent field (None)
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_negative(field: &str, value: Option<i32>) -> Result<(), ModelError> {
    match value {
        Some(v) if v < 0 => Err(ModelError::InvalidArgument(format!(
            "{} must not be negative",
            field
        ))),
        _ => Ok(()),
    }
}

fn equity_in_range(equity: Option<Decimal>) -> Result<(), ModelError> {
    match equity {
        Some(e) if e < Decimal::ZERO || e >= Decimal::ONE => Err(ModelError::InvalidArgument(
            "equity must be at least 0 and below 1".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_job_update_null_vs_absent() {
        let update: JobUpdate = serde_json::from_value(json!({"salary": null})).unwrap();
        assert_eq!(update.salary, Some(None));
        assert_eq!(update.equity, None);

        let data = update.into_assignments();
        assert_eq!(data, vec![("salary", SqlValue::nullable_int(None))]);
    }

    #[test]
    fn test_job_update_rejects_company_change() {
        let result: Result<JobUpdate, _> =
            serde_json::from_value(json!({"companyHandle": "c2"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_equity_range() {
        let mut job = NewJob {
            title: "J".to_string(),
            salary: Some(10),
            equity: Some(Decimal::from_str("0.5").unwrap()),
            company_handle: "c1".to_string(),
        };
        assert!(job.check().is_ok());

        job.equity = Some(Decimal::ONE);
        assert!(matches!(job.check(), Err(ModelError::InvalidArgument(_))));

        job.equity = None;
        job.salary = Some(-1);
        assert!(matches!(job.check(), Err(ModelError::InvalidArgument(_))));
    }

    #[test]
    fn test_company_handle_must_be_lowercase() {
        let mut company = NewCompany {
            handle: "UPPER".to_string(),
            name: "Upper".to_string(),
            num_employees: None,
            description: String::new(),
            logo_url: None,
        };
        assert!(matches!(company.check(), Err(ModelError::InvalidArgument(_))));

        company.handle = "upper".to_string();
        assert!(company.check().is_ok());
    }

    #[test]
    fn test_user_update_ignores_password_in_body() {
        let update: Result<UserUpdate, _> =
            serde_json::from_value(json!({"passwordHash": "plain"}));
        assert!(update.is_err());

        let update: UserUpdate = serde_json::from_value(json!({"firstName": "New"})).unwrap();
        assert!(update.password_hash.is_none());
    }

    #[test]
    fn test_user_update_assignment_order() {
        let update = UserUpdate {
            first_name: Some("A".to_string()),
            is_admin: Some(true),
            ..Default::default()
        };
        let names: Vec<&str> = update.into_assignments().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["firstName", "isAdmin"]);
    }
}
