use crate::core::sql::{company_filter, partial_update, Criteria};
use crate::errors::ModelError;
use crate::models::{Company, CompanyDetail, CompanyUpdate, NewCompany};

use super::{decode_all, first, QueryExecutor, SqlValue, StorageError};

const COMPANY_COLUMNS: &str = r#"handle,
    name,
    num_employees AS "numEmployees",
    description,
    logo_url AS "logoUrl""#;

/// Companies and the jobs they post
pub struct CompanyStore<'a, E: QueryExecutor + ?Sized> {
    db: &'a E,
}

impl<'a, E: QueryExecutor + ?Sized> CompanyStore<'a, E> {
    pub fn new(db: &'a E) -> Self {
        Self { db }
    }

    pub async fn create(&self, company: NewCompany) -> Result<Company, ModelError> {
        company.check()?;
        let name = company.name.clone();

        let sql = format!(
            "INSERT INTO companies (handle, name, num_employees, description, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            COMPANY_COLUMNS
        );
        let params = [
            SqlValue::Text(company.handle.clone()),
            SqlValue::Text(name.clone()),
            SqlValue::nullable_int(company.num_employees),
            SqlValue::Text(company.description),
            SqlValue::nullable_text(company.logo_url),
        ];

        match self.db.query(&sql, &params).await {
            Ok(rows) => first(rows)?.ok_or_else(|| {
                StorageError::Decode("INSERT returned no row".to_string()).into()
            }),
            Err(StorageError::UniqueViolation(constraint)) => {
                Err(duplicate(&constraint, &company.handle, &name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All companies ordered by name, optionally narrowed by
    /// `minEmployees`, `maxEmployees` and `name`
    pub async fn find_all(&self, criteria: Option<&Criteria>) -> Result<Vec<Company>, ModelError> {
        let filter = match criteria {
            Some(c) if !c.is_empty() => company_filter(c)?,
            _ => Default::default(),
        };

        let sql = format!(
            "SELECT {} FROM companies {} ORDER BY name",
            COMPANY_COLUMNS,
            filter.where_clause()
        );
        let rows = self.db.query(&sql, &filter.values).await?;

        Ok(decode_all(rows)?)
    }

    /// A company together with its jobs
    pub async fn get(&self, handle: &str) -> Result<CompanyDetail, ModelError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_COLUMNS);
        let rows = self.db.query(&sql, &[SqlValue::from(handle)]).await?;
        let company: Company = first(rows)?.ok_or_else(|| no_company(handle))?;

        let rows = self
            .db
            .query(
                r#"SELECT id, title, salary, equity, company_handle AS "companyHandle"
                   FROM jobs
                   WHERE company_handle = $1
                   ORDER BY id"#,
                &[SqlValue::from(handle)],
            )
            .await?;
        let jobs = decode_all(rows)?;

        Ok(CompanyDetail { company, jobs })
    }

    pub async fn update(&self, handle: &str, data: CompanyUpdate) -> Result<Company, ModelError> {
        data.check()?;
        let name = data.name.clone().unwrap_or_default();

        let set = partial_update(data.into_assignments(), CompanyUpdate::COLUMNS)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = {} RETURNING {}",
            set.clause,
            set.next_placeholder(),
            COMPANY_COLUMNS
        );
        let mut params = set.values;
        params.push(SqlValue::from(handle));

        match self.db.query(&sql, &params).await {
            Ok(rows) => first(rows)?.ok_or_else(|| no_company(handle)),
            Err(StorageError::UniqueViolation(constraint)) => {
                Err(duplicate(&constraint, handle, &name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a company; its jobs go with it
    pub async fn remove(&self, handle: &str) -> Result<(), ModelError> {
        let rows = self
            .db
            .query(
                "DELETE FROM companies WHERE handle = $1 RETURNING handle",
                &[SqlValue::from(handle)],
            )
            .await?;

        if rows.is_empty() {
            return Err(no_company(handle));
        }
        tracing::info!("Deleted company {}", handle);
        Ok(())
    }
}

/// Names the colliding field from the violated constraint
fn duplicate(constraint: &str, handle: &str, name: &str) -> ModelError {
    if constraint.contains("name") {
        ModelError::Conflict(format!("Duplicate company name: {}", name))
    } else {
        ModelError::Conflict(format!("Duplicate company: {}", handle))
    }
}

fn no_company(handle: &str) -> ModelError {
    ModelError::NotFound(format!("No company: {}", handle))
}
