use crate::core::sql::{job_filter, partial_update, Criteria};
use crate::errors::ModelError;
use crate::models::{Job, JobDetail, JobUpdate, NewJob, Requirement};

use super::{decode_all, first, ids, QueryExecutor, SqlValue, StorageError, TechnologyStore};

const JOB_COLUMNS: &str =
    r#"id, title, salary, equity, company_handle AS "companyHandle""#;

/// Job postings and their technology requirements
pub struct JobStore<'a, E: QueryExecutor + ?Sized> {
    db: &'a E,
}

impl<'a, E: QueryExecutor + ?Sized> JobStore<'a, E> {
    pub fn new(db: &'a E) -> Self {
        Self { db }
    }

    /// Create a job; the owning company must exist
    pub async fn create(&self, job: NewJob) -> Result<Job, ModelError> {
        job.check()?;

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            JOB_COLUMNS
        );
        let params = [
            SqlValue::Text(job.title),
            SqlValue::nullable_int(job.salary),
            SqlValue::nullable_decimal(job.equity),
            SqlValue::Text(job.company_handle.clone()),
        ];

        match self.db.query(&sql, &params).await {
            Ok(rows) => {
                let created: Job = first(rows)?.ok_or_else(|| {
                    StorageError::Decode("INSERT returned no row".to_string())
                })?;
                tracing::info!("Created job {} for {}", created.id, created.company_handle);
                Ok(created)
            }
            Err(StorageError::ForeignKeyViolation(_)) => Err(ModelError::NotFound(format!(
                "No company: {}",
                job.company_handle
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// All jobs ordered by title, optionally narrowed by
    /// `title`, `minSalary` and `hasEquity`
    pub async fn find_all(&self, criteria: Option<&Criteria>) -> Result<Vec<Job>, ModelError> {
        let filter = match criteria {
            Some(c) if !c.is_empty() => job_filter(c)?,
            _ => Default::default(),
        };

        let sql = format!(
            "SELECT {} FROM jobs {} ORDER BY title",
            JOB_COLUMNS,
            filter.where_clause()
        );
        let rows = self.db.query(&sql, &filter.values).await?;

        Ok(decode_all(rows)?)
    }

    /// A job together with the ids of the technologies it requires
    pub async fn get(&self, id: i32) -> Result<JobDetail, ModelError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let rows = self.db.query(&sql, &[SqlValue::from(id)]).await?;
        let job: Job = first(rows)?.ok_or_else(|| no_job(id))?;

        let technologies = self.requirement_ids(id).await?;

        Ok(JobDetail { job, technologies })
    }

    /// Partial update of title, salary and equity
    pub async fn update(&self, id: i32, data: JobUpdate) -> Result<Job, ModelError> {
        data.check()?;

        let set = partial_update(data.into_assignments(), &[])?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = {} RETURNING {}",
            set.clause,
            set.next_placeholder(),
            JOB_COLUMNS
        );
        let mut params = set.values;
        params.push(SqlValue::from(id));

        let rows = self.db.query(&sql, &params).await?;
        first(rows)?.ok_or_else(|| no_job(id))
    }

    pub async fn remove(&self, id: i32) -> Result<(), ModelError> {
        let rows = self
            .db
            .query("DELETE FROM jobs WHERE id = $1 RETURNING id", &[SqlValue::from(id)])
            .await?;

        if rows.is_empty() {
            return Err(no_job(id));
        }
        tracing::info!("Deleted job {}", id);
        Ok(())
    }

    /// Record that a job requires a technology
    pub async fn require(&self, job_id: i32, tech_id: i32) -> Result<Requirement, ModelError> {
        let result = self
            .db
            .query(
                r#"INSERT INTO requirements (job_id, tech_id)
                   VALUES ($1, $2)
                   RETURNING job_id AS "jobId", tech_id AS "techId""#,
                &[SqlValue::from(job_id), SqlValue::from(tech_id)],
            )
            .await;

        match result {
            Ok(rows) => Ok(first(rows)?.unwrap_or(Requirement { job_id, tech_id })),
            Err(StorageError::UniqueViolation(_)) => Err(ModelError::Conflict(format!(
                "Duplicate requirement for job {} and technology {}",
                job_id, tech_id
            ))),
            Err(StorageError::ForeignKeyViolation(_)) => {
                if !self.exists(job_id).await? {
                    return Err(no_job(job_id));
                }
                if !TechnologyStore::new(self.db).exists(tech_id).await? {
                    return Err(ModelError::NotFound(format!("No technology: {}", tech_id)));
                }
                Err(ModelError::NotFound(format!(
                    "No job {} or no technology {}",
                    job_id, tech_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, id: i32) -> Result<bool, ModelError> {
        let rows = self
            .db
            .query("SELECT id FROM jobs WHERE id = $1", &[SqlValue::from(id)])
            .await?;
        Ok(!rows.is_empty())
    }

    /// Ids of the jobs requiring a technology, ascending
    pub async fn jobs_requiring(&self, tech_id: i32) -> Result<Vec<i32>, ModelError> {
        let rows = self
            .db
            .query(
                r#"SELECT job_id AS "jobId" FROM requirements WHERE tech_id = $1 ORDER BY job_id"#,
                &[SqlValue::from(tech_id)],
            )
            .await?;
        Ok(ids(rows, "jobId")?)
    }

    /// Ids of the technologies a job requires, ascending
    pub async fn requirement_ids(&self, job_id: i32) -> Result<Vec<i32>, ModelError> {
        let rows = self
            .db
            .query(
                r#"SELECT tech_id AS "techId" FROM requirements WHERE job_id = $1 ORDER BY tech_id"#,
                &[SqlValue::from(job_id)],
            )
            .await?;
        Ok(ids(rows, "techId")?)
    }
}

fn no_job(id: i32) -> ModelError {
    ModelError::NotFound(format!("No job: {}", id))
}
