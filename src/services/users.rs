use crate::core::sql::partial_update;
use crate::errors::ModelError;
use crate::models::{Application, NewUser, Qualification, User, UserDetail, UserUpdate};

use super::{decode_all, first, ids, JobStore, QueryExecutor, SqlValue, StorageError, TechnologyStore};

/// Every read selects these columns; `password` is deliberately absent.
const USER_COLUMNS: &str = r#"username,
    first_name AS "firstName",
    last_name AS "lastName",
    email,
    is_admin AS "isAdmin""#;

/// People, their applications and their qualifications
pub struct UserStore<'a, E: QueryExecutor + ?Sized> {
    db: &'a E,
}

impl<'a, E: QueryExecutor + ?Sized> UserStore<'a, E> {
    pub fn new(db: &'a E) -> Self {
        Self { db }
    }

    /// Store a new user with an already-hashed password
    pub async fn register(&self, user: NewUser) -> Result<User, ModelError> {
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            USER_COLUMNS
        );
        let params = [
            SqlValue::Text(user.username.clone()),
            SqlValue::Text(user.password_hash),
            SqlValue::Text(user.first_name),
            SqlValue::Text(user.last_name),
            SqlValue::Text(user.email),
            SqlValue::Bool(user.is_admin),
        ];

        match self.db.query(&sql, &params).await {
            Ok(rows) => {
                let created: User = first(rows)?.ok_or_else(|| {
                    StorageError::Decode("INSERT returned no row".to_string())
                })?;
                tracing::info!("Registered user {}", created.username);
                Ok(created)
            }
            Err(StorageError::UniqueViolation(_)) => Err(ModelError::Conflict(format!(
                "Duplicate username: {}",
                user.username
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<User>, ModelError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        let rows = self.db.query(&sql, &[]).await?;
        Ok(decode_all(rows)?)
    }

    /// A user with applied job ids and qualified technology ids
    pub async fn get(&self, username: &str) -> Result<UserDetail, ModelError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let rows = self.db.query(&sql, &[SqlValue::from(username)]).await?;
        let user: User = first(rows)?.ok_or_else(|| no_user(username))?;

        let rows = self
            .db
            .query(
                r#"SELECT job_id AS "jobId" FROM applications WHERE username = $1 ORDER BY job_id"#,
                &[SqlValue::from(username)],
            )
            .await?;
        let jobs = ids(rows, "jobId")?;

        let qualifications = self.qualification_ids(username).await?;

        Ok(UserDetail {
            user,
            jobs,
            qualifications,
        })
    }

    /// Partial update.
    ///
    /// This can grant admin rights or replace the password hash; callers must
    /// have authorized the change.
    pub async fn update(&self, username: &str, data: UserUpdate) -> Result<User, ModelError> {
        let set = partial_update(data.into_assignments(), UserUpdate::COLUMNS)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = {} RETURNING {}",
            set.clause,
            set.next_placeholder(),
            USER_COLUMNS
        );
        let mut params = set.values;
        params.push(SqlValue::from(username));

        let rows = self.db.query(&sql, &params).await?;
        first(rows)?.ok_or_else(|| no_user(username))
    }

    pub async fn remove(&self, username: &str) -> Result<(), ModelError> {
        let rows = self
            .db
            .query(
                "DELETE FROM users WHERE username = $1 RETURNING username",
                &[SqlValue::from(username)],
            )
            .await?;

        if rows.is_empty() {
            return Err(no_user(username));
        }
        tracing::info!("Deleted user {}", username);
        Ok(())
    }

    /// Apply a user to a job
    pub async fn apply(&self, username: &str, job_id: i32) -> Result<Application, ModelError> {
        let result = self
            .db
            .query(
                r#"INSERT INTO applications (username, job_id)
                   VALUES ($1, $2)
                   RETURNING username, job_id AS "jobId""#,
                &[SqlValue::from(username), SqlValue::from(job_id)],
            )
            .await;

        match result {
            Ok(rows) => Ok(first(rows)?.unwrap_or_else(|| Application {
                username: username.to_string(),
                job_id,
            })),
            Err(StorageError::UniqueViolation(_)) => Err(ModelError::Conflict(format!(
                "Duplicate application for username {} and job {}",
                username, job_id
            ))),
            Err(StorageError::ForeignKeyViolation(_)) => {
                if !self.exists(username).await? {
                    return Err(no_user(username));
                }
                if !JobStore::new(self.db).exists(job_id).await? {
                    return Err(ModelError::NotFound(format!("No job: {}", job_id)));
                }
                Err(ModelError::NotFound(format!(
                    "No user {} or no job {}",
                    username, job_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Declare a user qualified in a technology
    pub async fn qualify(&self, username: &str, tech_id: i32) -> Result<Qualification, ModelError> {
        let result = self
            .db
            .query(
                r#"INSERT INTO qualifications (username, tech_id)
                   VALUES ($1, $2)
                   RETURNING username, tech_id AS "techId""#,
                &[SqlValue::from(username), SqlValue::from(tech_id)],
            )
            .await;

        match result {
            Ok(rows) => Ok(first(rows)?.unwrap_or_else(|| Qualification {
                username: username.to_string(),
                tech_id,
            })),
            Err(StorageError::UniqueViolation(_)) => Err(ModelError::Conflict(format!(
                "Duplicate qualification for username {} and technology {}",
                username, tech_id
            ))),
            Err(StorageError::ForeignKeyViolation(_)) => {
                if !self.exists(username).await? {
                    return Err(no_user(username));
                }
                if !TechnologyStore::new(self.db).exists(tech_id).await? {
                    return Err(ModelError::NotFound(format!("No technology: {}", tech_id)));
                }
                Err(ModelError::NotFound(format!(
                    "No user {} or no technology {}",
                    username, tech_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, username: &str) -> Result<bool, ModelError> {
        let rows = self
            .db
            .query(
                "SELECT username FROM users WHERE username = $1",
                &[SqlValue::from(username)],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Ids of the technologies a user is qualified in, ascending
    pub async fn qualification_ids(&self, username: &str) -> Result<Vec<i32>, ModelError> {
        let rows = self
            .db
            .query(
                r#"SELECT tech_id AS "techId" FROM qualifications WHERE username = $1 ORDER BY tech_id"#,
                &[SqlValue::from(username)],
            )
            .await?;
        Ok(ids(rows, "techId")?)
    }
}

fn no_user(username: &str) -> ModelError {
    ModelError::NotFound(format!("No user: {}", username))
}
