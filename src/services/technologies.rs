use crate::core::sql::partial_update;
use crate::errors::ModelError;
use crate::models::{NewTechnology, Technology, TechnologyUpdate};

use super::{decode_all, first, QueryExecutor, SqlValue, StorageError};

/// Skill tags
pub struct TechnologyStore<'a, E: QueryExecutor + ?Sized> {
    db: &'a E,
}

impl<'a, E: QueryExecutor + ?Sized> TechnologyStore<'a, E> {
    pub fn new(db: &'a E) -> Self {
        Self { db }
    }

    /// Create a technology; names are unique
    pub async fn create(&self, data: NewTechnology) -> Result<Technology, ModelError> {
        let result = self
            .db
            .query(
                "INSERT INTO technologies (technology) VALUES ($1) RETURNING id, technology",
                &[SqlValue::Text(data.technology.clone())],
            )
            .await;

        match result {
            Ok(rows) => first(rows)?.ok_or_else(|| {
                StorageError::Decode("INSERT returned no row".to_string()).into()
            }),
            Err(StorageError::UniqueViolation(_)) => Err(duplicate(&data.technology)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<Technology>, ModelError> {
        let rows = self
            .db
            .query("SELECT id, technology FROM technologies ORDER BY technology", &[])
            .await?;
        Ok(decode_all(rows)?)
    }

    pub async fn get(&self, id: i32) -> Result<Technology, ModelError> {
        let rows = self
            .db
            .query(
                "SELECT id, technology FROM technologies WHERE id = $1",
                &[SqlValue::from(id)],
            )
            .await?;
        first(rows)?.ok_or_else(|| no_technology(id))
    }

    /// Rename a technology
    pub async fn update(&self, id: i32, data: TechnologyUpdate) -> Result<Technology, ModelError> {
        let name = data.technology.clone().unwrap_or_default();
        let set = partial_update(data.into_assignments(), &[])?;
        let sql = format!(
            "UPDATE technologies SET {} WHERE id = {} RETURNING id, technology",
            set.clause,
            set.next_placeholder()
        );
        let mut params = set.values;
        params.push(SqlValue::from(id));

        match self.db.query(&sql, &params).await {
            Ok(rows) => first(rows)?.ok_or_else(|| no_technology(id)),
            Err(StorageError::UniqueViolation(_)) => Err(duplicate(&name)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(&self, id: i32) -> Result<(), ModelError> {
        let rows = self
            .db
            .query(
                "DELETE FROM technologies WHERE id = $1 RETURNING id",
                &[SqlValue::from(id)],
            )
            .await?;

        if rows.is_empty() {
            return Err(no_technology(id));
        }
        Ok(())
    }

    pub async fn exists(&self, id: i32) -> Result<bool, ModelError> {
        let rows = self
            .db
            .query("SELECT id FROM technologies WHERE id = $1", &[SqlValue::from(id)])
            .await?;
        Ok(!rows.is_empty())
    }
}

fn duplicate(name: &str) -> ModelError {
    ModelError::Conflict(format!("Duplicate technology: {}", name))
}

fn no_technology(id: i32) -> ModelError {
    ModelError::NotFound(format!("No technology: {}", id))
}
