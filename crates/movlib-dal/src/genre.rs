use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::constraint_error;
use crate::{Error, ListingParams, Pool, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateGenre {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

pub struct GenreRepository {
    pool: Pool,
}

impl GenreRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("INSERT INTO genre (name) VALUES (?)")
            .bind(payload.name.trim())
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "genre name"))?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("UPDATE genre SET name = ? WHERE id = ?")
            .bind(payload.name.trim())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "genre name"))?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("genre {id}")))
        } else {
            self.get(id).await
        }
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("genre {id}")))
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<Genre>> {
        let ordering = params.ordering(&["id", "name"])?;
        let ordering = if ordering.is_empty() {
            "name".to_string()
        } else {
            ordering
        };
        let sql = format!("SELECT id, name FROM genre ORDER BY {ordering} LIMIT ? OFFSET ?");
        let records = sqlx::query_as::<_, Genre>(&sql)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM genre")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM genre WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "genre still referenced by movies"))?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("genre {id}")));
        }
        Ok(())
    }
}
