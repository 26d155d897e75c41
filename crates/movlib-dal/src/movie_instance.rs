use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use time::{Date, OffsetDateTime};

use crate::error::constraint_error;
use crate::movie::{MovieShort, producer_from_row};
use crate::{ChosenRow, Error, ListingParams, Pool, error::Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum InstanceStatus {
    Available,
    Maintenance,
    Loaned,
    Reserved,
}

impl Default for InstanceStatus {
    fn default() -> Self {
        InstanceStatus::Maintenance
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateMovieInstance {
    #[garde(range(min = 1))]
    pub movie_id: i64,
    #[garde(length(min = 1, max = 255))]
    pub imprint: String,
    #[garde(skip)]
    #[serde(default)]
    pub status: Option<InstanceStatus>,
    #[garde(skip)]
    #[serde(default)]
    pub due_back: Option<Date>,
}

#[derive(Debug, Serialize, Clone)]
pub struct MovieInstance {
    pub id: i64,
    pub movie: MovieShort,
    pub imprint: String,
    pub status: InstanceStatus,
    pub due_back: Date,
}

impl sqlx::FromRow<'_, ChosenRow> for MovieInstance {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let producer = producer_from_row(row)?;
        let movie = MovieShort {
            id: row.try_get("movie_id")?,
            title: row.try_get("movie_title")?,
            producer_id: producer.id,
            producer_name: producer.name,
        };
        Ok(MovieInstance {
            id: row.try_get("id")?,
            movie,
            imprint: row.try_get("imprint")?,
            status: row.try_get("status")?,
            due_back: row.try_get("due_back")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct MovieInstanceShort {
    pub id: i64,
    pub movie_id: i64,
    pub movie_title: String,
    pub imprint: String,
    pub status: InstanceStatus,
    pub due_back: Date,
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub struct MovieInstanceRepository {
    pool: Pool,
}

impl MovieInstanceRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateMovieInstance) -> Result<MovieInstance> {
        let result = sqlx::query(
            "INSERT INTO movie_instance (movie_id, imprint, status, due_back) VALUES (?, ?, ?, ?)",
        )
        .bind(payload.movie_id)
        .bind(payload.imprint.trim())
        .bind(payload.status.unwrap_or_default())
        .bind(payload.due_back.unwrap_or_else(today))
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, format!("movie {}", payload.movie_id).as_str()))?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: CreateMovieInstance) -> Result<MovieInstance> {
        let result = sqlx::query(
            "UPDATE movie_instance SET movie_id = ?, imprint = ?, status = ?, due_back = ? WHERE id = ?",
        )
        .bind(payload.movie_id)
        .bind(payload.imprint.trim())
        .bind(payload.status.unwrap_or_default())
        .bind(payload.due_back.unwrap_or_else(today))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, format!("movie {}", payload.movie_id).as_str()))?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("movie instance {id}")))
        } else {
            self.get(id).await
        }
    }

    pub async fn get(&self, id: i64) -> Result<MovieInstance> {
        const SQL: &str = "SELECT i.id, i.imprint, i.status, i.due_back, i.movie_id, \
            m.title AS movie_title, m.producer_id, \
            p.first_name AS producer_first_name, p.family_name AS producer_family_name \
            FROM movie_instance i \
            JOIN movie m ON i.movie_id = m.id \
            JOIN producer p ON m.producer_id = p.id \
            WHERE i.id = ?";
        sqlx::query_as::<_, MovieInstance>(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("movie instance {id}")))
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<MovieInstanceShort>> {
        let ordering = params.ordering(&["id", "imprint", "status", "due_back"])?;
        let ordering = if ordering.is_empty() {
            "id".to_string()
        } else {
            ordering
        };
        let sql = format!(
            "SELECT i.id, i.movie_id, m.title AS movie_title, i.imprint, i.status, i.due_back \
             FROM movie_instance i JOIN movie m ON i.movie_id = m.id \
             ORDER BY {ordering} LIMIT ? OFFSET ?"
        );
        let records = sqlx::query_as::<_, MovieInstanceShort>(&sql)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movie_instance")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM movie_instance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("movie instance {id}")));
        }
        Ok(())
    }
}
