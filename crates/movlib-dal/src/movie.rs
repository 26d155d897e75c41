use std::collections::BTreeSet;

use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use tracing::debug;

use crate::error::constraint_error;
use crate::genre::Genre;
use crate::guard::{self, DeleteOutcome};
use crate::movie_instance::MovieInstanceShort;
use crate::producer::{ProducerShort, display_name};
use crate::{ChosenRow, Error, ListingParams, Pool, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateMovie {
    #[garde(length(min = 1, max = 511))]
    pub title: String,
    #[garde(range(min = 1))]
    pub producer_id: i64,
    #[garde(length(min = 1, max = 5000))]
    pub summary: String,
    #[garde(length(min = 1, max = 63))]
    pub isbn: String,
    #[garde(skip)]
    #[serde(default)]
    pub genres: Vec<i64>,
}

/// Detail shape with references resolved.
#[derive(Debug, Serialize, Clone)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub producer: ProducerShort,
    pub summary: String,
    pub isbn: String,
    pub genres: Vec<Genre>,
}

impl sqlx::FromRow<'_, ChosenRow> for Movie {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let producer = producer_from_row(row)?;
        Ok(Movie {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            producer,
            summary: row.try_get("summary")?,
            isbn: row.try_get("isbn")?,
            genres: Vec::new(),
        })
    }
}

/// Listing projection, only title plus the resolved producer display name.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MovieShort {
    pub id: i64,
    pub title: String,
    pub producer_id: i64,
    pub producer_name: String,
}

impl sqlx::FromRow<'_, ChosenRow> for MovieShort {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let producer = producer_from_row(row)?;
        Ok(MovieShort {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            producer_id: producer.id,
            producer_name: producer.name,
        })
    }
}

pub(crate) fn producer_from_row(row: &ChosenRow) -> Result<ProducerShort, sqlx::Error> {
    let first_name: String = row.try_get("producer_first_name")?;
    let family_name: String = row.try_get("producer_family_name")?;
    Ok(ProducerShort {
        id: row.try_get("producer_id")?,
        name: display_name(&family_name, &first_name),
    })
}

const MOVIE_COLUMNS: &str = "m.id, m.title, m.producer_id, m.summary, m.isbn, \
    p.first_name AS producer_first_name, p.family_name AS producer_family_name";

pub struct MovieRepository {
    pool: Pool,
}

impl MovieRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateMovie) -> Result<Movie> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("INSERT INTO movie (title, producer_id, summary, isbn) VALUES (?, ?, ?, ?)")
            .bind(payload.title.trim())
            .bind(payload.producer_id)
            .bind(payload.summary.trim())
            .bind(payload.isbn.trim())
            .execute(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, format!("producer {}", payload.producer_id).as_str()))?;

        let id = result.last_insert_rowid();
        link_genres(&mut tx, id, &payload.genres).await?;
        tx.commit().await?;

        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: CreateMovie) -> Result<Movie> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE movie SET title = ?, producer_id = ?, summary = ?, isbn = ? WHERE id = ?")
            .bind(payload.title.trim())
            .bind(payload.producer_id)
            .bind(payload.summary.trim())
            .bind(payload.isbn.trim())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, format!("producer {}", payload.producer_id).as_str()))?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("movie {id}")));
        }

        sqlx::query("DELETE FROM movie_genres WHERE movie_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_genres(&mut tx, id, &payload.genres).await?;
        tx.commit().await?;

        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Movie> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movie m JOIN producer p ON m.producer_id = p.id WHERE m.id = ?"
        );
        let mut movie = sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("movie {id}")))?;

        movie.genres = sqlx::query_as::<_, Genre>(
            "SELECT g.id, g.name FROM genre g \
             JOIN movie_genres mg ON g.id = mg.genre_id \
             WHERE mg.movie_id = ? ORDER BY g.name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movie)
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<MovieShort>> {
        let ordering = params.ordering(&["id", "title"])?;
        let ordering = if ordering.is_empty() {
            "title".to_string()
        } else {
            ordering
        };
        let sql = format!(
            "SELECT m.id, m.title, m.producer_id, \
             p.first_name AS producer_first_name, p.family_name AS producer_family_name \
             FROM movie m JOIN producer p ON m.producer_id = p.id \
             ORDER BY {ordering} LIMIT ? OFFSET ?"
        );
        let records = sqlx::query_as::<_, MovieShort>(&sql)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    pub async fn list_by_producer(&self, producer_id: i64) -> Result<Vec<MovieShort>> {
        guard::blocking_movies(&self.pool, producer_id).await
    }

    pub async fn instances(&self, movie_id: i64) -> Result<Vec<MovieInstanceShort>> {
        guard::blocking_instances(&self.pool, movie_id).await
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movie")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes the movie unless instances still reference it; the check and
    /// the delete share one transaction. Genre links go away with the movie.
    pub async fn delete(&self, id: i64) -> Result<DeleteOutcome<MovieInstanceShort>> {
        let mut tx = self.pool.begin().await?;
        let blocking = guard::blocking_instances(&mut *tx, id).await?;
        if !blocking.is_empty() {
            debug!("Delete of movie {id} blocked by {} instances", blocking.len());
            return Ok(DeleteOutcome::Blocked(blocking));
        }
        let result = sqlx::query("DELETE FROM movie WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("movie {id}")));
        }
        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }
}

async fn link_genres(
    tx: &mut sqlx::Transaction<'_, crate::ChosenDB>,
    movie_id: i64,
    genres: &[i64],
) -> Result<()> {
    // Submitted genre references are a set, duplicates collapse.
    let genres: BTreeSet<i64> = genres.iter().copied().collect();
    for genre_id in genres {
        sqlx::query("INSERT INTO movie_genres (movie_id, genre_id) VALUES (?, ?)")
            .bind(movie_id)
            .bind(genre_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| constraint_error(e, format!("genre {genre_id}").as_str()))?;
    }
    Ok(())
}
