//! Dashboard counts across all collections.

use serde::{Deserialize, Serialize};

use crate::movie_instance::InstanceStatus;
use crate::{Pool, error::Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySummary {
    pub movie_count: i64,
    pub movie_instance_count: i64,
    pub available_instance_count: i64,
    pub producer_count: i64,
    pub genre_count: i64,
}

pub struct SummaryRepository {
    pool: Pool,
}

impl SummaryRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Runs the five counts concurrently and assembles the summary only once
    /// all of them have resolved. The first failing count fails the whole
    /// summary, partial results are discarded.
    pub async fn compute(&self) -> Result<LibrarySummary> {
        let (movie_count, movie_instance_count, available_instance_count, producer_count, genre_count) =
            futures::try_join!(
                count(&self.pool, "SELECT COUNT(*) FROM movie"),
                count(&self.pool, "SELECT COUNT(*) FROM movie_instance"),
                count_available(&self.pool),
                count(&self.pool, "SELECT COUNT(*) FROM producer"),
                count(&self.pool, "SELECT COUNT(*) FROM genre"),
            )?;

        Ok(LibrarySummary {
            movie_count,
            movie_instance_count,
            available_instance_count,
            producer_count,
            genre_count,
        })
    }
}

async fn count(pool: &Pool, sql: &'static str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await?;
    Ok(count)
}

async fn count_available(pool: &Pool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movie_instance WHERE status = ?")
        .bind(InstanceStatus::Available)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
