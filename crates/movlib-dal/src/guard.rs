//! Dependency checks that gate deletion of referenced records.
//!
//! A producer cannot be deleted while movies reference it and a movie cannot
//! be deleted while instances reference it. The queries here return the
//! blocking records themselves, so callers can show what stands in the way
//! instead of a bare refusal.

use serde::Serialize;

use crate::movie::MovieShort;
use crate::movie_instance::MovieInstanceShort;
use crate::{ChosenDB, error::Result};

/// Result of a guarded delete. `Blocked` carries the referencing records and
/// means nothing was deleted.
#[derive(Debug, Clone, Serialize)]
pub enum DeleteOutcome<B> {
    Deleted,
    Blocked(Vec<B>),
}

impl<B> DeleteOutcome<B> {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }

    pub fn blocking(&self) -> &[B] {
        match self {
            DeleteOutcome::Deleted => &[],
            DeleteOutcome::Blocked(records) => records,
        }
    }
}

pub async fn blocking_movies<'c, E>(executor: E, producer_id: i64) -> Result<Vec<MovieShort>>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    const SQL: &str = "SELECT m.id, m.title, m.producer_id, \
        p.first_name AS producer_first_name, p.family_name AS producer_family_name \
        FROM movie m \
        JOIN producer p ON m.producer_id = p.id \
        WHERE m.producer_id = ? \
        ORDER BY m.title";
    let records = sqlx::query_as::<_, MovieShort>(SQL)
        .bind(producer_id)
        .fetch_all(executor)
        .await?;
    Ok(records)
}

pub async fn blocking_instances<'c, E>(executor: E, movie_id: i64) -> Result<Vec<MovieInstanceShort>>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    const SQL: &str = "SELECT i.id, i.movie_id, m.title AS movie_title, \
        i.imprint, i.status, i.due_back \
        FROM movie_instance i \
        JOIN movie m ON i.movie_id = m.id \
        WHERE i.movie_id = ? \
        ORDER BY i.id";
    let records = sqlx::query_as::<_, MovieInstanceShort>(SQL)
        .bind(movie_id)
        .fetch_all(executor)
        .await?;
    Ok(records)
}
