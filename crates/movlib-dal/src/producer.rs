use garde::Validate;
use serde::{Deserialize, Serialize};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::debug;

use crate::guard::{self, DeleteOutcome};
use crate::movie::MovieShort;
use crate::{Error, ListingParams, Pool, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateProducer {
    #[garde(length(min = 1, max = 255), alphanumeric)]
    pub first_name: String,
    #[garde(length(min = 1, max = 255), alphanumeric)]
    pub family_name: String,
    #[garde(skip)]
    pub date_of_birth: Option<Date>,
    #[garde(skip)]
    pub date_of_death: Option<Date>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Producer {
    pub id: i64,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<Date>,
    pub date_of_death: Option<Date>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProducerShort {
    pub id: i64,
    pub name: String,
}

/// Display name in "family, first" form, empty when either part is blank.
/// Computed on read, never persisted.
pub fn display_name(family_name: &str, first_name: &str) -> String {
    if family_name.is_empty() || first_name.is_empty() {
        return String::new();
    }
    format!("{}, {}", family_name, first_name)
}

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_default()
}

impl Producer {
    pub fn name(&self) -> String {
        display_name(&self.family_name, &self.first_name)
    }

    /// Human readable "birth - death" span with ISO dates; a missing date
    /// leaves its side empty, no dates at all yields an empty string.
    pub fn lifespan(&self) -> String {
        let birth = self.date_of_birth.map(format_date).unwrap_or_default();
        let death = self.date_of_death.map(format_date).unwrap_or_default();
        if birth.is_empty() && death.is_empty() {
            return String::new();
        }
        format!("{} - {}", birth, death)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProducerNameRow {
    id: i64,
    first_name: String,
    family_name: String,
}

impl From<ProducerNameRow> for ProducerShort {
    fn from(row: ProducerNameRow) -> Self {
        ProducerShort {
            id: row.id,
            name: display_name(&row.family_name, &row.first_name),
        }
    }
}

pub struct ProducerRepository {
    pool: Pool,
}

impl ProducerRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateProducer) -> Result<Producer> {
        let result = sqlx::query(
            "INSERT INTO producer (first_name, family_name, date_of_birth, date_of_death) VALUES (?, ?, ?, ?)",
        )
        .bind(payload.first_name.trim())
        .bind(payload.family_name.trim())
        .bind(payload.date_of_birth)
        .bind(payload.date_of_death)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: CreateProducer) -> Result<Producer> {
        let result = sqlx::query(
            "UPDATE producer SET first_name = ?, family_name = ?, date_of_birth = ?, date_of_death = ? WHERE id = ?",
        )
        .bind(payload.first_name.trim())
        .bind(payload.family_name.trim())
        .bind(payload.date_of_birth)
        .bind(payload.date_of_death)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("producer {id}")))
        } else {
            self.get(id).await
        }
    }

    pub async fn get(&self, id: i64) -> Result<Producer> {
        sqlx::query_as::<_, Producer>("SELECT * FROM producer WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("producer {id}")))
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<ProducerShort>> {
        let ordering = params.ordering(&["id", "first_name", "family_name"])?;
        let ordering = if ordering.is_empty() {
            "family_name".to_string()
        } else {
            ordering
        };
        let sql = format!(
            "SELECT id, first_name, family_name FROM producer ORDER BY {ordering} LIMIT ? OFFSET ?"
        );
        let records = sqlx::query_as::<_, ProducerNameRow>(&sql)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records.into_iter().map(ProducerShort::from).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM producer")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes the producer unless movies still reference it. The dependency
    /// check and the delete run in one transaction, so a movie created
    /// concurrently cannot slip in between them.
    pub async fn delete(&self, id: i64) -> Result<DeleteOutcome<MovieShort>> {
        let mut tx = self.pool.begin().await?;
        let blocking = guard::blocking_movies(&mut *tx, id).await?;
        if !blocking.is_empty() {
            debug!("Delete of producer {id} blocked by {} movies", blocking.len());
            return Ok(DeleteOutcome::Blocked(blocking));
        }
        let result = sqlx::query("DELETE FROM producer WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("producer {id}")));
        }
        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn producer(birth: Option<Date>, death: Option<Date>) -> Producer {
        Producer {
            id: 1,
            first_name: "Ben".into(),
            family_name: "Bova".into(),
            date_of_birth: birth,
            date_of_death: death,
        }
    }

    #[test]
    fn name_requires_both_parts() {
        let mut p = producer(None, None);
        assert_eq!(p.name(), "Bova, Ben");
        p.first_name = String::new();
        assert_eq!(p.name(), "");
    }

    #[test]
    fn lifespan_with_both_dates() {
        let p = producer(Some(date!(1932 - 11 - 08)), Some(date!(2020 - 11 - 29)));
        assert_eq!(p.lifespan(), "1932-11-08 - 2020-11-29");
    }

    #[test]
    fn lifespan_with_birth_only() {
        let p = producer(Some(date!(1932 - 11 - 08)), None);
        assert_eq!(p.lifespan(), "1932-11-08 - ");
    }

    #[test]
    fn lifespan_without_dates_is_empty() {
        let p = producer(None, None);
        assert_eq!(p.lifespan(), "");
    }
}
