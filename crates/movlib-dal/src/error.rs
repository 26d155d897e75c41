pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid order by field: {0}")]
    InvalidOrderByField(String),
}

/// Maps SQLite constraint failures on writes to their domain meaning,
/// anything else stays a database error.
pub(crate) fn constraint_error(error: sqlx::Error, what: &str) -> Error {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return Error::AlreadyExists(what.to_string());
        }
        if db_error.is_foreign_key_violation() {
            return Error::InvalidReference(what.to_string());
        }
    }
    error.into()
}
