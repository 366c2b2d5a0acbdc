//! Error types for the database client

use clinic_common::StoreError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Insert rejected by a UNIQUE constraint
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Insert rejected by a FOREIGN KEY constraint
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// A stored value could not be converted back into a domain value
    #[error("Corrupt row in {table}: {message}")]
    DecodeError { table: &'static str, message: String },
}

/// True when the error is the backend rejecting a duplicate key.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            // Drivers behind the Any connection do not always report the kind,
            // so fall back to the messages SQLite and Postgres use.
            db_err.is_unique_violation()
                || db_err.message().contains("UNIQUE constraint failed")
                || db_err.message().contains("duplicate key value")
        }
        _ => false,
    }
}

/// True when the error is a foreign key violation.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_foreign_key_violation()
                || db_err.message().contains("FOREIGN KEY constraint failed")
                || db_err.message().contains("violates foreign key constraint")
        }
        _ => false,
    }
}

/// Sort a failed write into constraint violations and everything else.
pub fn classify_write_error(err: sqlx::Error) -> DbError {
    if is_unique_violation(&err) {
        DbError::UniqueViolation(err.to_string())
    } else if is_foreign_key_violation(&err) {
        DbError::ForeignKeyViolation(err.to_string())
    } else {
        DbError::QueryError(err.to_string())
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(_) => StoreError::Conflict,
            DbError::SqlxError(ref e) if is_unique_violation(e) => StoreError::Conflict,
            DbError::ForeignKeyViolation(msg) => StoreError::MissingReference(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
