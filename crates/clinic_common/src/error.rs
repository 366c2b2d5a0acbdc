// --- File: crates/clinic_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// Errors that stop the service from starting.
///
/// Request-level rejections have their own types in the service crates and
/// implement [`HttpStatusCode`] to pick their response status.
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Storage could not be opened, migrated or seeded
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

pub fn config_error<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::ConfigError(message.to_string())
}
