// --- File: crates/clinic_booking/src/error.rs ---
use axum::response::{IntoResponse, Response};
use clinic_common::{error_response, HttpStatusCode, StoreError};
use thiserror::Error;

/// Why a booking (or a doctor registration) was rejected.
///
/// Every variant except [`BookingError::Storage`] is an expected outcome the
/// client can act on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed value for field: {0}")]
    MalformedInput(&'static str),

    #[error("Start time is not one of the bookable slots")]
    InvalidSlot,

    #[error("The requested time overlaps an existing appointment")]
    ConflictingAppointment,

    #[error("No such {0}")]
    NotFound(&'static str),

    #[error("The doctor has no capacity left on this date")]
    CapacityReached,

    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("Storage failure: {0}")]
    Storage(StoreError),
}

impl BookingError {
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::MissingField(_) => "MissingField",
            BookingError::MalformedInput(_) => "MalformedInput",
            BookingError::InvalidSlot => "InvalidSlot",
            BookingError::ConflictingAppointment => "ConflictingAppointment",
            BookingError::NotFound(_) => "NotFound",
            BookingError::CapacityReached => "CapacityReached",
            BookingError::InvalidEntity(_) => "InvalidEntity",
            BookingError::Storage(_) => "StorageError",
        }
    }

    /// The request field the rejection is about, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            BookingError::MissingField(field) | BookingError::MalformedInput(field) => Some(*field),
            BookingError::InvalidSlot => Some("start_time"),
            BookingError::NotFound("doctor") => Some("doctor"),
            _ => None,
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            // Another request stored the same slot between our overlap check and insert
            StoreError::Conflict => BookingError::ConflictingAppointment,
            StoreError::MissingReference(_) => BookingError::NotFound("doctor"),
            other => BookingError::Storage(other),
        }
    }
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::MissingField(_)
            | BookingError::MalformedInput(_)
            | BookingError::InvalidSlot
            | BookingError::InvalidEntity(_) => 400,
            BookingError::NotFound(_) => 404,
            BookingError::ConflictingAppointment | BookingError::CapacityReached => 409,
            BookingError::Storage(_) => 500,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Backend details stay in the logs
            BookingError::Storage(_) => "Storage failure".to_string(),
            other => other.to_string(),
        };
        error_response(self.status_code(), self.kind(), self.field(), message)
    }
}
