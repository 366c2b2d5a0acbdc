// --- File: crates/clinic_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error taxonomy and HTTP status mapping
pub mod http; // Axum response helpers
pub mod logging; // Tracing subscriber setup
pub mod models; // Doctors and appointments
pub mod services; // Storage abstractions

// Re-export error types and utilities for easier access
pub use error::{config_error, ClinicError, HttpStatusCode};

// Re-export HTTP utilities for easier access
pub use http::{error_response, ErrorBody};

pub use models::{Appointment, Doctor, NewAppointment, NewDoctor};
pub use services::{AppointmentLedger, BoxFuture, DoctorRegistry, StoreError};

// This crate holds what every other crate of the service shares: the domain
// records, the storage traits they are persisted through, and the error and
// logging plumbing.
