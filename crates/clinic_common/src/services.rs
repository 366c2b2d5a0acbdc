// --- File: crates/clinic_common/src/services.rs ---
//! Storage abstractions.
//!
//! The booking logic never talks to a database directly. It receives a
//! [`DoctorRegistry`] and an [`AppointmentLedger`], which lets the HTTP layer
//! hold trait objects and lets tests swap in an in-memory store.

use crate::models::{Appointment, Doctor, NewAppointment, NewDoctor};
use chrono::{NaiveDate, NaiveTime};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Errors surfaced by storage implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A row with the same (doctor, date, start_time, end_time) already exists.
    /// Raised when a concurrent writer got there first.
    #[error("An appointment already occupies this slot")]
    Conflict,

    /// The record references a row that does not exist (e.g. unknown doctor).
    #[error("Referenced record does not exist: {0}")]
    MissingReference(String),

    /// Anything else the backend reported.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Read access to doctors, plus creation for seeding and administration.
pub trait DoctorRegistry: Send + Sync {
    /// All doctors, ordered by id.
    fn list_doctors(&self) -> BoxFuture<'_, Vec<Doctor>, StoreError>;

    /// A single doctor, or `None` when the id is unknown.
    fn get_doctor(&self, id: i64) -> BoxFuture<'_, Option<Doctor>, StoreError>;

    /// Store a new doctor and return it with its assigned id.
    fn create_doctor(&self, doctor: NewDoctor) -> BoxFuture<'_, Doctor, StoreError>;
}

/// The persisted collection of booked appointments.
///
/// There is no update or delete: appointments are append-only.
pub trait AppointmentLedger: Send + Sync {
    /// Insert an appointment.
    ///
    /// Implementations must reject a second row with the same
    /// (doctor, date, start_time, end_time) with [`StoreError::Conflict`],
    /// even when the caller's own overlap check raced with another writer.
    fn insert_appointment(
        &self,
        appointment: NewAppointment,
    ) -> BoxFuture<'_, Appointment, StoreError>;

    /// Appointments of `doctor_id` on `date` whose range intersects `[start, end)`.
    fn find_overlapping(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError>;

    /// Fetch one appointment by id.
    fn get_appointment(&self, id: i64) -> BoxFuture<'_, Option<Appointment>, StoreError>;

    /// All appointments of `doctor_id` on `date`, ordered by start time.
    fn list_for_doctor_on(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError>;

    /// Cheap round trip used by health checks.
    fn ping(&self) -> BoxFuture<'_, (), StoreError>;

    /// Short label of the backend, e.g. "sqlite" or "memory".
    fn backend_name(&self) -> &'static str;
}
