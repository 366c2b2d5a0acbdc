// --- File: crates/clinic_booking/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod routes;

pub use error::BookingError;
pub use logic::{book, validate_appointment, BookingRequest, BookingRules, SlotPolicy};
