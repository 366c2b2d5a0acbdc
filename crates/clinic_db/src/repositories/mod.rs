//! Storage implementations of the doctor registry and appointment ledger

pub mod appointment_sql;
pub mod doctor_sql;
pub mod memory;

pub use appointment_sql::SqlAppointmentRepository;
pub use doctor_sql::SqlDoctorRepository;
pub use memory::InMemoryStore;
