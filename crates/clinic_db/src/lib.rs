//! Storage for the clinic booking service
//!
//! Doctors and appointments live in SQLite (default) or PostgreSQL through an
//! SQLx `Any` pool, or in memory when no database is configured. Callers only
//! see the [`DoctorRegistry`](clinic_common::DoctorRegistry) and
//! [`AppointmentLedger`](clinic_common::AppointmentLedger) traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use clinic_config::AppConfig;
//! use clinic_db::StoreFactory;
//!
//! async fn setup(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let stores = StoreFactory::new().from_app_config(config).await?;
//!     let doctors = stores.doctors.list_doctors().await?;
//!     println!("{} doctors registered", doctors.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod schema;

pub use client::{DbClient, Dialect};
pub use error::DbError;
pub use factory::{seed_doctors, StoreFactory, Stores};
pub use repositories::{InMemoryStore, SqlAppointmentRepository, SqlDoctorRepository};
pub use schema::init_schema;
