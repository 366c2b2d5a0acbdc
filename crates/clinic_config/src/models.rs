// --- File: crates/clinic_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/clinic.db, loaded via CLINIC__DATABASE__URL
    #[serde(default)]
    pub max_connections: Option<u32>,
    /// Seconds to wait for a free pooled connection.
    #[serde(default)]
    pub acquire_timeout_secs: Option<u64>,
}

// --- Booking Rules ---
/// Clinic hours and slot layout. Times are local wall-clock `HH:MM` strings.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BookingConfig {
    /// Earliest moment an appointment may occupy.
    pub window_start: String,
    /// Latest moment an appointment may occupy.
    pub window_end: String,
    /// First bookable slot start.
    pub first_slot: String,
    /// Last bookable slot start (inclusive).
    pub last_slot: String,
    pub slot_minutes: i64,
    /// Reject bookings once a doctor has `max_patients` appointments on a date.
    pub enforce_capacity: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            window_start: "14:00".to_string(),
            window_end: "19:00".to_string(),
            first_slot: "14:00".to_string(),
            last_slot: "18:00".to_string(),
            slot_minutes: 30,
            enforce_capacity: false,
        }
    }
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set (e.g. "info", "debug").
    pub level: Option<String>,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
    pub file_prefix: Option<String>,
}

// --- Doctor seed data ---
/// A doctor inserted into the registry at startup when no doctor with the
/// same name exists yet.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DoctorSeed {
    pub name: String,
    pub specialty: String,
    pub max_patients: u32,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // Without a database section the service keeps its ledger in memory.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub doctors: Vec<DoctorSeed>,
}
