//! Table definitions
//!
//! Dates and times are stored as `YYYY-MM-DD` and zero-padded `HH:MM` text:
//! the Any driver cannot decode chrono types, and with fixed-width text the
//! range comparisons in SQL order the same way the times do.

use crate::client::{DbClient, Dialect};
use crate::error::DbError;
use tracing::{debug, info};

fn doctors_table(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS doctors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                specialty TEXT NOT NULL,
                max_patients INTEGER NOT NULL CHECK (max_patients >= 0)
            )
            "#
        }
        Dialect::Postgres => {
            r#"
            CREATE TABLE IF NOT EXISTS doctors (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                specialty TEXT NOT NULL,
                max_patients BIGINT NOT NULL CHECK (max_patients >= 0)
            )
            "#
        }
    }
}

fn appointments_table(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                doctor_id INTEGER NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                patient_name TEXT NOT NULL,
                UNIQUE(doctor_id, date, start_time, end_time)
            )
            "#
        }
        Dialect::Postgres => {
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id BIGSERIAL PRIMARY KEY,
                doctor_id BIGINT NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                patient_name TEXT NOT NULL,
                UNIQUE(doctor_id, date, start_time, end_time)
            )
            "#
        }
    }
}

const APPOINTMENTS_LOOKUP_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_appointments_doctor_date
    ON appointments (doctor_id, date)
"#;

/// Create the doctors and appointments tables if they don't already exist.
pub async fn init_schema(client: &DbClient) -> Result<(), DbError> {
    let dialect = client.dialect();
    debug!("Initializing {} schema", dialect.name());

    client.execute(doctors_table(dialect)).await?;
    client.execute(appointments_table(dialect)).await?;
    client.execute(APPOINTMENTS_LOOKUP_INDEX).await?;

    info!("Clinic schema initialized successfully");
    Ok(())
}
