//! Factory for the storage backends
//!
//! With a `[database]` section the service gets SQL repositories sharing one
//! pool; without one it falls back to the in-memory store.

use crate::client::DbClient;
use crate::error::DbError;
use crate::repositories::{InMemoryStore, SqlAppointmentRepository, SqlDoctorRepository};
use crate::schema::init_schema;
use clinic_common::{AppointmentLedger, DoctorRegistry, NewDoctor, StoreError};
use clinic_config::{AppConfig, DoctorSeed};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The two storage handles the booking service works with
#[derive(Clone)]
pub struct Stores {
    pub doctors: Arc<dyn DoctorRegistry>,
    pub ledger: Arc<dyn AppointmentLedger>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("backend", &self.ledger.backend_name())
            .finish()
    }
}

/// Builds [`Stores`] from the application configuration
#[derive(Debug, Clone, Default)]
pub struct StoreFactory;

impl StoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Connect, create the schema and seed the configured doctors.
    ///
    /// # Errors
    ///
    /// * The database URL is empty, unsupported or unreachable
    /// * Schema creation fails
    /// * Seeding fails
    pub async fn from_app_config(&self, config: &AppConfig) -> Result<Stores, DbError> {
        let stores = match &config.database {
            Some(db_config) => {
                let client = DbClient::from_config(db_config).await?;
                self.from_client(client).await?
            }
            None => {
                warn!("No database configured, appointments are kept in memory only");
                self.in_memory()
            }
        };

        seed_doctors(stores.doctors.as_ref(), &config.doctors)
            .await
            .map_err(|e| DbError::QueryError(format!("Seeding doctors failed: {}", e)))?;
        Ok(stores)
    }

    /// SQL repositories over an existing client, schema included
    pub async fn from_client(&self, client: DbClient) -> Result<Stores, DbError> {
        init_schema(&client).await?;
        info!("Using {} storage", client.dialect().name());
        Ok(Stores {
            doctors: Arc::new(SqlDoctorRepository::new(client.clone())),
            ledger: Arc::new(SqlAppointmentRepository::new(client)),
        })
    }

    pub fn in_memory(&self) -> Stores {
        let store = Arc::new(InMemoryStore::new());
        Stores {
            doctors: store.clone(),
            ledger: store,
        }
    }
}

/// Create every seeded doctor whose name is not registered yet.
///
/// Returns the number of doctors created. Running it again on the same
/// storage creates nothing.
pub async fn seed_doctors(
    registry: &dyn DoctorRegistry,
    seeds: &[DoctorSeed],
) -> Result<usize, StoreError> {
    if seeds.is_empty() {
        return Ok(0);
    }

    let existing = registry.list_doctors().await?;
    let mut created = 0;
    for seed in seeds {
        if existing.iter().any(|d| d.name == seed.name) {
            debug!("Doctor {} already registered", seed.name);
            continue;
        }
        registry
            .create_doctor(NewDoctor {
                name: seed.name.clone(),
                specialty: seed.specialty.clone(),
                max_patients: seed.max_patients,
            })
            .await?;
        created += 1;
    }

    if created > 0 {
        info!("Seeded {} doctor(s)", created);
    }
    Ok(created)
}
