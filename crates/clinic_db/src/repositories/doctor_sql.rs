//! SQL implementation of the doctor registry

use crate::error::DbError;
use crate::DbClient;
use clinic_common::{BoxFuture, Doctor, DoctorRegistry, NewDoctor, StoreError};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// Doctor registry backed by the `doctors` table
#[derive(Debug, Clone)]
pub struct SqlDoctorRepository {
    db_client: DbClient,
}

fn doctor_from_row(row: &AnyRow) -> Result<Doctor, DbError> {
    let max_patients: i64 = row.try_get("max_patients")?;
    Ok(Doctor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        specialty: row.try_get("specialty")?,
        max_patients: u32::try_from(max_patients).map_err(|_| DbError::DecodeError {
            table: "doctors",
            message: format!("max_patients out of range: {}", max_patients),
        })?,
    })
}

impl SqlDoctorRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn list(&self) -> Result<Vec<Doctor>, DbError> {
        debug!("Listing doctors");

        let rows = sqlx::query("SELECT id, name, specialty, max_patients FROM doctors ORDER BY id")
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list doctors: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(doctor_from_row).collect()
    }

    pub async fn find(&self, id: i64) -> Result<Option<Doctor>, DbError> {
        debug!("Finding doctor {}", id);

        let row = sqlx::query(
            "SELECT id, name, specialty, max_patients FROM doctors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to find doctor {}: {}", id, e);
            DbError::QueryError(e.to_string())
        })?;

        row.as_ref().map(doctor_from_row).transpose()
    }

    pub async fn insert(&self, doctor: NewDoctor) -> Result<Doctor, DbError> {
        debug!("Creating doctor {}", doctor.name);

        let row = sqlx::query(
            r#"
            INSERT INTO doctors (name, specialty, max_patients)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&doctor.name)
        .bind(&doctor.specialty)
        .bind(i64::from(doctor.max_patients))
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert doctor: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        let id: i64 = row.try_get("id")?;
        info!("Doctor {} created with id {}", doctor.name, id);
        Ok(Doctor {
            id,
            name: doctor.name,
            specialty: doctor.specialty,
            max_patients: doctor.max_patients,
        })
    }
}

impl DoctorRegistry for SqlDoctorRepository {
    fn list_doctors(&self) -> BoxFuture<'_, Vec<Doctor>, StoreError> {
        Box::pin(async move { self.list().await.map_err(StoreError::from) })
    }

    fn get_doctor(&self, id: i64) -> BoxFuture<'_, Option<Doctor>, StoreError> {
        Box::pin(async move { self.find(id).await.map_err(StoreError::from) })
    }

    fn create_doctor(&self, doctor: NewDoctor) -> BoxFuture<'_, Doctor, StoreError> {
        Box::pin(async move { self.insert(doctor).await.map_err(StoreError::from) })
    }
}
