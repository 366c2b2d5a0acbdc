//! SQL implementation of the appointment ledger

use crate::error::{classify_write_error, DbError};
use crate::DbClient;
use chrono::{NaiveDate, NaiveTime};
use clinic_common::models::{DATE_FORMAT, TIME_FORMAT};
use clinic_common::{Appointment, AppointmentLedger, BoxFuture, NewAppointment, StoreError};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info, warn};

const SELECT_COLUMNS: &str =
    "SELECT id, doctor_id, date, start_time, end_time, patient_name FROM appointments";

/// Appointment ledger backed by the `appointments` table
///
/// The table's `UNIQUE(doctor_id, date, start_time, end_time)` constraint is
/// what makes concurrent bookings of the same slot safe; the overlap query
/// alone is not atomic with the insert.
#[derive(Debug, Clone)]
pub struct SqlAppointmentRepository {
    db_client: DbClient,
}

fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn time_text(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn decode_error(message: String) -> DbError {
    DbError::DecodeError {
        table: "appointments",
        message,
    }
}

fn appointment_from_row(row: &AnyRow) -> Result<Appointment, DbError> {
    let date: String = row.try_get("date")?;
    let start_time: String = row.try_get("start_time")?;
    let end_time: String = row.try_get("end_time")?;

    let parse_time = |raw: &str| {
        NaiveTime::parse_from_str(raw, TIME_FORMAT)
            .map_err(|e| decode_error(format!("bad time {:?}: {}", raw, e)))
    };

    Ok(Appointment {
        id: row.try_get("id")?,
        doctor_id: row.try_get("doctor_id")?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| decode_error(format!("bad date {:?}: {}", date, e)))?,
        start_time: parse_time(&start_time)?,
        end_time: parse_time(&end_time)?,
        patient_name: row.try_get("patient_name")?,
    })
}

impl SqlAppointmentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        debug!(
            "Inserting appointment for doctor {} on {} at {}",
            appointment.doctor_id, appointment.date, appointment.start_time
        );

        let query = r#"
            INSERT INTO appointments (doctor_id, date, start_time, end_time, patient_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(appointment.doctor_id)
            .bind(date_text(appointment.date))
            .bind(time_text(appointment.start_time))
            .bind(time_text(appointment.end_time))
            .bind(&appointment.patient_name)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                let classified = classify_write_error(e);
                match &classified {
                    DbError::UniqueViolation(_) => {
                        warn!("Slot taken by a concurrent booking: {}", classified)
                    }
                    other => error!("Failed to insert appointment: {}", other),
                }
                classified
            })?;

        let id: i64 = row.try_get("id")?;
        info!("Appointment {} stored", id);
        Ok(appointment.with_id(id))
    }

    pub async fn overlapping(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "{} WHERE doctor_id = $1 AND date = $2 AND start_time < $3 AND end_time > $4 ORDER BY start_time",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(doctor_id)
            .bind(date_text(date))
            .bind(time_text(end))
            .bind(time_text(start))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to query overlapping appointments: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(appointment_from_row).collect()
    }

    pub async fn find(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        let query = format!("{} WHERE id = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(appointment_from_row).transpose()
    }

    pub async fn for_doctor_on(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "{} WHERE doctor_id = $1 AND date = $2 ORDER BY start_time",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(doctor_id)
            .bind(date_text(date))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list appointments: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(appointment_from_row).collect()
    }
}

impl AppointmentLedger for SqlAppointmentRepository {
    fn insert_appointment(
        &self,
        appointment: NewAppointment,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        Box::pin(async move { self.insert(appointment).await.map_err(StoreError::from) })
    }

    fn find_overlapping(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        Box::pin(async move {
            self.overlapping(doctor_id, date, start, end)
                .await
                .map_err(StoreError::from)
        })
    }

    fn get_appointment(&self, id: i64) -> BoxFuture<'_, Option<Appointment>, StoreError> {
        Box::pin(async move { self.find(id).await.map_err(StoreError::from) })
    }

    fn list_for_doctor_on(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        Box::pin(async move {
            self.for_doctor_on(doctor_id, date)
                .await
                .map_err(StoreError::from)
        })
    }

    fn ping(&self) -> BoxFuture<'_, (), StoreError> {
        Box::pin(async move {
            if self.db_client.is_healthy().await {
                Ok(())
            } else {
                Err(StoreError::Backend("database did not answer".to_string()))
            }
        })
    }

    fn backend_name(&self) -> &'static str {
        self.db_client.dialect().name()
    }
}
