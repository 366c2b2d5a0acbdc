//! In-process store used when no database is configured, and by tests

use chrono::{NaiveDate, NaiveTime};
use clinic_common::{
    Appointment, AppointmentLedger, BoxFuture, Doctor, DoctorRegistry, NewAppointment, NewDoctor,
    StoreError,
};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Tables {
    doctors: Vec<Doctor>,
    appointments: Vec<Appointment>,
    next_doctor_id: i64,
    next_appointment_id: i64,
}

/// Doctors and appointments held in memory behind one lock.
///
/// Enforces the same constraints as the SQL schema: appointments must
/// reference an existing doctor and the (doctor, date, start, end) key is
/// unique. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the given doctors, numbered from 1.
    pub fn with_doctors(doctors: impl IntoIterator<Item = NewDoctor>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.lock_tables();
            for doctor in doctors {
                Self::push_doctor(&mut tables, doctor);
            }
        }
        store
    }

    fn lock_tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-written row,
        // every mutation is a single push.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push_doctor(tables: &mut Tables, doctor: NewDoctor) -> Doctor {
        tables.next_doctor_id += 1;
        let stored = Doctor {
            id: tables.next_doctor_id,
            name: doctor.name,
            specialty: doctor.specialty,
            max_patients: doctor.max_patients,
        };
        tables.doctors.push(stored.clone());
        stored
    }

    fn insert(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let mut tables = self.lock_tables();

        if !tables.doctors.iter().any(|d| d.id == appointment.doctor_id) {
            return Err(StoreError::MissingReference(format!(
                "doctor {}",
                appointment.doctor_id
            )));
        }

        let key = appointment.slot_key();
        if tables.appointments.iter().any(|a| a.slot_key() == key) {
            warn!(
                "Slot {} {} already stored for doctor {}",
                appointment.date, appointment.start_time, appointment.doctor_id
            );
            return Err(StoreError::Conflict);
        }

        tables.next_appointment_id += 1;
        let stored = appointment.with_id(tables.next_appointment_id);
        tables.appointments.push(stored.clone());
        debug!("Appointment {} stored in memory", stored.id);
        Ok(stored)
    }

    fn overlapping(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .lock_tables()
            .appointments
            .iter()
            .filter(|a| {
                a.doctor_id == doctor_id && a.date == date && a.start_time < end && a.end_time > start
            })
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        found
    }
}

impl DoctorRegistry for InMemoryStore {
    fn list_doctors(&self) -> BoxFuture<'_, Vec<Doctor>, StoreError> {
        let doctors = self.lock_tables().doctors.clone();
        Box::pin(async move { Ok(doctors) })
    }

    fn get_doctor(&self, id: i64) -> BoxFuture<'_, Option<Doctor>, StoreError> {
        let doctor = self
            .lock_tables()
            .doctors
            .iter()
            .find(|d| d.id == id)
            .cloned();
        Box::pin(async move { Ok(doctor) })
    }

    fn create_doctor(&self, doctor: NewDoctor) -> BoxFuture<'_, Doctor, StoreError> {
        let stored = Self::push_doctor(&mut self.lock_tables(), doctor);
        Box::pin(async move { Ok(stored) })
    }
}

impl AppointmentLedger for InMemoryStore {
    fn insert_appointment(
        &self,
        appointment: NewAppointment,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        let result = self.insert(appointment);
        Box::pin(async move { result })
    }

    fn find_overlapping(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        let found = self.overlapping(doctor_id, date, start, end);
        Box::pin(async move { Ok(found) })
    }

    fn get_appointment(&self, id: i64) -> BoxFuture<'_, Option<Appointment>, StoreError> {
        let appointment = self
            .lock_tables()
            .appointments
            .iter()
            .find(|a| a.id == id)
            .cloned();
        Box::pin(async move { Ok(appointment) })
    }

    fn list_for_doctor_on(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        let mut found: Vec<Appointment> = self
            .lock_tables()
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.date == date)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        Box::pin(async move { Ok(found) })
    }

    fn ping(&self) -> BoxFuture<'_, (), StoreError> {
        Box::pin(async move { Ok(()) })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(name: &str) -> NewDoctor {
        NewDoctor {
            name: name.to_string(),
            specialty: "General Practice".to_string(),
            max_patients: 2,
        }
    }

    fn slot(doctor_id: i64, hour: u32, minute: u32) -> NewAppointment {
        let start = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
        NewAppointment {
            doctor_id,
            date: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            patient_name: "Jane Doe".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_order() {
        let store = InMemoryStore::with_doctors([doctor("A"), doctor("B")]);
        let doctors = store.list_doctors().await.unwrap();
        assert_eq!(doctors.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 2]);

        let first = store.insert_appointment(slot(1, 14, 0)).await.unwrap();
        let second = store.insert_appointment(slot(1, 14, 30)).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_duplicate_slot_is_a_conflict() {
        let store = InMemoryStore::with_doctors([doctor("A")]);
        store.insert_appointment(slot(1, 15, 0)).await.unwrap();
        assert_eq!(
            store.insert_appointment(slot(1, 15, 0)).await,
            Err(StoreError::Conflict)
        );
    }

    #[tokio::test]
    async fn test_unknown_doctor_is_rejected() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.insert_appointment(slot(9, 15, 0)).await,
            Err(StoreError::MissingReference(_))
        ));
    }

    #[tokio::test]
    async fn test_overlap_is_half_open() {
        let store = InMemoryStore::with_doctors([doctor("A"), doctor("B")]);
        store.insert_appointment(slot(1, 14, 0)).await.unwrap();
        store.insert_appointment(slot(2, 14, 30)).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 5, 15).unwrap();
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        // Touching ranges do not overlap
        let touching = store
            .find_overlapping(1, date, at(14, 30), at(15, 0))
            .await
            .unwrap();
        assert!(touching.is_empty());

        let hit = store
            .find_overlapping(1, date, at(14, 15), at(14, 45))
            .await
            .unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].doctor_id, 1);
    }
}
