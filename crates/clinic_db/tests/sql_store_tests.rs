//! Repository behaviour against an in-memory SQLite database

use chrono::{Duration, NaiveDate, NaiveTime};
use clinic_common::{NewAppointment, NewDoctor, StoreError};
use clinic_config::{AppConfig, DatabaseConfig, DoctorSeed};
use clinic_db::{seed_doctors, DbClient, StoreFactory, Stores};

async fn sqlite_stores() -> Stores {
    let client = DbClient::from_url("sqlite::memory:").await.unwrap();
    StoreFactory::new().from_client(client).await.unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 15).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn appointment(doctor_id: i64, hour: u32, minute: u32, patient: &str) -> NewAppointment {
    NewAppointment {
        doctor_id,
        date: date(),
        start_time: at(hour, minute),
        end_time: at(hour, minute) + Duration::minutes(30),
        patient_name: patient.to_string(),
    }
}

async fn add_doctor(stores: &Stores, name: &str) -> i64 {
    stores
        .doctors
        .create_doctor(NewDoctor {
            name: name.to_string(),
            specialty: "Cardiology".to_string(),
            max_patients: 6,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_doctor_round_trip() {
    let stores = sqlite_stores().await;
    let id = add_doctor(&stores, "Dr. Luca Rossi").await;

    let doctor = stores.doctors.get_doctor(id).await.unwrap().unwrap();
    assert_eq!(doctor.name, "Dr. Luca Rossi");
    assert_eq!(doctor.max_patients, 6);

    assert!(stores.doctors.get_doctor(id + 100).await.unwrap().is_none());
    assert_eq!(stores.doctors.list_doctors().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_appointment_is_stored_and_read_back() {
    let stores = sqlite_stores().await;
    let doctor = add_doctor(&stores, "Dr. Anna Meier").await;

    let stored = stores
        .ledger
        .insert_appointment(appointment(doctor, 14, 30, "Jane Doe"))
        .await
        .unwrap();
    assert_eq!(stored.end_time, at(15, 0));

    let fetched = stores
        .ledger
        .get_appointment(stored.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, stored);
}

#[tokio::test]
async fn test_same_slot_twice_is_a_conflict() {
    let stores = sqlite_stores().await;
    let doctor = add_doctor(&stores, "Dr. Anna Meier").await;

    stores
        .ledger
        .insert_appointment(appointment(doctor, 16, 0, "Jane Doe"))
        .await
        .unwrap();
    let second = stores
        .ledger
        .insert_appointment(appointment(doctor, 16, 0, "John Roe"))
        .await;
    assert_eq!(second, Err(StoreError::Conflict));
}

#[tokio::test]
async fn test_unknown_doctor_is_a_missing_reference() {
    let stores = sqlite_stores().await;
    let result = stores
        .ledger
        .insert_appointment(appointment(77, 14, 0, "Jane Doe"))
        .await;
    assert!(matches!(result, Err(StoreError::MissingReference(_))));
}

#[tokio::test]
async fn test_overlap_query_is_scoped_and_half_open() {
    let stores = sqlite_stores().await;
    let first = add_doctor(&stores, "Dr. Anna Meier").await;
    let second = add_doctor(&stores, "Dr. Luca Rossi").await;

    for (doctor, hour, minute) in [(first, 14, 0), (first, 15, 0), (second, 14, 30)] {
        stores
            .ledger
            .insert_appointment(appointment(doctor, hour, minute, "Jane Doe"))
            .await
            .unwrap();
    }

    let touching = stores
        .ledger
        .find_overlapping(first, date(), at(14, 30), at(15, 0))
        .await
        .unwrap();
    assert!(touching.is_empty());

    let straddling = stores
        .ledger
        .find_overlapping(first, date(), at(14, 15), at(15, 15))
        .await
        .unwrap();
    assert_eq!(
        straddling.iter().map(|a| a.start_time).collect::<Vec<_>>(),
        vec![at(14, 0), at(15, 0)]
    );

    let other_day = stores
        .ledger
        .find_overlapping(first, date().succ_opt().unwrap(), at(14, 0), at(14, 30))
        .await
        .unwrap();
    assert!(other_day.is_empty());
}

#[tokio::test]
async fn test_day_listing_is_ordered() {
    let stores = sqlite_stores().await;
    let doctor = add_doctor(&stores, "Dr. Anna Meier").await;

    for (hour, minute) in [(17, 30), (14, 0), (15, 30)] {
        stores
            .ledger
            .insert_appointment(appointment(doctor, hour, minute, "Jane Doe"))
            .await
            .unwrap();
    }

    let day = stores
        .ledger
        .list_for_doctor_on(doctor, date())
        .await
        .unwrap();
    assert_eq!(
        day.iter().map(|a| a.start_time).collect::<Vec<_>>(),
        vec![at(14, 0), at(15, 30), at(17, 30)]
    );
}

#[tokio::test]
async fn test_health_and_backend_name() {
    let stores = sqlite_stores().await;
    assert!(stores.ledger.ping().await.is_ok());
    assert_eq!(stores.ledger.backend_name(), "sqlite");

    let memory = StoreFactory::new().in_memory();
    assert_eq!(memory.ledger.backend_name(), "memory");
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let stores = sqlite_stores().await;
    let seeds = vec![
        DoctorSeed {
            name: "Dr. Anna Meier".to_string(),
            specialty: "General Practice".to_string(),
            max_patients: 9,
        },
        DoctorSeed {
            name: "Dr. Luca Rossi".to_string(),
            specialty: "Cardiology".to_string(),
            max_patients: 6,
        },
    ];

    assert_eq!(seed_doctors(stores.doctors.as_ref(), &seeds).await.unwrap(), 2);
    assert_eq!(seed_doctors(stores.doctors.as_ref(), &seeds).await.unwrap(), 0);
    assert_eq!(stores.doctors.list_doctors().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_factory_from_config_seeds_doctors() {
    let config = AppConfig {
        database: Some(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: None,
            acquire_timeout_secs: None,
        }),
        doctors: vec![DoctorSeed {
            name: "Dr. Anna Meier".to_string(),
            specialty: "General Practice".to_string(),
            max_patients: 9,
        }],
        ..AppConfig::default()
    };

    let stores = StoreFactory::new().from_app_config(&config).await.unwrap();
    let doctors = stores.doctors.list_doctors().await.unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].id, 1);
}
