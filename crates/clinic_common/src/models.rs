// --- File: crates/clinic_common/src/models.rs ---

// Records shared by storage, booking logic and the HTTP layer.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Wire and storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire and storage format for wall-clock times (24-hour, minute precision).
pub const TIME_FORMAT: &str = "%H:%M";

/// A doctor patients can book appointments with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Doctor {
    #[cfg_attr(feature = "openapi", schema(example = 1))]
    pub id: i64,
    #[cfg_attr(feature = "openapi", schema(example = "Dr. Anna Meier"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "General Practice"))]
    pub specialty: String,
    /// Patients the doctor sees per day.
    #[cfg_attr(feature = "openapi", schema(example = 9))]
    pub max_patients: u32,
}

/// A doctor that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub max_patients: u32,
}

/// A booked appointment.
///
/// `end_time` is always derived from `start_time` by the booking logic; an
/// appointment is never modified once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Appointment {
    #[cfg_attr(feature = "openapi", schema(example = 42))]
    pub id: i64,
    #[serde(rename = "doctor")]
    #[cfg_attr(feature = "openapi", schema(example = 1))]
    pub doctor_id: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date, example = "2025-05-15"))]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "14:30"))]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "15:00"))]
    pub end_time: NaiveTime,
    #[cfg_attr(feature = "openapi", schema(example = "Jane Doe"))]
    pub patient_name: String,
}

/// An appointment that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub patient_name: String,
}

impl NewAppointment {
    /// Attach the identity assigned by storage.
    pub fn with_id(self, id: i64) -> Appointment {
        Appointment {
            id,
            doctor_id: self.doctor_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            patient_name: self.patient_name,
        }
    }

    /// The uniqueness key enforced by storage.
    pub fn slot_key(&self) -> (i64, NaiveDate, NaiveTime, NaiveTime) {
        (self.doctor_id, self.date, self.start_time, self.end_time)
    }
}

impl Appointment {
    pub fn slot_key(&self) -> (i64, NaiveDate, NaiveTime, NaiveTime) {
        (self.doctor_id, self.date, self.start_time, self.end_time)
    }
}

/// Serde adapter rendering [`NaiveTime`] as `HH:MM`.
pub mod hhmm {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
