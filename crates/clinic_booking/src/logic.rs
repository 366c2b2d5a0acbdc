// --- File: crates/clinic_booking/src/logic.rs ---
use crate::error::BookingError;
use chrono::{Duration, NaiveDate, NaiveTime};
use clinic_common::models::{hhmm, DATE_FORMAT, TIME_FORMAT};
use clinic_common::{
    config_error, Appointment, AppointmentLedger, ClinicError, DoctorRegistry, NewAppointment,
    NewDoctor,
};
use clinic_config::BookingConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Data Structures ---

/// Body of `POST /appointments`.
///
/// Fields are kept as raw JSON values: presence is checked before type and
/// format, so a missing field is reported as `MissingField` instead of a
/// generic body failure. `doctor` may be a number or a numeric string.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i64>, example = 1))]
    pub doctor: Option<Value>,
    #[cfg_attr(
        feature = "openapi",
        schema(value_type = Option<String>, format = "date", example = "2025-05-15")
    )]
    pub date: Option<Value>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "14:30"))]
    pub start_time: Option<Value>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "Jane Doe"))]
    pub patient_name: Option<Value>,
}

/// Body of `POST /admin/doctors`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewDoctorRequest {
    #[cfg_attr(feature = "openapi", schema(example = "Dr. Luca Rossi"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "Cardiology"))]
    pub specialty: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = 6))]
    pub max_patients: Option<u32>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Day to list, in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-15"))]
    pub date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailableSlot {
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "14:00"))]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "14:30"))]
    pub end_time: NaiveTime,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailabilityResponse {
    pub doctor: i64,
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-15"))]
    pub date: String,
    pub slots: Vec<AvailableSlot>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthResponse {
    #[cfg_attr(feature = "openapi", schema(example = "ok"))]
    pub status: String,
    #[cfg_attr(feature = "openapi", schema(example = "sqlite"))]
    pub storage: String,
}

// --- Slot Policy ---

/// Clinic hours and the layout of bookable slots within them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPolicy {
    /// Nothing may start before this
    pub window_start: NaiveTime,
    /// Nothing may end after this
    pub window_end: NaiveTime,
    pub first_slot: NaiveTime,
    /// Last bookable start, inclusive
    pub last_slot: NaiveTime,
    pub slot_length: Duration,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            window_start: hm(14, 0),
            window_end: hm(19, 0),
            first_slot: hm(14, 0),
            last_slot: hm(18, 0),
            slot_length: Duration::minutes(30),
        }
    }
}

impl SlotPolicy {
    /// Build the policy from the `[booking]` section, rejecting layouts where
    /// a slot would fall outside the opening window.
    pub fn from_config(config: &BookingConfig) -> Result<Self, ClinicError> {
        let parse = |name: &str, raw: &str| {
            NaiveTime::parse_from_str(raw, TIME_FORMAT)
                .map_err(|e| config_error(format!("booking.{} = {:?}: {}", name, raw, e)))
        };

        if config.slot_minutes <= 0 {
            return Err(config_error(format!(
                "booking.slot_minutes must be positive, got {}",
                config.slot_minutes
            )));
        }

        let policy = Self {
            window_start: parse("window_start", &config.window_start)?,
            window_end: parse("window_end", &config.window_end)?,
            first_slot: parse("first_slot", &config.first_slot)?,
            last_slot: parse("last_slot", &config.last_slot)?,
            slot_length: Duration::try_minutes(config.slot_minutes).ok_or_else(|| {
                config_error(format!(
                    "booking.slot_minutes = {} is out of range",
                    config.slot_minutes
                ))
            })?,
        };

        if policy.first_slot > policy.last_slot {
            return Err(config_error("booking.first_slot is after booking.last_slot"));
        }
        if policy.first_slot < policy.window_start {
            return Err(config_error("booking.first_slot is before booking.window_start"));
        }
        let (last_end, wrapped) = policy.last_slot.overflowing_add_signed(policy.slot_length);
        if wrapped != 0 || last_end > policy.window_end {
            return Err(config_error(
                "the slot starting at booking.last_slot ends after booking.window_end",
            ));
        }

        Ok(policy)
    }

    /// Every bookable start time, earliest first.
    pub fn allowed_starts(&self) -> Vec<NaiveTime> {
        let mut starts = Vec::new();
        if self.slot_length <= Duration::zero() {
            return starts;
        }
        let mut current = self.first_slot;
        while current <= self.last_slot {
            starts.push(current);
            let (next, wrapped) = current.overflowing_add_signed(self.slot_length);
            if wrapped != 0 {
                break;
            }
            current = next;
        }
        starts
    }

    pub fn is_allowed_start(&self, start: NaiveTime) -> bool {
        if start < self.first_slot || start > self.last_slot {
            return false;
        }
        let step = self.slot_length.num_seconds();
        step > 0 && (start - self.first_slot).num_seconds() % step == 0
    }

    /// The derived end of a slot starting at `start`.
    pub fn end_for(&self, start: NaiveTime) -> NaiveTime {
        start.overflowing_add_signed(self.slot_length).0
    }
}

/// Slot policy plus the switches that decide which checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookingRules {
    pub policy: SlotPolicy,
    /// Refuse bookings once a doctor has `max_patients` appointments that day.
    pub enforce_capacity: bool,
}

impl BookingRules {
    pub fn from_config(config: &BookingConfig) -> Result<Self, ClinicError> {
        Ok(Self {
            policy: SlotPolicy::from_config(config)?,
            enforce_capacity: config.enforce_capacity,
        })
    }
}

// --- Validation ---

/// True when `[a_start, a_end)` and `[b_start, b_end)` share any instant.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && a_end > b_start
}

fn present<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, BookingError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(BookingError::MissingField(field)),
    }
}

/// A field counts as given unless it is absent, `null` or an empty string.
fn required<'a>(value: &'a Option<Value>, field: &'static str) -> Result<&'a Value, BookingError> {
    match value {
        None | Some(Value::Null) => Err(BookingError::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(BookingError::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn text<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, BookingError> {
    value.as_str().ok_or(BookingError::MalformedInput(field))
}

fn doctor_id(value: &Value) -> Result<i64, BookingError> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    id.ok_or(BookingError::MalformedInput("doctor"))
}

// `9` stands for an ASCII digit, anything else must match literally
fn has_shape(raw: &str, shape: &str) -> bool {
    raw.len() == shape.len()
        && raw.bytes().zip(shape.bytes()).all(|(c, s)| match s {
            b'9' => c.is_ascii_digit(),
            _ => c == s,
        })
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, BookingError> {
    if !has_shape(raw, "9999-99-99") {
        return Err(BookingError::MalformedInput("date"));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| BookingError::MalformedInput("date"))
}

/// Parse a strict 24-hour `HH:MM` time.
pub fn parse_start_time(raw: &str) -> Result<NaiveTime, BookingError> {
    if !has_shape(raw, "99:99") {
        return Err(BookingError::MalformedInput("start_time"));
    }
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|_| BookingError::MalformedInput("start_time"))
}

/// The checks that need no storage: presence, format and slot membership.
///
/// Presence of every field is checked before any format, `patient_name`
/// first. Only the patient name is trimmed. Returns the candidate appointment
/// with its end time derived.
pub fn check_request(
    policy: &SlotPolicy,
    request: &BookingRequest,
) -> Result<NewAppointment, BookingError> {
    let patient_name = match required(&request.patient_name, "patient_name")? {
        Value::String(name) if !name.trim().is_empty() => name.trim(),
        Value::String(_) => return Err(BookingError::MissingField("patient_name")),
        _ => return Err(BookingError::MalformedInput("patient_name")),
    };
    let start_raw = required(&request.start_time, "start_time")?;
    let date_raw = required(&request.date, "date")?;
    let doctor_raw = required(&request.doctor, "doctor")?;

    let date = parse_date(text(date_raw, "date")?)?;
    let start_time = parse_start_time(text(start_raw, "start_time")?)?;
    let doctor_id = doctor_id(doctor_raw)?;
    if !policy.is_allowed_start(start_time) {
        return Err(BookingError::InvalidSlot);
    }

    Ok(NewAppointment {
        doctor_id,
        date,
        start_time,
        end_time: policy.end_for(start_time),
        patient_name: patient_name.to_string(),
    })
}

/// Full-entity check run right before an appointment is stored.
///
/// `existing` should hold the doctor's appointments for the date; rows of
/// other doctors or dates and the row with `own_id` are ignored.
pub fn validate_appointment(
    policy: &SlotPolicy,
    candidate: &NewAppointment,
    own_id: Option<i64>,
    existing: &[Appointment],
) -> Result<(), BookingError> {
    if candidate.start_time < policy.window_start || candidate.end_time > policy.window_end {
        return Err(BookingError::InvalidEntity(format!(
            "{}-{} lies outside opening hours {}-{}",
            candidate.start_time.format(TIME_FORMAT),
            candidate.end_time.format(TIME_FORMAT),
            policy.window_start.format(TIME_FORMAT),
            policy.window_end.format(TIME_FORMAT),
        )));
    }

    if candidate.end_time - candidate.start_time != policy.slot_length {
        return Err(BookingError::InvalidEntity(format!(
            "appointment must last exactly {} minutes",
            policy.slot_length.num_minutes()
        )));
    }

    let clash = existing.iter().any(|other| {
        Some(other.id) != own_id
            && other.doctor_id == candidate.doctor_id
            && other.date == candidate.date
            && overlaps(
                other.start_time,
                other.end_time,
                candidate.start_time,
                candidate.end_time,
            )
    });
    if clash {
        return Err(BookingError::ConflictingAppointment);
    }
    Ok(())
}

/// [`validate_appointment`] for an appointment that is already stored.
pub fn validate_stored_appointment(
    policy: &SlotPolicy,
    appointment: &Appointment,
    existing: &[Appointment],
) -> Result<(), BookingError> {
    let candidate = NewAppointment {
        doctor_id: appointment.doctor_id,
        date: appointment.date,
        start_time: appointment.start_time,
        end_time: appointment.end_time,
        patient_name: appointment.patient_name.clone(),
    };
    validate_appointment(policy, &candidate, Some(appointment.id), existing)
}

// --- Booking ---

/// Validate a booking request and store it.
///
/// The first failing check decides the rejection and nothing is written. A
/// concurrent booking that wins the race for the same slot surfaces as
/// [`BookingError::ConflictingAppointment`] through the storage constraint.
pub async fn book(
    rules: &BookingRules,
    doctors: &dyn DoctorRegistry,
    ledger: &dyn AppointmentLedger,
    request: BookingRequest,
) -> Result<Appointment, BookingError> {
    debug!("Booking request: {:?}", request);

    let candidate = check_request(&rules.policy, &request).map_err(|e| {
        warn!("Booking rejected: {}", e);
        e
    })?;

    let doctor = doctors
        .get_doctor(candidate.doctor_id)
        .await?
        .ok_or_else(|| {
            warn!("Booking rejected: doctor {} does not exist", candidate.doctor_id);
            BookingError::NotFound("doctor")
        })?;

    let overlapping = ledger
        .find_overlapping(
            doctor.id,
            candidate.date,
            candidate.start_time,
            candidate.end_time,
        )
        .await?;
    if !overlapping.is_empty() {
        warn!(
            "Booking rejected: doctor {} already has {} appointment(s) overlapping {} {}",
            doctor.id,
            overlapping.len(),
            candidate.date,
            candidate.start_time
        );
        return Err(BookingError::ConflictingAppointment);
    }

    let day = ledger.list_for_doctor_on(doctor.id, candidate.date).await?;
    if rules.enforce_capacity && day.len() >= doctor.max_patients as usize {
        warn!(
            "Booking rejected: doctor {} is full on {} ({} of {})",
            doctor.id,
            candidate.date,
            day.len(),
            doctor.max_patients
        );
        return Err(BookingError::CapacityReached);
    }

    validate_appointment(&rules.policy, &candidate, None, &day)?;

    let stored = ledger.insert_appointment(candidate).await.map_err(|e| {
        let err = BookingError::from(e);
        warn!("Booking rejected at insert: {}", err);
        err
    })?;

    info!(
        "Booked appointment {} with doctor {} on {} at {}",
        stored.id,
        stored.doctor_id,
        stored.date,
        stored.start_time.format(TIME_FORMAT)
    );
    Ok(stored)
}

// --- Availability ---

/// The bookable slots of a day that do not overlap any of `booked`.
pub fn available_slots(policy: &SlotPolicy, booked: &[Appointment]) -> Vec<AvailableSlot> {
    policy
        .allowed_starts()
        .into_iter()
        .map(|start| AvailableSlot {
            start_time: start,
            end_time: policy.end_for(start),
        })
        .filter(|slot| {
            !booked
                .iter()
                .any(|a| overlaps(a.start_time, a.end_time, slot.start_time, slot.end_time))
        })
        .collect()
}

// --- Doctors ---

pub fn check_new_doctor(request: &NewDoctorRequest) -> Result<NewDoctor, BookingError> {
    let name = present(&request.name, "name")?;
    let specialty = present(&request.specialty, "specialty")?;
    let max_patients = request
        .max_patients
        .ok_or(BookingError::MissingField("max_patients"))?;

    Ok(NewDoctor {
        name: name.to_string(),
        specialty: specialty.to_string(),
        max_patients,
    })
}
