// File: crates/clinic_booking/src/handlers.rs
use crate::error::BookingError;
use crate::logic::{
    available_slots, book, check_new_doctor, parse_date, AvailabilityQuery, AvailabilityResponse,
    BookingRequest, BookingRules, HealthResponse, NewDoctorRequest,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use clinic_common::models::DATE_FORMAT;
use clinic_common::{Appointment, AppointmentLedger, Doctor, DoctorRegistry};
use clinic_db::Stores;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[cfg(feature = "openapi")]
use clinic_common::ErrorBody;

// Shared state needed by the booking handlers
#[derive(Clone)]
pub struct BookingState {
    pub rules: BookingRules,
    pub doctors: Arc<dyn DoctorRegistry>,
    pub ledger: Arc<dyn AppointmentLedger>,
}

impl BookingState {
    pub fn new(rules: BookingRules, stores: Stores) -> Self {
        Self {
            rules,
            doctors: stores.doctors,
            ledger: stores.ledger,
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, BookingError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Unreadable request body: {}", rejection.body_text());
        BookingError::MalformedInput("body")
    })
}

fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, BookingError> {
    id.map(|Path(id)| id)
        .map_err(|_| BookingError::MalformedInput("id"))
}

/// Handler to book an appointment.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments",
    request_body(content = BookingRequest, example = json!({
        "doctor": 1,
        "date": "2025-05-15",
        "start_time": "14:30",
        "patient_name": "Jane Doe"
    })),
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Missing field, malformed value or start time outside the bookable slots", body = ErrorBody),
        (status = 404, description = "Unknown doctor", body = ErrorBody),
        (status = 409, description = "Slot already taken or doctor fully booked", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "Appointments"
))]
pub async fn create_appointment_handler(
    State(state): State<Arc<BookingState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), BookingError> {
    let request = json_body(payload)?;
    let appointment = book(
        &state.rules,
        state.doctors.as_ref(),
        state.ledger.as_ref(),
        request,
    )
    .await
    .map_err(|e| {
        if let BookingError::Storage(store) = &e {
            error!("Storage failure while booking: {}", store);
        }
        e
    })?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Handler to fetch a booked appointment.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "The appointment", body = Appointment),
        (status = 404, description = "Unknown appointment", body = ErrorBody)
    ),
    tag = "Appointments"
))]
pub async fn get_appointment_handler(
    State(state): State<Arc<BookingState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Appointment>, BookingError> {
    let id = path_id(id)?;
    debug!("Fetching appointment {}", id);
    state
        .ledger
        .get_appointment(id)
        .await?
        .map(Json)
        .ok_or(BookingError::NotFound("appointment"))
}

/// Handler to list all doctors.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/doctors",
    responses(
        (status = 200, description = "All doctors", body = Vec<Doctor>),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "Doctors"
))]
pub async fn list_doctors_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<Vec<Doctor>>, BookingError> {
    Ok(Json(state.doctors.list_doctors().await?))
}

/// Handler to fetch one doctor.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/doctors/{id}",
    params(("id" = i64, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "The doctor", body = Doctor),
        (status = 404, description = "Unknown doctor", body = ErrorBody)
    ),
    tag = "Doctors"
))]
pub async fn get_doctor_handler(
    State(state): State<Arc<BookingState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Doctor>, BookingError> {
    let id = path_id(id)?;
    state
        .doctors
        .get_doctor(id)
        .await?
        .map(Json)
        .ok_or(BookingError::NotFound("doctor"))
}

/// Handler to list the free slots of a doctor on one day.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/doctors/{id}/availability",
    params(("id" = i64, Path, description = "Doctor id"), AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots of the day", body = AvailabilityResponse),
        (status = 400, description = "Missing or malformed date", body = ErrorBody),
        (status = 404, description = "Unknown doctor", body = ErrorBody)
    ),
    tag = "Doctors"
))]
pub async fn availability_handler(
    State(state): State<Arc<BookingState>>,
    id: Result<Path<i64>, PathRejection>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, BookingError> {
    let id = path_id(id)?;
    let raw_date = query
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or(BookingError::MissingField("date"))?;
    let date = parse_date(raw_date)?;

    let doctor = state
        .doctors
        .get_doctor(id)
        .await?
        .ok_or(BookingError::NotFound("doctor"))?;

    let booked = state.ledger.list_for_doctor_on(doctor.id, date).await?;
    let slots = available_slots(&state.rules.policy, &booked);
    debug!(
        "Doctor {} has {} free slot(s) on {}",
        doctor.id,
        slots.len(),
        date
    );

    Ok(Json(AvailabilityResponse {
        doctor: doctor.id,
        date: date.format(DATE_FORMAT).to_string(),
        slots,
    }))
}

/// Handler to register a doctor.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/doctors",
    request_body = NewDoctorRequest,
    responses(
        (status = 201, description = "Doctor registered", body = Doctor),
        (status = 400, description = "Missing or malformed field", body = ErrorBody)
    ),
    tag = "Admin"
))]
pub async fn create_doctor_handler(
    State(state): State<Arc<BookingState>>,
    payload: Result<Json<NewDoctorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Doctor>), BookingError> {
    let new_doctor = check_new_doctor(&json_body(payload)?)?;
    let doctor = state.doctors.create_doctor(new_doctor).await?;
    info!("Registered doctor {} ({})", doctor.id, doctor.name);
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// Handler reporting whether storage answers.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and storage are up", body = HealthResponse),
        (status = 503, description = "Storage is not reachable", body = HealthResponse)
    ),
    tag = "Health"
))]
pub async fn health_handler(
    State(state): State<Arc<BookingState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let storage = state.ledger.backend_name().to_string();
    match state.ledger.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                storage,
            }),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    storage,
                }),
            )
        }
    }
}
