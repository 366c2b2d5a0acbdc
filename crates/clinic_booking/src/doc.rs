// File: crates/clinic_booking/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers;
use crate::logic::{
    AvailabilityResponse, AvailableSlot, BookingRequest, HealthResponse, NewDoctorRequest,
};
use clinic_common::http::ErrorDetail;
use clinic_common::{Appointment, Doctor, ErrorBody};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_appointment_handler,
        handlers::get_appointment_handler,
        handlers::list_doctors_handler,
        handlers::get_doctor_handler,
        handlers::availability_handler,
        handlers::create_doctor_handler,
        handlers::health_handler
    ),
    components(
        schemas(
            BookingRequest,
            Appointment,
            Doctor,
            NewDoctorRequest,
            AvailableSlot,
            AvailabilityResponse,
            HealthResponse,
            ErrorBody,
            ErrorDetail
        )
    ),
    tags(
        (name = "Appointments", description = "Book and fetch appointments"),
        (name = "Doctors", description = "Doctor registry and daily availability"),
        (name = "Admin", description = "Registry administration"),
        (name = "Health", description = "Liveness of the service and its storage")
    ),
    servers(
        (url = "/api", description = "Clinic booking API server")
    )
)]
pub struct BookingApiDoc;
