// --- File: crates/clinic_booking/src/routes.rs ---

use crate::handlers::{
    availability_handler, create_appointment_handler, create_doctor_handler, get_appointment_handler,
    get_doctor_handler, health_handler, list_doctors_handler, BookingState,
};
use crate::logic::BookingRules;
use axum::{
    routing::{get, post},
    Router,
};
use clinic_common::ClinicError;
use clinic_config::AppConfig;
use clinic_db::StoreFactory;
use std::sync::Arc;
use tracing::info;

/// Creates the booking router from the application configuration.
///
/// Connects storage, creates the schema and seeds the configured doctors.
pub async fn routes(config: Arc<AppConfig>) -> Result<Router, ClinicError> {
    let rules = BookingRules::from_config(&config.booking)?;
    let stores = StoreFactory::new()
        .from_app_config(&config)
        .await
        .map_err(|e| ClinicError::DatabaseError(e.to_string()))?;

    if rules.enforce_capacity {
        info!("Daily doctor capacity is enforced");
    }

    Ok(router(Arc::new(BookingState::new(rules, stores))))
}

/// The booking routes over an already built state.
pub fn router(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/appointments", post(create_appointment_handler))
        .route("/appointments/{id}", get(get_appointment_handler))
        .route("/doctors", get(list_doctors_handler))
        .route("/doctors/{id}", get(get_doctor_handler))
        .route("/doctors/{id}/availability", get(availability_handler))
        .route("/admin/doctors", post(create_doctor_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
