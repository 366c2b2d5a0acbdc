// File: services/clinic_backend/src/app.rs
use axum::{routing::get, Router};
use clinic_booking::routes as booking_routes;
use clinic_common::ClinicError;
use clinic_config::AppConfig;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Assemble the full application: booking routes under `/api`, Swagger UI
/// when the `openapi` feature is on, and request tracing.
pub async fn build_app(config: Arc<AppConfig>) -> Result<Router, ClinicError> {
    let booking_router = booking_routes::routes(config.clone()).await?;

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the clinic booking API!" }))
        .merge(booking_router);

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use clinic_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Clinic Booking API",
                version = "0.1.0",
                description = "Doctor appointment booking service",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    info!(
        "Application assembled ({} seeded doctor(s) configured)",
        config.doctors.len()
    );
    Ok(app.layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use clinic_config::DoctorSeed;
    use tower::ServiceExt;

    fn config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            doctors: vec![DoctorSeed {
                name: "Dr. Anna Meier".to_string(),
                specialty: "General Practice".to_string(),
                max_patients: 9,
            }],
            ..AppConfig::default()
        })
    }

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_routes_are_nested_under_api() {
        let app = build_app(config()).await.unwrap();
        assert_eq!(status_of(app.clone(), "/api/health").await, StatusCode::OK);
        assert_eq!(status_of(app.clone(), "/api/doctors").await, StatusCode::OK);
        assert_eq!(status_of(app.clone(), "/api").await, StatusCode::OK);
        assert_eq!(status_of(app, "/doctors").await, StatusCode::NOT_FOUND);
    }

    #[cfg(feature = "openapi")]
    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = build_app(config()).await.unwrap();
        assert_eq!(
            status_of(app, "/api/docs/openapi.json").await,
            StatusCode::OK
        );
    }
}
