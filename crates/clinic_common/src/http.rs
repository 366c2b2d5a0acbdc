// --- File: crates/clinic_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// JSON body returned for every rejected request:
/// `{"error": {"code": 400, "kind": "MissingField", "field": "patient_name", "message": "..."}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorDetail {
    pub code: u16,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field: Option<String>,
    pub message: String,
}

/// Build an error response with the shared body layout.
pub fn error_response(
    status_code: u16,
    kind: &str,
    field: Option<&str>,
    message: impl Into<String>,
) -> Response {
    let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody {
        error: ErrorDetail {
            code: status.as_u16(),
            kind: kind.to_string(),
            field: field.map(str::to_string),
            message: message.into(),
        },
    };
    (status, Json(body)).into_response()
}
