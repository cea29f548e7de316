use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use clinic_types::api::{BookAppointmentRequest, BookAppointmentResponse, MessageResponse};
use clinic_types::models::Appointment;

use crate::booking::{BookingError, BookingKind};
use crate::error::ApiError;
use crate::state::AppState;
use crate::{rows, run_blocking};

/// POST /api/appointments
///
/// Every outcome carries `persisted` and `notified` so a client can tell a
/// stored booking with a failed email (502) from one that was never stored.
pub async fn book_appointment(
    State(state): State<AppState>,
    Json(req): Json<BookAppointmentRequest>,
) -> impl IntoResponse {
    let outcome = state.booking.book(&req).await;

    let (status, message) = match (outcome.kind(), &outcome.error) {
        (BookingKind::Success, _) => (
            StatusCode::CREATED,
            "Appointment booked successfully and confirmation email sent!".to_string(),
        ),
        (BookingKind::NotificationFailure, _) => (
            StatusCode::BAD_GATEWAY,
            "Appointment booked, but the confirmation email could not be sent".to_string(),
        ),
        (BookingKind::ValidationFailure, Some(BookingError::Validation(reason))) => {
            (StatusCode::BAD_REQUEST, format!("Invalid appointment: {}", reason))
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error booking appointment".to_string(),
        ),
    };

    (
        status,
        Json(BookAppointmentResponse {
            message,
            id: outcome.appointment_id,
            persisted: outcome.persisted,
            notified: outcome.notified,
        }),
    )
}

/// GET /api/getappointments, newest first.
pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let db = state.db.clone();
    let records = run_blocking(move || db.list_appointments())
        .await
        .map_err(ApiError::StoreUnavailable)?;

    Ok(Json(records.into_iter().filter_map(rows::appointment).collect()))
}

/// DELETE /api/deleteappointments/{id}
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let db = state.db.clone();
    let deleted = run_blocking(move || db.delete_appointment(id))
        .await
        .map_err(ApiError::StoreUnavailable)?;

    if !deleted {
        return Err(ApiError::NotFound("Appointment"));
    }

    info!("Appointment {} deleted", id);
    Ok(Json(MessageResponse::new("Appointment deleted successfully")))
}
