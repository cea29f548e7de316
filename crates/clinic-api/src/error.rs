use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use clinic_mail::MailError;
use clinic_types::api::MessageResponse;

/// Failure kinds surfaced to HTTP callers. The wrapped lower-level errors are
/// logged but never sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("persistence failed: {0:#}")]
    Persistence(anyhow::Error),

    #[error("notification failed: {0}")]
    Notification(MailError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid email or password")]
    Rejected,

    #[error("store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Notification(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Rejected => StatusCode::UNAUTHORIZED,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn client_message(&self) -> String {
        match self {
            ApiError::Validation(reason) => format!("Invalid request: {}", reason),
            ApiError::Persistence(_) => "Error saving record".into(),
            ApiError::Notification(_) => "Error sending email".into(),
            ApiError::NotFound(what) => format!("{} not found", what),
            ApiError::Rejected => "Invalid email or password".into(),
            ApiError::StoreUnavailable(_) => "Error reading from the database".into(),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::InvalidAddress(address) => {
                ApiError::Validation(format!("invalid email address '{}'", address))
            }
            other => ApiError::Notification(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Responding {}: {}", status, self);
        } else {
            warn!("Responding {}: {}", status, self);
        }

        (status, Json(MessageResponse::new(self.client_message()))).into_response()
    }
}
