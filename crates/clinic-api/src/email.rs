use axum::{Json, extract::State};
use tracing::info;

use clinic_mail::Mail;
use clinic_types::api::{MessageResponse, SendEmailRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/send-email: forward an arbitrary message to the notifier.
pub async fn send_email(
    State(state): State<AppState>,
    Json(req): Json<SendEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mail = Mail {
        to: req.email,
        subject: req.subject,
        body: req.body,
    };

    state.notifier.send(&mail).await?;

    info!("Email sent to {}", mail.to);
    Ok(Json(MessageResponse::new("Email sent successfully!")))
}
