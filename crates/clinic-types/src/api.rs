use serde::{Deserialize, Serialize};

use crate::models::User;

// -- Generic --

/// Body of every plain acknowledgement and every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// -- Appointments --

/// Raw booking request. Fields stay text until the workflow validates them.
#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub date: String,
    pub time: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Returned for both a full success and a booking whose confirmation mail
/// failed; `persisted` and `notified` tell the two apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentResponse {
    pub message: String,
    pub id: Option<i64>,
    pub persisted: bool,
    pub notified: bool,
}

// -- Email --

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    #[serde(alias = "recipient")]
    pub email: String,
    #[serde(rename = "emailSubject", alias = "subject")]
    pub subject: String,
    #[serde(rename = "emailBody", alias = "body")]
    pub body: String,
}

// -- Videos --

#[derive(Debug, Clone, Deserialize)]
pub struct AddVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "videourl")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddVideoResponse {
    pub message: String,
    pub id: i64,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
}
