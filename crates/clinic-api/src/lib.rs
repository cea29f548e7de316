pub mod appointments;
pub mod auth;
pub mod booking;
pub mod email;
pub mod error;
pub mod rows;
pub mod state;
pub mod videos;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tracing::error;

pub use state::{AppState, AppStateInner};

/// All HTTP routes. CORS and tracing layers are added by the server binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/appointments", post(appointments::book_appointment))
        .route("/api/getappointments", get(appointments::list_appointments))
        .route("/api/deleteappointments/{id}", delete(appointments::delete_appointment))
        .route("/api/send-email", post(email::send_email))
        .route("/api/add-video", post(videos::add_video))
        .route("/api/get-videos", get(videos::list_videos))
        .route("/api/delete-video/{id}", delete(videos::delete_video))
        .route("/api/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Run blocking store work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        anyhow::anyhow!("blocking task failed: {}", e)
    })?
}
