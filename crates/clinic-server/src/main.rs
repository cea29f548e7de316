mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use clinic_api::AppStateInner;
use clinic_api::auth::{Argon2Digest, PasswordDigest, Sha256Digest};
use clinic_db::Database;
use clinic_mail::{LogNotifier, Notifier, SmtpNotifier};

use crate::config::{Config, PasswordScheme, SeedUser};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "clinic=debug,clinic_api=debug,clinic_mail=debug,clinic_db=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            warn!("No SMTP credentials set (CLINIC_SMTP_USER/CLINIC_SMTP_PASS); emails will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let digest: Arc<dyn PasswordDigest> = match config.password_scheme {
        PasswordScheme::Sha256 => Arc::new(Sha256Digest),
        PasswordScheme::Argon2 => Arc::new(Argon2Digest),
    };

    if let Some(seed) = &config.seed_user {
        seed_user(&db, digest.as_ref(), seed)?;
    }

    let state = AppStateInner::new(db, notifier, digest);

    let app = clinic_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Clinic server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn seed_user(db: &Database, digest: &dyn PasswordDigest, seed: &SeedUser) -> anyhow::Result<()> {
    if !db.get_users_by_email(&seed.email)?.is_empty() {
        return Ok(());
    }

    let id = db.create_user(&seed.email, &digest.digest(&seed.password)?)?;
    info!("Seeded user {} ({})", id, seed.email);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
