use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};
use sha2::{Digest, Sha256};
use tracing::info;

use clinic_db::Database;
use clinic_types::api::{LoginRequest, LoginResponse};
use clinic_types::models::User;

use crate::error::ApiError;
use crate::state::AppState;
use crate::{rows, run_blocking};

/// How stored passwords are produced and checked.
pub trait PasswordDigest: Send + Sync {
    fn digest(&self, password: &str) -> anyhow::Result<String>;

    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Unsalted SHA-256 as lowercase hex. Weak, but matches existing user rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Digest;

impl PasswordDigest for Sha256Digest {
    fn digest(&self, password: &str) -> anyhow::Result<String> {
        Ok(hex::encode(Sha256::digest(password.as_bytes())))
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        self.digest(password).is_ok_and(|d| d == stored)
    }
}

/// Salted Argon2id in PHC string format.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Digest;

impl PasswordDigest for Argon2Digest {
    fn digest(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Argon2 hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(User),
    Rejected,
}

/// Check `password` against every user stored under `email`, oldest first.
/// The first row that verifies wins.
pub fn authenticate(
    db: &Database,
    digest: &dyn PasswordDigest,
    email: &str,
    password: &str,
) -> anyhow::Result<AuthOutcome> {
    let matched = db
        .get_users_by_email(email)?
        .into_iter()
        .find(|user| digest.verify(password, &user.password));

    match matched {
        Some(row) => Ok(AuthOutcome::Authenticated(rows::user(row)?)),
        None => Ok(AuthOutcome::Rejected),
    }
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let db = state.db.clone();
    let digest = state.digest.clone();
    let outcome = run_blocking(move || authenticate(&db, digest.as_ref(), &req.email, &req.password))
        .await
        .map_err(ApiError::StoreUnavailable)?;

    match outcome {
        AuthOutcome::Authenticated(user) => {
            info!("User {} logged in", user.id);
            Ok(Json(LoginResponse {
                message: "Login successful!".into(),
                user,
            }))
        }
        AuthOutcome::Rejected => Err(ApiError::Rejected),
    }
}
