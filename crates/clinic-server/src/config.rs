use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use clinic_mail::SmtpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    Sha256,
    Argon2,
}

/// Optional account created at startup when no user has this email yet.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// None when no SMTP credentials are set; mail is then only logged.
    pub smtp: Option<SmtpConfig>,
    pub password_scheme: PasswordScheme,
    pub seed_user: Option<SeedUser>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let host = var("CLINIC_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("CLINIC_PORT")
            .or_else(|| var("PORT"))
            .unwrap_or_else(|| "5002".into())
            .parse()
            .context("CLINIC_PORT must be a port number")?;
        let db_path = var("CLINIC_DB_PATH").unwrap_or_else(|| "clinic.db".into()).into();

        let smtp = match (
            var("CLINIC_SMTP_USER").or_else(|| var("EMAIL")),
            var("CLINIC_SMTP_PASS").or_else(|| var("PASS")),
        ) {
            (Some(username), Some(password)) => Some(SmtpConfig {
                host: var("CLINIC_SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".into()),
                port: var("CLINIC_SMTP_PORT")
                    .unwrap_or_else(|| "587".into())
                    .parse()
                    .context("CLINIC_SMTP_PORT must be a port number")?,
                from: var("CLINIC_MAIL_FROM").unwrap_or_else(|| username.clone()),
                username,
                password,
            }),
            _ => None,
        };

        let password_scheme = match var("CLINIC_PASSWORD_SCHEME").as_deref() {
            None | Some("sha256") => PasswordScheme::Sha256,
            Some("argon2") => PasswordScheme::Argon2,
            Some(other) => bail!("CLINIC_PASSWORD_SCHEME must be sha256 or argon2, got '{}'", other),
        };

        let seed_user = match (var("CLINIC_ADMIN_EMAIL"), var("CLINIC_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedUser { email, password }),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            db_path,
            smtp,
            password_scheme,
            seed_user,
        })
    }
}
