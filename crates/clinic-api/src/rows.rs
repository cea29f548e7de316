//! Conversion from clinic-db rows to API models.
//!
//! A row whose stored date, time or timestamp no longer parses is never
//! reported with a made-up value: listings skip it with a warning and a login
//! lookup fails.

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use clinic_db::models::{AppointmentRow, UserRow, VideoRow};
use clinic_types::models::{Appointment, User, Video};

use crate::booking::parse_time;

/// `None` when the stored row is corrupt.
pub fn appointment(row: AppointmentRow) -> Option<Appointment> {
    let date = match NaiveDate::parse_from_str(&row.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            warn!("Skipping appointment {}: corrupt date '{}': {}", row.id, row.date, e);
            return None;
        }
    };
    let Some(time) = parse_time(&row.time) else {
        warn!("Skipping appointment {}: corrupt time '{}'", row.id, row.time);
        return None;
    };
    let created_at = timestamp(&row.created_at, "appointment", row.id)?;

    Some(Appointment {
        id: row.id,
        date,
        time,
        created_at,
        name: row.name,
        phone: row.phone,
        email: row.email,
        message: row.message,
    })
}

/// `None` when the stored row is corrupt.
pub fn video(row: VideoRow) -> Option<Video> {
    let created_at = timestamp(&row.created_at, "video", row.id)?;

    Some(Video {
        id: row.id,
        created_at,
        title: row.title,
        description: row.description,
        url: row.url,
    })
}

pub fn user(row: UserRow) -> anyhow::Result<User> {
    let created_at = timestamp(&row.created_at, "user", row.id)
        .ok_or_else(|| anyhow!("user {} has a corrupt created_at", row.id))?;

    Ok(User {
        id: row.id,
        created_at,
        email: row.email,
    })
}

fn timestamp(raw: &str, kind: &str, id: i64) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| warn!("Corrupt created_at '{}' on {} {}: {}", raw, kind, id, e))
        .ok()
}
