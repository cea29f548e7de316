//! Database row types. These map directly to SQLite rows.
//! Distinct from clinic-types API models to keep the DB layer independent.

pub struct AppointmentRow {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: Option<String>,
    pub created_at: String,
}

/// Column values for an appointment insert; id and created_at come from SQLite.
#[derive(Debug, Clone, Copy)]
pub struct NewAppointmentRow<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub message: Option<&'a str>,
}

pub struct VideoRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub created_at: String,
}

pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub created_at: String,
}
