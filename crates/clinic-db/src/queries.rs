use crate::Database;
use crate::models::{AppointmentRow, NewAppointmentRow, UserRow, VideoRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Appointments --

    /// Insert one appointment and return its store-assigned id.
    pub fn insert_appointment(&self, row: &NewAppointmentRow<'_>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO appointments (date, time, name, phone, email, message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![row.date, row.time, row.name, row.phone, row.email, row.message],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_appointments(&self) -> Result<Vec<AppointmentRow>> {
        self.with_conn(query_appointments)
    }

    /// Returns false when no appointment had this id.
    pub fn delete_appointment(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM appointments WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    // -- Videos --

    pub fn insert_video(&self, title: &str, description: &str, url: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO videos (title, description, url) VALUES (?1, ?2, ?3)",
                (title, description, url),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_videos(&self) -> Result<Vec<VideoRow>> {
        self.with_conn(query_videos)
    }

    /// Returns false when no video had this id.
    pub fn delete_video(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM videos WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    // -- Users --

    pub fn create_user(&self, email: &str, password_digest: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, password) VALUES (?1, ?2)",
                (email, password_digest),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All users registered under `email`, oldest first.
    pub fn get_users_by_email(&self, email: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| query_users_by_email(conn, email))
    }
}

// Newest first. created_at has one-second resolution so the id breaks ties.
fn query_appointments(conn: &Connection) -> Result<Vec<AppointmentRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, time, name, phone, email, message, created_at
         FROM appointments
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(AppointmentRow {
                id: row.get(0)?,
                date: row.get(1)?,
                time: row.get(2)?,
                name: row.get(3)?,
                phone: row.get(4)?,
                email: row.get(5)?,
                message: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_videos(conn: &Connection) -> Result<Vec<VideoRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, url, created_at
         FROM videos
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(VideoRow {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                url: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_users_by_email(conn: &Connection, email: &str) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, password, created_at FROM users WHERE email = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt
        .query_map([email], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking<'a>(name: &'a str) -> NewAppointmentRow<'a> {
        NewAppointmentRow {
            date: "2024-05-01",
            time: "10:00:00",
            name,
            phone: "555",
            email: "jo@x.com",
            message: Some("checkup"),
        }
    }

    #[test]
    fn appointments_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        for name in ["A", "B", "C"] {
            db.insert_appointment(&booking(name)).unwrap();
        }

        let names: Vec<String> = db
            .list_appointments()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[test]
    fn appointment_ids_are_increasing() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_appointment(&booking("A")).unwrap();
        let second = db.insert_appointment(&booking("B")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn same_slot_can_be_booked_twice() {
        let db = Database::open_in_memory().unwrap();
        db.insert_appointment(&booking("A")).unwrap();
        db.insert_appointment(&booking("B")).unwrap();
        assert_eq!(db.list_appointments().unwrap().len(), 2);
    }

    #[test]
    fn missing_message_is_stored_as_null() {
        let db = Database::open_in_memory().unwrap();
        let row = NewAppointmentRow {
            message: None,
            ..booking("A")
        };
        db.insert_appointment(&row).unwrap();

        let stored = db.list_appointments().unwrap();
        assert_eq!(stored[0].message, None);
    }

    #[test]
    fn delete_appointment_reports_missing_rows() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_appointment(&booking("A")).unwrap();

        assert!(db.delete_appointment(id).unwrap());
        assert!(!db.delete_appointment(id).unwrap());
        assert!(db.list_appointments().unwrap().is_empty());
    }

    #[test]
    fn videos_list_newest_first_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_video("Intro", "First", "https://v.example/1").unwrap();
        db.insert_video("Follow-up", "Second", "https://v.example/2").unwrap();

        let titles: Vec<String> = db.list_videos().unwrap().into_iter().map(|v| v.title).collect();
        assert_eq!(titles, ["Follow-up", "Intro"]);

        assert!(db.delete_video(first).unwrap());
        assert!(!db.delete_video(first).unwrap());
        assert_eq!(db.list_videos().unwrap().len(), 1);
    }

    #[test]
    fn users_by_email_come_back_oldest_first() {
        let db = Database::open_in_memory().unwrap();
        let first = db.create_user("u@x.com", "aaa").unwrap();
        let second = db.create_user("u@x.com", "bbb").unwrap();
        db.create_user("other@x.com", "ccc").unwrap();

        let ids: Vec<i64> = db
            .get_users_by_email("u@x.com")
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, [first, second]);
        assert!(db.get_users_by_email("nobody@x.com").unwrap().is_empty());
    }
}
