//! Appointment booking: validate, persist, then notify.
//!
//! The store is the source of truth. The confirmation mail is advisory: when
//! it fails the stored appointment is kept and the outcome reports
//! `persisted = true, notified = false`.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::{error, info, warn};

use clinic_db::Database;
use clinic_db::models::NewAppointmentRow;
use clinic_mail::{Mail, MailError, Notifier, parse_address};
use clinic_types::api::BookAppointmentRequest;

use crate::run_blocking;

pub const CONFIRMATION_SUBJECT: &str = "Appointment Confirmation";

/// The write half of the store the workflow depends on.
pub trait AppointmentStore: Send + Sync {
    /// Insert one appointment and return its id. Must be committed on return.
    fn insert_appointment(&self, row: &NewAppointmentRow<'_>) -> Result<i64>;
}

impl AppointmentStore for Database {
    fn insert_appointment(&self, row: &NewAppointmentRow<'_>) -> Result<i64> {
        Database::insert_appointment(self, row)
    }
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("invalid booking: {0}")]
    Validation(String),

    #[error("appointment was not stored: {0:#}")]
    Persistence(anyhow::Error),

    #[error("appointment stored but confirmation not sent: {0}")]
    Notification(MailError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingKind {
    Success,
    ValidationFailure,
    PersistenceFailure,
    NotificationFailure,
}

/// Result of one booking attempt. `persisted` and `notified` are independent
/// so callers can tell "saved but not emailed" from "not saved".
#[derive(Debug)]
pub struct BookingOutcome {
    pub appointment_id: Option<i64>,
    pub persisted: bool,
    pub notified: bool,
    pub error: Option<BookingError>,
}

impl BookingOutcome {
    fn failed(error: BookingError) -> Self {
        Self {
            appointment_id: None,
            persisted: false,
            notified: false,
            error: Some(error),
        }
    }

    pub fn kind(&self) -> BookingKind {
        match (&self.error, self.persisted, self.notified) {
            (_, true, true) => BookingKind::Success,
            (Some(BookingError::Validation(_)), _, _) => BookingKind::ValidationFailure,
            (_, false, _) => BookingKind::PersistenceFailure,
            (_, true, false) => BookingKind::NotificationFailure,
        }
    }
}

/// A request that passed validation. Fields are the submitted text with
/// surrounding whitespace removed; the same values are stored and mailed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBooking {
    pub date: String,
    pub time: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: Option<String>,
}

impl ValidBooking {
    fn store(&self, store: &dyn AppointmentStore) -> Result<i64> {
        store.insert_appointment(&NewAppointmentRow {
            date: &self.date,
            time: &self.time,
            name: &self.name,
            phone: &self.phone,
            email: &self.email,
            message: self.message.as_deref(),
        })
    }
}

pub fn validate(req: &BookAppointmentRequest) -> Result<ValidBooking, String> {
    let date = req.date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("date '{}' is not YYYY-MM-DD", req.date))?;
    let time = req.time.trim();
    parse_time(time).ok_or_else(|| format!("time '{}' is not HH:MM or HH:MM:SS", req.time))?;

    for (field, value) in [("name", &req.name), ("phone", &req.phone), ("email", &req.email)] {
        if value.trim().is_empty() {
            return Err(format!("{} is required", field));
        }
    }

    // Same parser the SMTP transport uses, so a stored booking is always mailable.
    let email = req.email.trim();
    parse_address(email).map_err(|_| format!("email '{}' is not an address", req.email))?;

    Ok(ValidBooking {
        date: date.to_string(),
        time: time.to_string(),
        name: req.name.trim().to_string(),
        phone: req.phone.trim().to_string(),
        email: email.to_string(),
        message: req.message.clone(),
    })
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Confirmation mail for a booking. Fields are interpolated without escaping.
pub fn confirmation_mail(booking: &ValidBooking) -> Mail {
    let body = format!(
        "Dear Doctor,\n\nYou have a new appointment booked with the following details:\n\n\
         Name: {}\nPhone: {}\nEmail: {}\nDate: {}\nTime: {}\nMessage: {}\n\nThank you!",
        booking.name,
        booking.phone,
        booking.email,
        booking.date,
        booking.time,
        booking.message.as_deref().unwrap_or_default(),
    );

    Mail {
        to: booking.email.clone(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        body,
    }
}

#[derive(Clone)]
pub struct BookingWorkflow {
    store: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
}

impl BookingWorkflow {
    pub fn new(store: Arc<dyn AppointmentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Validate, persist, then send the confirmation. The send happens only
    /// after the insert has committed; nothing is retried or rolled back.
    pub async fn book(&self, req: &BookAppointmentRequest) -> BookingOutcome {
        let booking = match validate(req) {
            Ok(booking) => booking,
            Err(reason) => {
                warn!("Rejected booking request: {}", reason);
                return BookingOutcome::failed(BookingError::Validation(reason));
            }
        };

        let mail = confirmation_mail(&booking);
        let store = self.store.clone();
        let id = match run_blocking(move || booking.store(store.as_ref())).await {
            Ok(id) => id,
            Err(e) => {
                error!("Error booking appointment: {:#}", e);
                return BookingOutcome::failed(BookingError::Persistence(e));
            }
        };
        info!("Appointment {} stored for {}", id, mail.to);

        match self.notifier.send(&mail).await {
            Ok(()) => {
                info!("Confirmation for appointment {} sent to {}", id, mail.to);
                BookingOutcome {
                    appointment_id: Some(id),
                    persisted: true,
                    notified: true,
                    error: None,
                }
            }
            Err(e) => {
                error!("Appointment {} stored but confirmation to {} failed: {}", id, mail.to, e);
                BookingOutcome {
                    appointment_id: Some(id),
                    persisted: true,
                    notified: false,
                    error: Some(BookingError::Notification(e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<Mail>>,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn attempts(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, mail: &Mail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(mail.clone());
            if self.fail {
                Err(MailError::Refused("421 service not available".into()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct BrokenStore {
        calls: AtomicUsize,
    }

    impl AppointmentStore for BrokenStore {
        fn insert_appointment(&self, _row: &NewAppointmentRow<'_>) -> Result<i64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("database is locked"))
        }
    }

    fn jo() -> BookAppointmentRequest {
        BookAppointmentRequest {
            date: "2024-05-01".into(),
            time: "10:00".into(),
            name: "Jo".into(),
            phone: "555".into(),
            email: "jo@x.com".into(),
            message: Some("checkup".into()),
        }
    }

    fn workflow(
        db: &Arc<Database>,
        notifier: &Arc<RecordingNotifier>,
    ) -> BookingWorkflow {
        BookingWorkflow::new(db.clone(), notifier.clone())
    }

    #[tokio::test]
    async fn stores_and_notifies_on_success() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome = workflow(&db, &notifier).book(&jo()).await;

        assert_eq!(outcome.kind(), BookingKind::Success);
        assert!(outcome.persisted && outcome.notified);
        assert!(outcome.error.is_none());

        let rows = db.list_appointments().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(Some(rows[0].id), outcome.appointment_id);
        assert_eq!(notifier.attempts(), 1);
    }

    #[tokio::test]
    async fn failed_notification_keeps_the_appointment() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::failing());

        let outcome = workflow(&db, &notifier).book(&jo()).await;

        assert_eq!(outcome.kind(), BookingKind::NotificationFailure);
        assert!(outcome.persisted);
        assert!(!outcome.notified);
        assert!(matches!(outcome.error, Some(BookingError::Notification(_))));

        let rows = db.list_appointments().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.date, "2024-05-01");
        assert_eq!(row.time, "10:00");
        assert_eq!(row.name, "Jo");
        assert_eq!(row.phone, "555");
        assert_eq!(row.email, "jo@x.com");
        assert_eq!(row.message.as_deref(), Some("checkup"));
    }

    #[tokio::test]
    async fn store_failure_skips_notification() {
        let store = Arc::new(BrokenStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let workflow = BookingWorkflow::new(store.clone(), notifier.clone());

        let outcome = workflow.book(&jo()).await;

        assert_eq!(outcome.kind(), BookingKind::PersistenceFailure);
        assert!(!outcome.persisted && !outcome.notified);
        assert_eq!(outcome.appointment_id, None);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn invalid_request_touches_nothing() {
        let store = Arc::new(BrokenStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let workflow = BookingWorkflow::new(store.clone(), notifier.clone());

        let req = BookAppointmentRequest {
            date: "next tuesday".into(),
            ..jo()
        };
        let outcome = workflow.book(&req).await;

        assert_eq!(outcome.kind(), BookingKind::ValidationFailure);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn double_booking_the_same_slot_is_allowed() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());
        let workflow = workflow(&db, &notifier);

        assert_eq!(workflow.book(&jo()).await.kind(), BookingKind::Success);
        assert_eq!(workflow.book(&jo()).await.kind(), BookingKind::Success);
        assert_eq!(db.list_appointments().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn confirmation_goes_to_the_booking_email() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());

        workflow(&db, &notifier).book(&jo()).await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].to, "jo@x.com");
        assert_eq!(sent[0].subject, CONFIRMATION_SUBJECT);
    }

    #[test]
    fn confirmation_body_interpolates_fields_verbatim() {
        let req = BookAppointmentRequest {
            message: Some("<b>knee</b> & back".into()),
            ..jo()
        };
        let mail = confirmation_mail(&validate(&req).unwrap());

        assert!(mail.body.starts_with("Dear Doctor,\n\n"));
        assert!(mail.body.contains("Name: Jo\nPhone: 555\nEmail: jo@x.com\n"));
        assert!(mail.body.contains("Date: 2024-05-01\nTime: 10:00\n"));
        assert!(mail.body.contains("Message: <b>knee</b> & back\n"));
        assert!(mail.body.ends_with("Thank you!"));
    }

    #[test]
    fn missing_message_renders_empty() {
        let req = BookAppointmentRequest {
            message: None,
            ..jo()
        };
        let booking = validate(&req).unwrap();
        assert!(confirmation_mail(&booking).body.contains("Message: \n"));
    }

    #[test]
    fn validation_accepts_both_time_formats() {
        assert!(validate(&jo()).is_ok());
        let with_seconds = BookAppointmentRequest {
            time: "10:00:30".into(),
            ..jo()
        };
        assert_eq!(validate(&with_seconds).unwrap().time, "10:00:30");
    }

    #[test]
    fn validation_rejects_bad_fields() {
        let cases = [
            BookAppointmentRequest { date: "2024-13-01".into(), ..jo() },
            BookAppointmentRequest { time: "25:00".into(), ..jo() },
            BookAppointmentRequest { name: "  ".into(), ..jo() },
            BookAppointmentRequest { phone: String::new(), ..jo() },
            BookAppointmentRequest { email: "jo.x.com".into(), ..jo() },
            BookAppointmentRequest { email: "@x.com".into(), ..jo() },
            BookAppointmentRequest { email: "jo@".into(), ..jo() },
            BookAppointmentRequest { email: "jo smith@x.com".into(), ..jo() },
        ];

        for req in cases {
            assert!(validate(&req).is_err(), "accepted {:?}", req);
        }
    }

    #[tokio::test]
    async fn unmailable_address_is_rejected_before_storing() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());

        let req = BookAppointmentRequest {
            email: "jo smith@x.com".into(),
            ..jo()
        };
        let outcome = workflow(&db, &notifier).book(&req).await;

        assert_eq!(outcome.kind(), BookingKind::ValidationFailure);
        assert!(!outcome.persisted);
        assert!(db.list_appointments().unwrap().is_empty());
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn stored_row_and_mail_carry_the_same_values() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());

        let req = BookAppointmentRequest {
            date: " 2024-05-01 ".into(),
            time: "10:00 ".into(),
            name: " Jo ".into(),
            phone: "555 ".into(),
            email: " jo@x.com".into(),
            message: Some(" checkup ".into()),
        };
        let outcome = workflow(&db, &notifier).book(&req).await;
        assert_eq!(outcome.kind(), BookingKind::Success);

        let rows = db.list_appointments().unwrap();
        let row = &rows[0];
        let sent = notifier.sent.lock().unwrap();
        let mail = &sent[0];

        assert_eq!(mail.to, row.email);
        assert_eq!(row.email, "jo@x.com");
        let expected = format!(
            "Name: {}\nPhone: {}\nEmail: {}\nDate: {}\nTime: {}\nMessage: {}\n",
            row.name,
            row.phone,
            row.email,
            row.date,
            row.time,
            row.message.as_deref().unwrap_or_default(),
        );
        assert!(mail.body.contains(&expected), "{}", mail.body);
        assert_eq!(row.name, "Jo");
        assert_eq!(row.message.as_deref(), Some(" checkup "));
    }
}
