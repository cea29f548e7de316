use std::sync::Arc;

use clinic_db::Database;
use clinic_mail::Notifier;

use crate::auth::PasswordDigest;
use crate::booking::BookingWorkflow;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub booking: BookingWorkflow,
    pub notifier: Arc<dyn Notifier>,
    pub digest: Arc<dyn PasswordDigest>,
}

impl AppStateInner {
    /// The booking workflow persists through the same database handle.
    pub fn new(
        db: Arc<Database>,
        notifier: Arc<dyn Notifier>,
        digest: Arc<dyn PasswordDigest>,
    ) -> AppState {
        let booking = BookingWorkflow::new(db.clone(), notifier.clone());
        Arc::new(Self {
            db,
            booking,
            notifier,
            digest,
        })
    }
}
