use sea_orm::DatabaseConnection;
use services::{
    enrollment::ModuleRoleDirectory,
    marking::AttendanceMarker,
    notification::NotificationSink,
    session_manager::SessionManager,
    settings::AttendanceSettings,
    verifier::CheckInVerifier,
};
use std::sync::Arc;

/// Shared handles for every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    sessions: SessionManager,
    verifier: CheckInVerifier,
    marker: AttendanceMarker,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<dyn NotificationSink>,
        settings: AttendanceSettings,
    ) -> Self {
        let directory = ModuleRoleDirectory::new(db.clone());
        Self {
            sessions: SessionManager::new(db.clone(), settings),
            verifier: CheckInVerifier::new(db.clone(), directory.clone()),
            marker: AttendanceMarker::new(db.clone(), directory, notifier),
            db,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn verifier(&self) -> &CheckInVerifier {
        &self.verifier
    }

    pub fn marker(&self) -> &AttendanceMarker {
        &self.marker
    }
}
