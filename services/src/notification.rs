use async_trait::async_trait;
use db::models::attendance_record::Model as AttendanceRecord;

/// Kind tag carried by every attendance notice.
pub const ATTENDANCE_KIND: &str = "attendance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
}

impl Notice {
    /// Notice telling a student about a manual mark on their record.
    pub fn for_mark(record: &AttendanceRecord) -> Self {
        let mut message = format!(
            "You were marked {} for module {} on {}.",
            record.status, record.module_id, record.date
        );
        if let Some(remarks) = record.remarks.as_deref() {
            message.push_str(&format!(" Remarks: {remarks}"));
        }

        Self {
            user_id: record.user_id,
            kind: ATTENDANCE_KIND.to_owned(),
            title: format!("Attendance marked {}", record.status),
            message,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound channel for user-facing notices. Delivery is best effort.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notice: Notice) -> Result<(), NotifyError>;
}

/// Sink that only writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, notice: Notice) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = notice.user_id,
            kind = %notice.kind,
            title = %notice.title,
            "Notification"
        );
        Ok(())
    }
}

/// Sends every notice, logging and discarding failures.
pub(crate) async fn deliver_all(sink: &dyn NotificationSink, notices: Vec<Notice>) {
    for notice in notices {
        let user_id = notice.user_id;
        if let Err(e) = sink.notify(notice).await {
            tracing::warn!(user_id, error = %e, "Failed to deliver attendance notification");
        }
    }
}
