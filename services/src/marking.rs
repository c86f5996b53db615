//! Instructor-driven attendance marks, single and bulk.

use chrono::{DateTime, NaiveDate, Utc};
use db::models::attendance_record::{AttendanceStatus, ManualMark, Model as AttendanceRecord};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::enrollment::{EnrollmentDirectory, ModuleRoleDirectory};
use crate::error::{AttendanceError, AttendanceResult};
use crate::notification::{Notice, NotificationSink, deliver_all};

const MAX_REMARKS_LEN: usize = 1000;
const MAX_BATCH: usize = 1000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkEntry {
    pub user_id: i64,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkItemError {
    pub user_id: i64,
    pub kind: String,
    pub message: String,
}

impl BulkItemError {
    fn new(user_id: i64, err: &AttendanceError) -> Self {
        Self {
            user_id,
            kind: err.kind().to_owned(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkMarkOutcome {
    /// Distinct students written; repeated entries for one student count once.
    pub marked_count: usize,
    pub errors: Vec<BulkItemError>,
}

#[derive(Clone)]
pub struct AttendanceMarker<E = ModuleRoleDirectory> {
    db: DatabaseConnection,
    enrollment: E,
    notifier: Arc<dyn NotificationSink>,
}

impl<E> AttendanceMarker<E>
where
    E: EnrollmentDirectory,
{
    pub fn new(db: DatabaseConnection, enrollment: E, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            db,
            enrollment,
            notifier,
        }
    }

    /// Marks one enrollment for one day, overwriting any earlier mark.
    ///
    /// Absent and late marks notify the student once the write is stored.
    pub async fn mark_manual(
        &self,
        mut mark: ManualMark,
        now: DateTime<Utc>,
    ) -> AttendanceResult<AttendanceRecord> {
        mark.remarks = clean_remarks(mark.remarks)?;

        if !self
            .enrollment
            .is_actively_enrolled(mark.user_id, mark.module_id)
            .await?
        {
            return Err(AttendanceError::NotEnrolled);
        }

        let record = AttendanceRecord::upsert_manual(&self.db, mark, now).await?;
        tracing::info!(
            user_id = record.user_id,
            module_id = record.module_id,
            date = %record.date,
            status = %record.status,
            marked_by = record.marked_by,
            "Attendance marked"
        );

        if record.status.is_noteworthy() {
            deliver_all(self.notifier.as_ref(), vec![Notice::for_mark(&record)]).await;
        }
        Ok(record)
    }

    /// Marks many enrollments for one day in a single transaction.
    ///
    /// Unenrolled users are reported per item and skipped. A storage failure
    /// rolls back every item. Within one batch the last entry for a user wins.
    pub async fn mark_bulk(
        &self,
        module_id: i64,
        date: NaiveDate,
        entries: Vec<BulkEntry>,
        marked_by: i64,
        now: DateTime<Utc>,
    ) -> AttendanceResult<BulkMarkOutcome> {
        if entries.is_empty() {
            return Err(AttendanceError::malformed("entries must not be empty"));
        }
        if entries.len() > MAX_BATCH {
            return Err(AttendanceError::malformed(format!(
                "at most {MAX_BATCH} entries per batch"
            )));
        }

        let mut marks = Vec::with_capacity(entries.len());
        for entry in entries {
            marks.push(ManualMark {
                user_id: entry.user_id,
                module_id,
                date,
                status: entry.status,
                marked_by,
                remarks: clean_remarks(entry.remarks)?,
            });
        }

        // Resolved before the transaction so the lookup never waits on it.
        let ids: Vec<i64> = marks.iter().map(|m| m.user_id).collect();
        let enrolled = self.enrollment.enrolled_among(module_id, &ids).await?;

        let mut outcome = BulkMarkOutcome::default();
        let (accepted, rejected): (Vec<_>, Vec<_>) =
            marks.into_iter().partition(|m| enrolled.contains(&m.user_id));
        for m in &rejected {
            outcome
                .errors
                .push(BulkItemError::new(m.user_id, &AttendanceError::NotEnrolled));
        }

        let mut latest: HashMap<i64, AttendanceRecord> = HashMap::new();
        if !accepted.is_empty() {
            let txn = self.db.begin().await?;
            for mark in accepted {
                let record = AttendanceRecord::upsert_manual(&txn, mark, now).await?;
                latest.insert(record.user_id, record);
            }
            txn.commit().await?;
        }
        outcome.marked_count = latest.len();

        tracing::info!(
            module_id,
            date = %date,
            marked_by,
            marked = outcome.marked_count,
            skipped = outcome.errors.len(),
            "Bulk attendance marked"
        );

        let mut notices: Vec<Notice> = latest
            .values()
            .filter(|r| r.status.is_noteworthy())
            .map(Notice::for_mark)
            .collect();
        notices.sort_by_key(|n| n.user_id);
        deliver_all(self.notifier.as_ref(), notices).await;

        Ok(outcome)
    }
}

fn clean_remarks(remarks: Option<String>) -> AttendanceResult<Option<String>> {
    match remarks.map(|r| r.trim().to_owned()) {
        Some(r) if r.chars().count() > MAX_REMARKS_LEN => {
            Err(AttendanceError::malformed("remarks are too long"))
        }
        Some(r) if r.is_empty() => Ok(None),
        other => Ok(other),
    }
}
