//! Student self-check-in.

use chrono::{DateTime, NaiveDate, Utc};
use db::models::attendance_record::{AttendanceStatus, CheckInMark, Model as AttendanceRecord};
use db::models::attendance_session::Model as AttendanceSession;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::code::normalize_code;
use crate::enrollment::{EnrollmentDirectory, ModuleRoleDirectory};
use crate::error::{AttendanceError, AttendanceResult, is_unique_violation};

#[derive(Debug, Clone)]
pub struct CheckInAttempt {
    pub code: String,
    pub user_id: i64,
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInReceipt {
    pub record_id: i64,
    pub session_id: i64,
    pub module_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Runs the check-in pipeline: input, session, origin, device, enrollment,
/// commit. The first failing check decides the outcome.
#[derive(Clone)]
pub struct CheckInVerifier<E = ModuleRoleDirectory> {
    db: DatabaseConnection,
    enrollment: E,
}

impl<E> CheckInVerifier<E>
where
    E: EnrollmentDirectory,
{
    pub fn new(db: DatabaseConnection, enrollment: E) -> Self {
        Self { db, enrollment }
    }

    pub async fn attempt(
        &self,
        attempt: CheckInAttempt,
        now: DateTime<Utc>,
    ) -> AttendanceResult<CheckInReceipt> {
        let user_id = attempt.user_id;
        let result = self.verify_and_commit(attempt, now).await;

        match &result {
            Ok(receipt) => tracing::info!(
                user_id,
                session_id = receipt.session_id,
                module_id = receipt.module_id,
                "Check-in recorded"
            ),
            Err(e) if e.is_policy() => {
                tracing::info!(user_id, kind = e.kind(), "Check-in rejected")
            }
            Err(AttendanceError::MalformedInput(msg)) => {
                tracing::debug!(user_id, reason = %msg, "Malformed check-in")
            }
            Err(e) => tracing::error!(user_id, error = %e, "Check-in failed"),
        }

        result
    }

    async fn verify_and_commit(
        &self,
        attempt: CheckInAttempt,
        now: DateTime<Utc>,
    ) -> AttendanceResult<CheckInReceipt> {
        let code = normalize_code(&attempt.code)?;
        let origin = attempt.origin.as_str();
        if origin.trim().is_empty() {
            return Err(AttendanceError::malformed("caller origin is missing"));
        }
        tracing::debug!(user_id = attempt.user_id, origin, "Check-in attempt");

        let session = AttendanceSession::find_by_code(&self.db, &code)
            .await?
            .filter(|s| s.is_usable(now))
            .ok_or(AttendanceError::InvalidOrExpiredSession)?;

        if !session.origin_permitted(origin) {
            return Err(AttendanceError::OriginMismatch);
        }

        if AttendanceRecord::origin_used_in_session(&self.db, session.id, origin).await? {
            return Err(AttendanceError::DeviceAlreadyUsed);
        }

        if !self
            .enrollment
            .is_actively_enrolled(attempt.user_id, session.module_id)
            .await?
        {
            return Err(AttendanceError::NotEnrolled);
        }

        let mark = CheckInMark {
            user_id: attempt.user_id,
            module_id: session.module_id,
            date: now.date_naive(),
            session_id: session.id,
            origin: origin.to_owned(),
        };

        // The (session_id, origin) index decides races the read above missed.
        let record = AttendanceRecord::upsert_check_in(&self.db, mark, now)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AttendanceError::DeviceAlreadyUsed
                } else {
                    AttendanceError::from(e)
                }
            })?;

        Ok(CheckInReceipt {
            record_id: record.id,
            session_id: session.id,
            module_id: session.module_id,
            date: record.date,
            status: record.status,
        })
    }
}
