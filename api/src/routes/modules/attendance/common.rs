use chrono::{DateTime, NaiveDate, Utc};
use db::models::attendance_record::{AttendanceStatus, Model as AttendanceRecord};
use db::models::attendance_session::OriginPolicy;
use serde::{Deserialize, Serialize};
use services::marking::BulkEntry;
use services::session_manager::OpenOptions;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionReq {
    #[validate(length(max = 200, message = "title must be at most 200 characters"))]
    pub title: Option<String>,
    pub origin_policy: Option<OriginPolicy>,
    pub window_minutes: Option<i64>,
}

impl From<CreateSessionReq> for OpenOptions {
    fn from(req: CreateSessionReq) -> Self {
        Self {
            title: req.title,
            origin_policy: req.origin_policy,
            window_minutes: req.window_minutes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ManualMarkReq {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[validate(length(max = 1000, message = "remarks must be at most 1000 characters"))]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkMarkReq {
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 1000, message = "entries must hold 1-1000 items"))]
    pub entries: Vec<BulkEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub date: Option<NaiveDate>,
}

/// Roster line for instructors. Origins are never exposed.
#[derive(Debug, Serialize)]
pub struct RosterEntry {
    pub user_id: i64,
    pub status: AttendanceStatus,
    pub marked_by: i64,
    pub remarks: Option<String>,
    pub via_session: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<AttendanceRecord> for RosterEntry {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            user_id: r.user_id,
            status: r.status,
            marked_by: r.marked_by,
            remarks: r.remarks,
            via_session: r.session_id.is_some(),
            updated_at: r.updated_at,
        }
    }
}
