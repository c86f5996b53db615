use sea_orm::{DbErr, SqlErr};

pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Outcomes of the attendance engine other than success.
///
/// Policy variants are expected results of verification and are stable; the
/// transport maps each one to its own message and status.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("Attendance session is invalid or has expired")]
    InvalidOrExpiredSession,

    #[error("You are not on the same network as the session")]
    OriginMismatch,

    #[error("This device has already been used to check in to this session")]
    DeviceAlreadyUsed,

    #[error("You are not enrolled in this module")]
    NotEnrolled,

    #[error("Attendance storage is unavailable, please retry")]
    StorageUnavailable(#[source] DbErr),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Attendance session not found")]
    NotFound,
}

impl AttendanceError {
    /// Stable machine-readable identifier.
    pub fn kind(&self) -> &'static str {
        match self {
            AttendanceError::InvalidOrExpiredSession => "invalid_or_expired_session",
            AttendanceError::OriginMismatch => "origin_mismatch",
            AttendanceError::DeviceAlreadyUsed => "device_already_used",
            AttendanceError::NotEnrolled => "not_enrolled",
            AttendanceError::StorageUnavailable(_) => "storage_unavailable",
            AttendanceError::MalformedInput(_) => "malformed_input",
            AttendanceError::NotFound => "not_found",
        }
    }

    /// Only infrastructure faults are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AttendanceError::StorageUnavailable(_))
    }

    /// Whether this is an expected verification outcome rather than a fault.
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            AttendanceError::InvalidOrExpiredSession
                | AttendanceError::OriginMismatch
                | AttendanceError::DeviceAlreadyUsed
                | AttendanceError::NotEnrolled
        )
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        AttendanceError::MalformedInput(msg.into())
    }
}

impl From<DbErr> for AttendanceError {
    fn from(err: DbErr) -> Self {
        AttendanceError::StorageUnavailable(err)
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
