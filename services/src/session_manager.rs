//! Opening, closing and reading attendance sessions.

use chrono::{DateTime, Duration, Utc};
use db::models::attendance_record::Model as AttendanceRecord;
use db::models::attendance_session::{
    Model as AttendanceSession, NewSession, OriginPolicy, SessionState, network_for,
};
use sea_orm::{DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};

use crate::code::{generate_code, normalize_code};
use crate::error::{AttendanceError, AttendanceResult, is_unique_violation};
use crate::settings::{AttendanceSettings, clamp_window};

/// Fresh codes tried before giving up on a run of collisions.
pub const MAX_CODE_ATTEMPTS: usize = 8;

const MAX_TITLE_LEN: usize = 200;

/// Optional knobs for a new session; unset fields fall back to settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenOptions {
    pub title: Option<String>,
    pub origin_policy: Option<OriginPolicy>,
    pub window_minutes: Option<i64>,
}

/// Instructor-facing view of a session. Never carries origins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub module_id: i64,
    pub created_by: i64,
    pub title: String,
    pub code: String,
    pub state: SessionState,
    pub origin_policy: OriginPolicy,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attended_count: i64,
}

impl SessionSummary {
    fn new(session: AttendanceSession, attended_count: i64, now: DateTime<Utc>) -> Self {
        Self {
            state: session.state(now),
            id: session.id,
            module_id: session.module_id,
            created_by: session.created_by,
            title: session.title,
            code: session.code,
            origin_policy: session.origin_policy,
            created_at: session.created_at,
            expires_at: session.expires_at,
            attended_count,
        }
    }
}

#[derive(Clone)]
pub struct SessionManager {
    db: DatabaseConnection,
    settings: AttendanceSettings,
}

impl SessionManager {
    pub fn new(db: DatabaseConnection, settings: AttendanceSettings) -> Self {
        Self { db, settings }
    }

    /// Opens a session for `module_id` owned by `owner_id`.
    ///
    /// The caller's capability over the module is checked by the transport.
    /// `caller_origin` becomes the session's authorized origin; binding
    /// policies require it.
    pub async fn open(
        &self,
        module_id: i64,
        owner_id: i64,
        caller_origin: Option<&str>,
        options: OpenOptions,
        now: DateTime<Utc>,
    ) -> AttendanceResult<AttendanceSession> {
        self.open_with(module_id, owner_id, caller_origin, options, now, generate_code)
            .await
    }

    pub(crate) async fn open_with(
        &self,
        module_id: i64,
        owner_id: i64,
        caller_origin: Option<&str>,
        options: OpenOptions,
        now: DateTime<Utc>,
        mut next_code: impl FnMut() -> String,
    ) -> AttendanceResult<AttendanceSession> {
        let template = self.prepare(module_id, owner_id, caller_origin, options, now)?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let new = NewSession {
                code: next_code(),
                ..template.clone()
            };

            match AttendanceSession::create(&self.db, new).await {
                Ok(session) => {
                    tracing::info!(
                        session_id = session.id,
                        module_id,
                        owner_id,
                        policy = %session.origin_policy,
                        expires_at = %session.expires_at,
                        "Attendance session opened"
                    );
                    return Ok(session);
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::debug!(attempt, module_id, "Session code collision, retrying");
                }
                Err(e) => {
                    tracing::error!(module_id, error = %e, "Failed to store attendance session");
                    return Err(e.into());
                }
            }
        }

        tracing::error!(module_id, "Could not allocate a unique session code");
        Err(AttendanceError::StorageUnavailable(DbErr::Custom(format!(
            "no unique session code after {MAX_CODE_ATTEMPTS} attempts"
        ))))
    }

    /// Validates options and resolves defaults into a session template.
    fn prepare(
        &self,
        module_id: i64,
        owner_id: i64,
        caller_origin: Option<&str>,
        options: OpenOptions,
        now: DateTime<Utc>,
    ) -> AttendanceResult<NewSession> {
        let title = match options.title.as_deref().map(str::trim) {
            Some(t) if t.chars().count() > MAX_TITLE_LEN => {
                return Err(AttendanceError::malformed("title is too long"));
            }
            Some(t) if !t.is_empty() => t.to_owned(),
            _ => format!("Attendance {}", now.format("%Y-%m-%d %H:%M")),
        };

        let window = options
            .window_minutes
            .map(|m| Duration::minutes(clamp_window(m)))
            .unwrap_or(self.settings.window);

        let policy = options
            .origin_policy
            .unwrap_or(self.settings.default_origin_policy);

        let origin = caller_origin
            .filter(|o| !o.trim().is_empty())
            .map(str::to_owned);

        let authorized_network = match policy {
            OriginPolicy::None => None,
            OriginPolicy::Exact => {
                if origin.is_none() {
                    return Err(AttendanceError::malformed(
                        "caller origin is required for origin-bound sessions",
                    ));
                }
                None
            }
            OriginPolicy::Subnet => {
                let net = origin
                    .as_deref()
                    .and_then(|o| {
                        network_for(o, self.settings.subnet_prefix_v4, self.settings.subnet_prefix_v6)
                    })
                    .ok_or_else(|| {
                        AttendanceError::malformed("caller origin is not a usable IP address")
                    })?;
                Some(net.to_string())
            }
        };

        Ok(NewSession {
            module_id,
            created_by: owner_id,
            title,
            code: String::new(),
            origin_policy: policy,
            authorized_origin: origin,
            authorized_network,
            created_at: now,
            expires_at: now + window,
        })
    }

    /// Deactivates a session. Only the owner or an admin may close it; anyone
    /// else gets `NotFound`. Closing twice is harmless.
    pub async fn close(
        &self,
        module_id: i64,
        session_id: i64,
        caller_id: i64,
        caller_is_admin: bool,
        now: DateTime<Utc>,
    ) -> AttendanceResult<AttendanceSession> {
        let session = AttendanceSession::find_in_module(&self.db, module_id, session_id)
            .await?
            .filter(|s| caller_is_admin || s.created_by == caller_id)
            .ok_or(AttendanceError::NotFound)?;

        let was_active = session.active;
        let closed = session.close(&self.db, now).await?;
        if was_active {
            tracing::info!(session_id, module_id, caller_id, "Attendance session closed");
        }
        Ok(closed)
    }

    /// Session holding `code`, preferring an active one. Validity is not judged.
    pub async fn lookup(&self, code: &str) -> AttendanceResult<AttendanceSession> {
        let code = normalize_code(code)?;
        AttendanceSession::find_by_code(&self.db, &code)
            .await?
            .ok_or(AttendanceError::NotFound)
    }

    pub async fn get(
        &self,
        module_id: i64,
        session_id: i64,
        now: DateTime<Utc>,
    ) -> AttendanceResult<SessionSummary> {
        let session = AttendanceSession::find_in_module(&self.db, module_id, session_id)
            .await?
            .ok_or(AttendanceError::NotFound)?;
        let counts = AttendanceRecord::counts_for_sessions(&self.db, &[session.id]).await?;
        let attended = counts.get(&session.id).copied().unwrap_or(0);
        Ok(SessionSummary::new(session, attended, now))
    }

    /// Summaries of every session in the module, newest first.
    pub async fn list_for_module(
        &self,
        module_id: i64,
        now: DateTime<Utc>,
    ) -> AttendanceResult<Vec<SessionSummary>> {
        let sessions = AttendanceSession::list_for_module(&self.db, module_id).await?;
        let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
        let counts = AttendanceRecord::counts_for_sessions(&self.db, &ids).await?;

        Ok(sessions
            .into_iter()
            .map(|s| {
                let attended = counts.get(&s.id).copied().unwrap_or(0);
                SessionSummary::new(s, attended, now)
            })
            .collect())
    }
}
