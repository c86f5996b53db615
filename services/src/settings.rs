use chrono::Duration;
use db::models::attendance_session::OriginPolicy;
use util::config;

/// Longest window an instructor may request.
pub const MAX_WINDOW_MINUTES: i64 = 180;

/// Engine tunables, built once from the global config and passed in.
#[derive(Debug, Clone)]
pub struct AttendanceSettings {
    pub window: Duration,
    pub default_origin_policy: OriginPolicy,
    pub subnet_prefix_v4: u8,
    pub subnet_prefix_v6: u8,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            window: Duration::minutes(15),
            default_origin_policy: OriginPolicy::Exact,
            subnet_prefix_v4: 24,
            subnet_prefix_v6: 64,
        }
    }
}

impl AttendanceSettings {
    pub fn from_config() -> Self {
        let defaults = Self::default();

        let policy_raw = config::attendance_origin_policy();
        let default_origin_policy = policy_raw.parse().unwrap_or_else(|_| {
            tracing::warn!(
                value = %policy_raw,
                "Unknown ATTENDANCE_ORIGIN_POLICY, falling back to exact"
            );
            defaults.default_origin_policy
        });

        Self {
            window: Duration::minutes(clamp_window(config::attendance_window_minutes())),
            default_origin_policy,
            subnet_prefix_v4: config::attendance_subnet_prefix_v4().min(32),
            subnet_prefix_v6: config::attendance_subnet_prefix_v6().min(128),
        }
    }

    pub fn with_window_minutes(mut self, minutes: i64) -> Self {
        self.window = Duration::minutes(clamp_window(minutes));
        self
    }

    pub fn with_default_origin_policy(mut self, policy: OriginPolicy) -> Self {
        self.default_origin_policy = policy;
        self
    }
}

pub(crate) fn clamp_window(minutes: i64) -> i64 {
    minutes.clamp(1, MAX_WINDOW_MINUTES)
}
