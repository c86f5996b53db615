//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.
//!
//! Most callers use the free accessor functions at the bottom of this module
//! (`config::database_path()`, `config::attendance_window_minutes()`, ...).

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub super_users: Vec<i64>,
    pub trust_forwarded_for: bool,
    pub attendance_window_minutes: i64,
    pub attendance_origin_policy: String,
    pub attendance_subnet_prefix_v4: u8,
    pub attendance_subnet_prefix_v6: u8,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

/// Reads `key` and parses it, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Missing values fall back to development defaults; nothing here panics so
    /// tests can construct the singleton without a prepared environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "rollcall".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info,services=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env_flag("LOG_TO_STDOUT"),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/rollcall.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env_or("PORT", 3000),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into()),
            jwt_duration_minutes: env_or("JWT_DURATION_MINUTES", 60),
            super_users: env::var("SUPER_USERS")
                .unwrap_or_default()
                .split(',')
                .filter_map(|id| id.trim().parse().ok())
                .collect(),
            trust_forwarded_for: env_flag("TRUST_FORWARDED_FOR"),
            attendance_window_minutes: env_or("ATTENDANCE_WINDOW_MINUTES", 15),
            attendance_origin_policy: env::var("ATTENDANCE_ORIGIN_POLICY")
                .unwrap_or_else(|_| "exact".into()),
            attendance_subnet_prefix_v4: env_or("ATTENDANCE_SUBNET_PREFIX_V4", 24),
            attendance_subnet_prefix_v6: env_or("ATTENDANCE_SUBNET_PREFIX_V6", 64),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: u64) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value);
    }

    pub fn set_super_users(value: Vec<i64>) {
        AppConfig::set_field(|cfg| cfg.super_users = value);
    }

    pub fn set_trust_forwarded_for(value: bool) {
        AppConfig::set_field(|cfg| cfg.trust_forwarded_for = value);
    }

    pub fn set_attendance_window_minutes(value: i64) {
        AppConfig::set_field(|cfg| cfg.attendance_window_minutes = value);
    }

    pub fn set_attendance_origin_policy(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.attendance_origin_policy = value.into());
    }

    pub fn set_attendance_subnet_prefix_v4(value: u8) {
        AppConfig::set_field(|cfg| cfg.attendance_subnet_prefix_v4 = value);
    }

    pub fn set_attendance_subnet_prefix_v6(value: u8) {
        AppConfig::set_field(|cfg| cfg.attendance_subnet_prefix_v6 = value);
    }
}

// --- Free accessors ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn super_users() -> Vec<i64> {
    AppConfig::global().super_users.clone()
}

pub fn trust_forwarded_for() -> bool {
    AppConfig::global().trust_forwarded_for
}

pub fn attendance_window_minutes() -> i64 {
    AppConfig::global().attendance_window_minutes
}

pub fn attendance_origin_policy() -> String {
    AppConfig::global().attendance_origin_policy.clone()
}

pub fn attendance_subnet_prefix_v4() -> u8 {
    AppConfig::global().attendance_subnet_prefix_v4
}

pub fn attendance_subnet_prefix_v6() -> u8 {
    AppConfig::global().attendance_subnet_prefix_v6
}
