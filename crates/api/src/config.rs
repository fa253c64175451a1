use classroll_core::ledger::{Tariff, DEFAULT_SESSIONS_PER_BUNDLE, DEFAULT_SESSION_COST};
use classroll_core::schedule::WallClock;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub ledger: LedgerConfig,
}

/// Billing and schedule settings used by the attendance ledger.
#[derive(Debug, Clone, Copy)]
pub struct LedgerConfig {
    /// Per-session cost for each mode.
    pub tariff: Tariff,
    /// Sessions in one purchased bundle, used for remaining-class counts.
    pub sessions_per_bundle: i64,
    /// Offset of the wall clock that session dates and times are written in.
    pub clock: WallClock,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tariff: Tariff::default(),
            sessions_per_bundle: DEFAULT_SESSIONS_PER_BUNDLE,
            clock: WallClock::utc(),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

impl LedgerConfig {
    /// Load ledger settings from environment variables.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `ONLINE_SESSION_COST`         | `1500`  |
    /// | `OFFLINE_SESSION_COST`        | `1500`  |
    /// | `SESSIONS_PER_BUNDLE`         | `12`    |
    /// | `SCHEDULE_UTC_OFFSET_MINUTES` | `0`     |
    ///
    /// # Panics
    ///
    /// Panics on negative costs or an out-of-range offset.
    pub fn from_env() -> Self {
        let tariff = Tariff::new(
            env_or("ONLINE_SESSION_COST", DEFAULT_SESSION_COST),
            env_or("OFFLINE_SESSION_COST", DEFAULT_SESSION_COST),
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let sessions_per_bundle: i64 = env_or("SESSIONS_PER_BUNDLE", DEFAULT_SESSIONS_PER_BUNDLE);
        assert!(sessions_per_bundle > 0, "SESSIONS_PER_BUNDLE must be positive");

        let clock = WallClock::from_offset_minutes(env_or("SCHEDULE_UTC_OFFSET_MINUTES", 0))
            .unwrap_or_else(|e| panic!("{e}"));

        Self {
            tariff,
            sessions_per_bundle,
            clock,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            ledger: LedgerConfig::from_env(),
        }
    }
}
