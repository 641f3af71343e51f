use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Duration;

use crate::services::SessionRetention;

const DEFAULT_DUE_LIMIT: usize = 50;
const MAX_DUE_LIMIT: usize = 500;
const DEFAULT_SESSION_RETENTION_SECS: i64 = 3600;
const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub due_limit_default: usize,
    pub due_limit_max: usize,
    pub session_retention: SessionRetention,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            log_level: "info".to_string(),
            due_limit_default: DEFAULT_DUE_LIMIT,
            due_limit_max: MAX_DUE_LIMIT,
            session_retention: SessionRetention {
                finished: Duration::seconds(DEFAULT_SESSION_RETENTION_SECS),
                open: Duration::seconds(DEFAULT_SESSION_MAX_AGE_SECS),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env_parse::<u16>("PORT").unwrap_or(defaults.port);

        let host = env_parse::<IpAddr>("HOST").unwrap_or(defaults.host);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let due_limit_max = env_parse::<usize>("DUE_LIMIT_MAX")
            .filter(|value| *value > 0)
            .unwrap_or(defaults.due_limit_max);

        let due_limit_default = env_parse::<usize>("DUE_LIMIT_DEFAULT")
            .filter(|value| *value > 0)
            .unwrap_or(defaults.due_limit_default)
            .min(due_limit_max);

        let session_retention = SessionRetention {
            finished: env_seconds("SESSION_RETENTION_SECS")
                .unwrap_or(defaults.session_retention.finished),
            open: env_seconds("SESSION_MAX_AGE_SECS").unwrap_or(defaults.session_retention.open),
        };

        Self {
            host,
            port,
            log_level,
            due_limit_default,
            due_limit_max,
            session_retention,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Requested limit, defaulted and clamped to `[1, due_limit_max]`.
    pub fn due_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.due_limit_default)
            .clamp(1, self.due_limit_max)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
}

fn env_seconds(key: &str) -> Option<Duration> {
    env_parse::<i64>(key)
        .filter(|value| *value > 0)
        .and_then(Duration::try_seconds)
}
