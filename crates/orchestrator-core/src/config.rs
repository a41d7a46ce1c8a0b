//! Process configuration, read from environment variables.

use std::fmt;
use thiserror::Error;

/// Queue names shared by the pipeline stages.
pub mod queues {
    pub const GEMINI: &str = "gemini";
    pub const GOOGLE_SEARCH: &str = "google-search";
    pub const AI_ORCHESTRATOR: &str = "ai-orchestrator";
    pub const AI_ORCHESTRATOR_CALLBACK: &str = "ai-orchestrator-callback";
    pub const STATUS_MANAGER: &str = "status-manager";
    pub const WEB_SCRAPER: &str = "web-scraper";

    pub const ALL: [&str; 6] = [
        GEMINI,
        GOOGLE_SEARCH,
        AI_ORCHESTRATOR,
        AI_ORCHESTRATOR_CALLBACK,
        STATUS_MANAGER,
        WEB_SCRAPER,
    ];
}

/// Database and collection names.
pub mod database {
    pub const TABLE_PREFIX: &str = "pesquisai.";
    pub const NO_SQL_NAME: &str = "pesquisai";
    pub const ORCHESTRATOR_COLLECTION: &str = "orchestrator";
}

pub const DEFAULT_MAX_AI_RECEIVE_COUNT: u32 = 3;
pub const DEFAULT_WORKERS_PER_QUEUE: usize = 4;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Host/port/credentials of one server.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
}

impl Endpoint {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub queue: Endpoint,
    pub sql: Endpoint,
    pub sql_database: String,
    pub no_sql: Endpoint,

    /// Declare queues on connect instead of failing on unknown ones.
    pub create_queue_if_missing: bool,

    /// Deliveries of one message before it is dead-lettered.
    pub max_ai_receive_count: u32,

    /// Consumer tasks per inbound queue.
    pub workers_per_queue: usize,

    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).unwrap_or_default();

        Ok(Self {
            queue: Endpoint {
                host: text("QUEUE_CONNECTION_HOST"),
                port: text("QUEUE_CONNECTION_PORT"),
                user: text("QUEUE_CONNECTION_USER"),
                password: text("QUEUE_CONNECTION_PASSWORD"),
            },
            sql: Endpoint {
                host: text("DATABASE_SQL_CONNECTION_HOST"),
                port: text("DATABASE_SQL_CONNECTION_PORT"),
                user: text("DATABASE_SQL_CONNECTION_USER"),
                password: text("DATABASE_SQL_CONNECTION_PASSWORD"),
            },
            sql_database: text("DATABASE_SQL_CONNECTION_NAME"),
            no_sql: Endpoint {
                host: text("DATABASE_NO_SQL_CONNECTION_HOST"),
                port: text("DATABASE_NO_SQL_CONNECTION_PORT"),
                ..Endpoint::default()
            },
            create_queue_if_missing: lookup("CREATE_QUEUE_IF_NX").as_deref() == Some("true"),
            max_ai_receive_count: parse_or(
                "MAX_AI_RECEIVE_COUNT",
                lookup("MAX_AI_RECEIVE_COUNT"),
                DEFAULT_MAX_AI_RECEIVE_COUNT,
            )?,
            workers_per_queue: parse_or(
                "WORKERS_PER_QUEUE",
                lookup("WORKERS_PER_QUEUE"),
                DEFAULT_WORKERS_PER_QUEUE,
            )?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(!config.create_queue_if_missing);
        assert_eq!(config.max_ai_receive_count, DEFAULT_MAX_AI_RECEIVE_COUNT);
        assert_eq!(config.workers_per_queue, DEFAULT_WORKERS_PER_QUEUE);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_connections_and_flags() {
        let config = config_from(&[
            ("QUEUE_CONNECTION_HOST", "rabbit"),
            ("QUEUE_CONNECTION_PORT", "5672"),
            ("QUEUE_CONNECTION_PASSWORD", "s3cret"),
            ("DATABASE_SQL_CONNECTION_NAME", "pesquisai"),
            ("CREATE_QUEUE_IF_NX", "true"),
            ("MAX_AI_RECEIVE_COUNT", "5"),
        ])
        .unwrap();

        assert_eq!(config.queue.address(), "rabbit:5672");
        assert_eq!(config.sql_database, "pesquisai");
        assert!(config.create_queue_if_missing);
        assert_eq!(config.max_ai_receive_count, 5);
        assert!(!format!("{:?}", config.queue).contains("s3cret"));
    }

    #[test]
    fn only_literal_true_enables_queue_creation() {
        let config = config_from(&[("CREATE_QUEUE_IF_NX", "TRUE")]).unwrap();
        assert!(!config.create_queue_if_missing);
    }

    #[test]
    fn rejects_non_numeric_receive_count() {
        let err = config_from(&[("MAX_AI_RECEIVE_COUNT", "lots")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "MAX_AI_RECEIVE_COUNT", ref value, .. } if value == "lots"
        ));
    }
}
