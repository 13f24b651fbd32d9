use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// How many callers may wait for a pool slot once every connection is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum QueueLimit {
    Unbounded,
    Bounded(usize),
}

impl QueueLimit {
    /// `0` keeps the classic "no cap" meaning.
    pub fn from_raw(raw: usize) -> Self {
        if raw == 0 {
            QueueLimit::Unbounded
        } else {
            QueueLimit::Bounded(raw)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    pub pool_size: u32,
    pub queue_limit: QueueLimit,
    pub acquire_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

impl DbConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatLogConfig {
    pub uri: Option<String>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub db: DbConfig,
    pub chat_log: ChatLogConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let http = HttpConfig {
            host: or("APP_HOST", "0.0.0.0"),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
        };

        let pool_size: u32 = parse_or(&lookup, "DB_POOL_SIZE", 10)?;
        anyhow::ensure!(pool_size >= 1, "DB_POOL_SIZE must be at least 1");

        let db = DbConfig {
            host: or("DB_HOST", "localhost"),
            user: required("DB_USER")?,
            password: or("DB_PASSWORD", ""),
            database: required("DB_NAME")?,
            port: parse_or(&lookup, "DB_PORT", 3306)?,
            pool_size,
            queue_limit: QueueLimit::from_raw(parse_or(&lookup, "DB_QUEUE_LIMIT", 0)?),
            acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 30)?,
            query_timeout_secs: parse_or(&lookup, "DB_QUERY_TIMEOUT_SECS", 10)?,
        };

        let chat_log = ChatLogConfig {
            uri: lookup("MONGODB_URI").filter(|v| !v.trim().is_empty()),
            database: or("MONGODB_DATABASE", "fitchat"),
            collection: or("MONGODB_COLLECTION", "chatmessages"),
        };

        let ai = AiConfig {
            api_key: lookup("ANTHROPIC_API_KEY").filter(|v| !v.trim().is_empty()),
            model: or("ANTHROPIC_MODEL", "claude-3-5-sonnet-20241022"),
            max_tokens: parse_or(&lookup, "ANTHROPIC_MAX_TOKENS", 1024)?,
        };

        Ok(Self {
            http,
            db,
            chat_log,
            ai,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
