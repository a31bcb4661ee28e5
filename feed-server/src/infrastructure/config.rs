use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_CACHE_TTL_SECS: i64 = 20;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseSettings,
    pub jwt_secret: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    pub feed: FeedSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => anyhow::bail!("invalid LOG_FORMAT: {other} (expected json or pretty)"),
        }
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
        None => Ok(default),
    }
}

/// Knobs consumed by the feed composer and the global feed cache.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub page_size: u32,
    pub cache_ttl_secs: i64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl FeedSettings {
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = parse_or(&var, "PORT", 8080u16)?;
        let database = DatabaseSettings {
            url: var("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            acquire_timeout_secs: parse_or(
                &var,
                "DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
            )?,
        };
        if database.max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be greater than zero");
        }
        let log_format = parse_or(&var, "LOG_FORMAT", LogFormat::Json)?;
        let jwt_secret =
            var("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let page_size = parse_or(&var, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be greater than zero");
        }
        let cache_ttl_secs = parse_or(&var, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        if cache_ttl_secs < 0 {
            anyhow::bail!("CACHE_TTL_SECS must not be negative");
        }

        Ok(Self {
            host,
            port,
            database,
            jwt_secret,
            cors_origins,
            log_format,
            feed: FeedSettings {
                page_size,
                cache_ttl_secs,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.feed, FeedSettings::default());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.database.url, "postgres://localhost/blog");
        assert_eq!(config.database.max_connections, DEFAULT_DB_MAX_CONNECTIONS);
        assert_eq!(config.feed.cache_ttl(), chrono::Duration::seconds(20));
    }

    #[test]
    fn feed_settings_are_read_from_env() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", "secret"),
            ("PAGE_SIZE", "25"),
            ("CACHE_TTL_SECS", "5"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();

        assert_eq!(config.feed.page_size, 25);
        assert_eq!(config.feed.cache_ttl_secs, 5);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn pool_and_log_settings_are_read_from_env() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", "secret"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "2"),
            ("LOG_FORMAT", "Pretty"),
        ]))
        .unwrap();

        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.database.acquire_timeout_secs, 2);
        assert_eq!(config.log_format, LogFormat::Pretty);

        let result = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", "secret"),
            ("LOG_FORMAT", "xml"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", "secret"),
            ("PAGE_SIZE", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "secret")]));
        assert!(result.is_err());
    }
}
