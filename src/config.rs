use std::time::Duration;

use anyhow::{Context, Result};

use crate::store::{CollisionPolicy, StoreConfig, DEFAULT_INBOX_CAPACITY, DEFAULT_MAX_ATTEMPTS};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when generating short links, e.g. "https://go.example.com"
    /// Must NOT have a trailing slash.
    pub base_url: String,

    /// How long one HTTP request may wait on the mapping store
    pub request_timeout: Duration,

    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let request_timeout_ms = var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "100".into())
            .parse::<u64>()
            .context("REQUEST_TIMEOUT_MS must be a whole number of milliseconds")?;

        let inbox_capacity = var("STORE_INBOX_CAPACITY")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("STORE_INBOX_CAPACITY must be a positive integer")?
            .unwrap_or(DEFAULT_INBOX_CAPACITY);
        if inbox_capacity == 0 {
            anyhow::bail!("STORE_INBOX_CAPACITY must be at least 1");
        }

        let max_attempts = var("COLLISION_MAX_ATTEMPTS")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("COLLISION_MAX_ATTEMPTS must be a positive integer")?
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            anyhow::bail!("COLLISION_MAX_ATTEMPTS must be at least 1");
        }

        let collisions = match var("COLLISION_POLICY").as_deref() {
            None | Some("regenerate") => CollisionPolicy::Regenerate { max_attempts },
            Some("overwrite") => CollisionPolicy::Overwrite,
            Some(other) => anyhow::bail!(
                "COLLISION_POLICY must be \"regenerate\" or \"overwrite\", got {other:?}"
            ),
        };

        let seed = var("STORE_SEED")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("STORE_SEED must be an unsigned 64-bit integer")?;

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url,
            request_timeout: Duration::from_millis(request_timeout_ms),
            store: StoreConfig {
                inbox_capacity,
                collisions,
                seed,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.request_timeout, Duration::from_millis(100));
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("BASE_URL", "https://go.example.com/"),
            ("REQUEST_TIMEOUT_MS", "250"),
            ("STORE_INBOX_CAPACITY", "4"),
            ("COLLISION_POLICY", "overwrite"),
            ("STORE_SEED", "42"),
        ])
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "https://go.example.com");
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(
            config.store,
            StoreConfig {
                inbox_capacity: 4,
                collisions: CollisionPolicy::Overwrite,
                seed: Some(42),
            }
        );
    }

    #[test]
    fn max_attempts_feeds_regenerate_policy() {
        let config = load(&[("COLLISION_MAX_ATTEMPTS", "3")]).unwrap();
        assert_eq!(
            config.store.collisions,
            CollisionPolicy::Regenerate { max_attempts: 3 }
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("PORT", "not-a-port")]).is_err());
        assert!(load(&[("STORE_INBOX_CAPACITY", "0")]).is_err());
        assert!(load(&[("COLLISION_MAX_ATTEMPTS", "0")]).is_err());
        assert!(load(&[("COLLISION_POLICY", "ignore")]).is_err());
        assert!(load(&[("STORE_SEED", "-1")]).is_err());
    }
}
