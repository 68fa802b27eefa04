//! Startup configuration, read once from the environment (and `.env`).

use std::env;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Authority used for playback URLs when a request has no Host header.
    pub public_host: String,
    /// Document store connection string. `None` runs on the in-memory store.
    pub mongodb_url: Option<String>,
    pub mongodb_database: String,
    pub mongodb_collection: String,
    /// Bound on the startup handshake with the document store.
    pub connect_timeout: Duration,
    pub static_dir: PathBuf,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match var("PORT") {
            Some(s) => s
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string(), s))?,
            None => 8000,
        };

        let public_host = var("PUBLIC_HOST").unwrap_or_else(|| format!("localhost:{}", port));

        let connect_timeout = match var("MONGODB_TIMEOUT_SECS") {
            Some(s) => s
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue("MONGODB_TIMEOUT_SECS".to_string(), s))?,
            None => Duration::from_secs(5),
        };

        let cors_origins = match var("CORS_ORIGINS") {
            Some(s) if s.trim() == "*" => Vec::new(),
            Some(s) => s
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => vec!["http://localhost:3000".to_string()],
        };

        Ok(Self {
            host,
            port,
            public_host,
            mongodb_url: var("MONGODB_URL"),
            mongodb_database: var("MONGODB_DATABASE")
                .unwrap_or_else(|| "elevenlabs_replica".to_string()),
            mongodb_collection: var("MONGODB_COLLECTION")
                .unwrap_or_else(|| "audio_files".to_string()),
            connect_timeout,
            static_dir: var("STATIC_DIR").unwrap_or_else(|| "static".to_string()).into(),
            cors_origins,
        })
    }

    /// Resolves `HOST` (an IP literal or a host name) and `PORT`.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || ConfigError::InvalidValue("HOST".to_string(), self.host.clone());
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.public_host, "localhost:8000");
        assert!(config.mongodb_url.is_none());
        assert_eq!(config.mongodb_database, "elevenlabs_replica");
        assert_eq!(config.mongodb_collection, "audio_files");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.listen_addr().unwrap().port(), 8000);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9100"),
            ("MONGODB_URL", "mongodb://db:27017"),
            ("MONGODB_TIMEOUT_SECS", "2"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ])
        .unwrap();
        assert_eq!(config.public_host, "localhost:9100");
        assert_eq!(config.mongodb_url.as_deref(), Some("mongodb://db:27017"));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn host_name_resolves_for_listening() {
        let config = config_from(&[("HOST", "localhost")]).unwrap();
        let addr = config.listen_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn wildcard_cors_means_any() {
        let config = config_from(&[("CORS_ORIGINS", "*")]).unwrap();
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn empty_mongodb_url_is_unset() {
        let config = config_from(&[("MONGODB_URL", "  ")]).unwrap();
        assert!(config.mongodb_url.is_none());
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidValue(key, _)) if key == "PORT"
        ));
        assert!(config_from(&[("MONGODB_TIMEOUT_SECS", "-1")]).is_err());
    }
}
