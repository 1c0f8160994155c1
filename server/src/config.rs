use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_BLOB_DIR: &str = "./blobs";
const DEFAULT_SIGNED_URL_TTL_SECS: i64 = 3600;
const MAX_SIGNED_URL_TTL_SECS: i64 = 7 * 24 * 3600;
const MIN_SIGNING_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobBackend {
    Fs(PathBuf),
    Memory,
}

/// Server settings, read once at start-up.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub blob_backend: BlobBackend,
    pub url_signing_secret: String,
    pub signed_url_ttl_secs: i64,
    /// Prefix for signed blob URLs, e.g. "https://potluck.example.com".
    pub public_base_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr: SocketAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let blob_backend = match lookup("BLOB_STORE").as_deref() {
            None | Some("fs") => BlobBackend::Fs(PathBuf::from(
                lookup("BLOB_DIR").unwrap_or_else(|| DEFAULT_BLOB_DIR.to_string()),
            )),
            Some("memory") => BlobBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "BLOB_STORE",
                    reason: format!("expected \"fs\" or \"memory\", got {:?}", other),
                })
            }
        };

        let url_signing_secret =
            lookup("URL_SIGNING_SECRET").ok_or(ConfigError::Missing("URL_SIGNING_SECRET"))?;
        if url_signing_secret.len() < MIN_SIGNING_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "URL_SIGNING_SECRET",
                reason: format!("must be at least {} bytes", MIN_SIGNING_SECRET_LEN),
            });
        }

        let signed_url_ttl_secs = match lookup("SIGNED_URL_TTL_SECS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|secs| (1..=MAX_SIGNED_URL_TTL_SECS).contains(secs))
                .ok_or_else(|| ConfigError::Invalid {
                    name: "SIGNED_URL_TTL_SECS",
                    reason: format!(
                        "expected between 1 and {} seconds, got {:?}",
                        MAX_SIGNED_URL_TTL_SECS, raw
                    ),
                })?,
            None => DEFAULT_SIGNED_URL_TTL_SECS,
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", bind_addr.port()))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url,
            bind_addr,
            blob_backend,
            url_signing_secret,
            signed_url_ttl_secs,
            public_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://db"), ("URL_SIGNING_SECRET", SECRET)])
            .unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(
            config.blob_backend,
            BlobBackend::Fs(PathBuf::from(DEFAULT_BLOB_DIR))
        );
        assert_eq!(config.signed_url_ttl_secs, 3600);
        assert_eq!(config.public_base_url, "http://localhost:3000");
    }

    #[test]
    fn test_missing_database_url() {
        let result = config(&[("URL_SIGNING_SECRET", SECRET)]);
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = config(&[("DATABASE_URL", "postgres://db"), ("URL_SIGNING_SECRET", "short")]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "URL_SIGNING_SECRET",
                ..
            })
        ));
    }

    #[test]
    fn test_memory_store_and_base_url() {
        let config = config(&[
            ("DATABASE_URL", "postgres://db"),
            ("URL_SIGNING_SECRET", SECRET),
            ("BLOB_STORE", "memory"),
            ("PUBLIC_BASE_URL", "https://food.example.com/"),
            ("SIGNED_URL_TTL_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(config.blob_backend, BlobBackend::Memory);
        assert_eq!(config.public_base_url, "https://food.example.com");
        assert_eq!(config.signed_url_ttl_secs, 60);
    }

    #[test]
    fn test_bad_ttl() {
        let result = config(&[
            ("DATABASE_URL", "postgres://db"),
            ("URL_SIGNING_SECRET", SECRET),
            ("SIGNED_URL_TTL_SECS", "-5"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ttl_above_a_week_rejected() {
        let week = config(&[
            ("DATABASE_URL", "postgres://db"),
            ("URL_SIGNING_SECRET", SECRET),
            ("SIGNED_URL_TTL_SECS", "604800"),
        ])
        .unwrap();
        assert_eq!(week.signed_url_ttl_secs, MAX_SIGNED_URL_TTL_SECS);

        let result = config(&[
            ("DATABASE_URL", "postgres://db"),
            ("URL_SIGNING_SECRET", SECRET),
            ("SIGNED_URL_TTL_SECS", "9223372036854775807"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "SIGNED_URL_TTL_SECS",
                ..
            })
        ));
    }
}
