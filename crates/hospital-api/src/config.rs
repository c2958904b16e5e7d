use std::env;
use std::net::SocketAddr;

use hospital_core::{Database, DbError};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_DATABASE_PATH: &str = "hospital.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Database path that selects a throwaway in-memory store.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid HOSPITAL_BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_path = env::var("HOSPITAL_DATABASE_PATH").unwrap_or_else(|_| {
            warn!("HOSPITAL_DATABASE_PATH not set, using {}", DEFAULT_DATABASE_PATH);
            DEFAULT_DATABASE_PATH.to_string()
        });
        let bind_addr = env::var("HOSPITAL_BIND_ADDR").unwrap_or_else(|_| {
            warn!("HOSPITAL_BIND_ADDR not set, using {}", DEFAULT_BIND_ADDR);
            DEFAULT_BIND_ADDR.to_string()
        });

        Self::new(database_path, &bind_addr)
    }

    pub fn new(database_path: impl Into<String>, bind_addr: &str) -> Result<Self, ConfigError> {
        let bind_addr = bind_addr
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_addr.to_string(),
                source,
            })?;

        Ok(Self {
            database_path: database_path.into(),
            bind_addr,
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY
    }

    pub fn open_database(&self) -> Result<Database, DbError> {
        if self.is_in_memory() {
            Database::open_in_memory()
        } else {
            Database::open(&self.database_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let config = AppConfig::new(DEFAULT_DATABASE_PATH, DEFAULT_BIND_ADDR).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_bad_bind_addr() {
        let err = AppConfig::new(IN_MEMORY, "localhost").unwrap_err();
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn test_in_memory_store() {
        let config = AppConfig::new(IN_MEMORY, "127.0.0.1:0").unwrap();
        assert!(config.is_in_memory());
        assert!(config.open_database().is_ok());
    }
}
