// src/config.rs
//
// Runtime configuration, read from the environment (and `.env` if present).

use std::path::PathBuf;

use crate::error::{AppError, AppResult};

const DEFAULT_POOL_SIZE: u32 = 15;
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
    /// Max pooled connections
    pub pool_size: u32,
    pub busy_timeout_ms: u32,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Build the configuration from `FILMORATE_DB_PATH`, `FILMORATE_POOL_SIZE`
    /// and `FILMORATE_BUSY_TIMEOUT_MS`.
    ///
    /// Without `FILMORATE_DB_PATH` the database lives in the user data
    /// directory: `{DATA_DIR}/filmorate/filmorate.db`.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let path = match std::env::var("FILMORATE_DB_PATH") {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => default_database_path()?,
        };

        let pool_size = parse_var("FILMORATE_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(AppError::Config("FILMORATE_POOL_SIZE must be at least 1".to_string()));
        }

        let busy_timeout_ms = parse_var("FILMORATE_BUSY_TIMEOUT_MS", DEFAULT_BUSY_TIMEOUT_MS)?;

        Ok(Self {
            path,
            pool_size,
            busy_timeout_ms,
        })
    }
}

fn parse_var(name: &str, default: u32) -> AppResult<u32> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{}='{}': {}", name, raw, e))),
        Err(_) => Ok(default),
    }
}

fn default_database_path() -> AppResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Config("Could not determine data directory".to_string()))?;

    Ok(data_dir.join("filmorate").join("filmorate.db"))
}
