//! Secrets-file configuration.
//!
//! # Responsibility
//! - Locate and parse the TOML secrets file holding database settings.
//! - Keep connection parameters out of code and command lines.
//!
//! # Invariants
//! - `[database].path` is required and never empty after loading.
//! - `[logging]` is optional; absent values fall back to build defaults.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the secrets file location.
pub const SECRETS_PATH_ENV: &str = "STATEMENT_STORE_SECRETS";
/// Sentinel `path` value selecting a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

const DEFAULT_SECRETS_PATH: &str = ".secrets/secrets.toml";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    EmptyDatabasePath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read secrets file `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid secrets file `{}`: {source}", path.display())
            }
            Self::EmptyDatabasePath => write!(f, "[database].path cannot be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::EmptyDatabasePath => None,
        }
    }
}

/// Top-level secrets document.
#[derive(Debug, Clone, Deserialize)]
pub struct Secrets {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[database]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`.
    pub path: String,
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_PATH)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.trim() == IN_MEMORY_PATH
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS))
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub dir: Option<String>,
}

/// Resolves the secrets path: explicit argument, then env var, then default.
pub fn resolve_secrets_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = std::env::var_os(SECRETS_PATH_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_SECRETS_PATH)
}

/// Reads and parses a secrets file.
pub fn load_secrets(path: impl AsRef<Path>) -> ConfigResult<Secrets> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_secrets(&contents, path)
}

/// Parses secrets text; `origin` is only used in error messages.
pub fn parse_secrets(contents: &str, origin: &Path) -> ConfigResult<Secrets> {
    let secrets: Secrets = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    if secrets.database.path.trim().is_empty() {
        return Err(ConfigError::EmptyDatabasePath);
    }

    Ok(secrets)
}
