use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use crate::constants::{DEFAULT_BACKEND_URL, DEFAULT_SERVER_PORT, DEFAULT_SESSION_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("Unknown STORE_BACKEND '{}' (expected postgres or memory)", other),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub public_api_key: Option<String>,
    pub login_password: Option<String>,
    /// CORS origins; any origin is allowed when empty
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = non_empty(lookup("DATABASE_URL"));
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set");
        }

        Ok(Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            store_backend,
            database_url,
            public_api_key: non_empty(lookup("PUBLIC_API_KEY")),
            login_password: non_empty(lookup("LOGIN_PASSWORD")),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// In-memory server without API key or password, used by tests and demos.
    pub fn local() -> Self {
        Self {
            port: 0,
            store_backend: StoreBackend::Memory,
            database_url: None,
            public_api_key: None,
            login_password: None,
            allowed_origins: Vec::new(),
        }
    }
}

/// Whether missing client settings fail fast or fall back to local defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    Strict,
    LocalDefaults,
}

/// Client-side configuration for the API adapter and the terminal views.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Option<Duration>,
    pub session_file: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mode = match lookup("NAME_PICKER_ENV").as_deref() {
            Some("production") => ConfigMode::Strict,
            _ => ConfigMode::LocalDefaults,
        };

        let backend_url = non_empty(lookup("BACKEND_URL"));
        let api_key = non_empty(lookup("BACKEND_API_KEY"));

        let backend_url = match (backend_url, mode) {
            (Some(url), _) => url,
            (None, ConfigMode::Strict) => bail!("BACKEND_URL must be set"),
            (None, ConfigMode::LocalDefaults) => {
                tracing::debug!("BACKEND_URL not set, using {}", DEFAULT_BACKEND_URL);
                DEFAULT_BACKEND_URL.to_string()
            }
        };
        if mode == ConfigMode::Strict && api_key.is_none() {
            bail!("BACKEND_API_KEY must be set");
        }

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            api_key,
            request_timeout: lookup("BACKEND_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            session_file: non_empty(lookup("PICKER_SESSION_FILE"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE)),
        })
    }

    pub fn for_url(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            api_key: None,
            request_timeout: None,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
