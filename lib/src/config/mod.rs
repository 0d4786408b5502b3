// lib/src/config/mod.rs

//! Runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `medistaff.{toml,yaml}` file (or the file passed explicitly), `MEDISTAFF_*`
//! environment variables, and finally command-line overrides. The plain
//! `PORT`, `JWT_SECRET` and `DATABASE_PATH` variables are honoured when their
//! prefixed counterpart is not set.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::storage_engine::StorageEngineType;
use crate::storage_engine::file_storage::MAX_FILE_BYTES;

pub const ENV_PREFIX: &str = "MEDISTAFF";
pub const DEFAULT_CONFIG_NAME: &str = "medistaff";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_DATABASE_PATH: &str = "./data/medistaff.sled";
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
pub const DEFAULT_STAGING_DIR: &str = "./data/staging";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Unprefixed variable names accepted for compatibility, with their keys.
const LEGACY_ENV_KEYS: [(&str, &str); 3] = [
    ("PORT", "port"),
    ("JWT_SECRET", "jwt_secret"),
    ("DATABASE_PATH", "database_path"),
];

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub storage_engine: StorageEngineType,
    #[serde(default)]
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub log_level: String,
    pub max_upload_bytes: u64,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("upload_dir", &self.upload_dir)
            .field("staging_dir", &self.staging_dir)
            .field("storage_engine", &self.storage_engine)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("log_level", &self.log_level)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(config_file, &env, overrides)
    }

    /// Loads the configuration against an explicit environment map.
    pub fn load_from(
        config_file: Option<&Path>,
        env: &HashMap<String, String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("database_path", DEFAULT_DATABASE_PATH)?
            .set_default("upload_dir", DEFAULT_UPLOAD_DIR)?
            .set_default("staging_dir", DEFAULT_STAGING_DIR)?
            .set_default("storage_engine", StorageEngineType::default().to_string())?
            .set_default("token_ttl_hours", DEFAULT_TOKEN_TTL_HOURS)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("max_upload_bytes", MAX_FILE_BYTES)?;

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(env.clone())),
        );

        for (legacy, key) in LEGACY_ENV_KEYS {
            let prefixed = format!("{}_{}", ENV_PREFIX, key.to_uppercase());
            if env.contains_key(&prefixed) {
                continue;
            }
            if let Some(value) = env.get(legacy) {
                builder = builder.set_override(key, value.clone())?;
            }
        }

        builder = builder
            .set_override_option("host", overrides.host.clone())?
            .set_override_option("port", overrides.port.map(i64::from))?
            .set_override_option("database_path", overrides.database_path.as_deref().map(path_value))?
            .set_override_option("upload_dir", overrides.upload_dir.as_deref().map(path_value))?;

        let config: AppConfig = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!(
                "JWT secret is not configured (set {}_JWT_SECRET or JWT_SECRET)",
                ENV_PREFIX
            ));
        }
        if self.token_ttl_hours <= 0 {
            return Err(anyhow!("token_ttl_hours must be positive, got {}", self.token_ttl_hours));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("max_upload_bytes must be positive"));
        }
        if self.staging_dir == self.upload_dir {
            return Err(anyhow!("staging_dir must differ from upload_dir"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
