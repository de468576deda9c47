use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    cli::Overrides,
    error::{AppError, Result},
};

const DEFAULT_CONFIG_PATH: &str = "config/kaasi.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the stored document.
    pub data_dir: String,
    pub storage_key: String,
    /// Largest document the store accepts, unlimited when unset.
    pub quota_bytes: Option<u64>,
    /// IANA name of the zone "today" is evaluated in.
    pub timezone: String,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            storage_key: engine::DEFAULT_STORAGE_KEY.to_string(),
            quota_bytes: None,
            timezone: "Asia/Colombo".to_string(),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Usage(format!("unknown timezone {}", self.timezone)))
    }
}

/// Config file, then `KAASI_*` environment variables, then CLI flags.
pub fn load(overrides: &Overrides) -> Result<AppConfig> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("KAASI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(data_dir) = &overrides.data_dir {
        settings.data_dir.clone_from(data_dir);
    }
    if let Some(timezone) = &overrides.timezone {
        settings.timezone.clone_from(timezone);
    }
    if let Some(level) = &overrides.level {
        settings.level.clone_from(level);
    }

    Ok(settings)
}
