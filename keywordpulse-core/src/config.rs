//! Layered application configuration.
//!
//! Values are resolved in three layers: built-in defaults, an optional TOML
//! file, then environment variables. Absent sink credentials are a valid
//! state and switch the corresponding sink to its stub.

use crate::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

pub const ENV_CONFIG_PATH: &str = "KEYWORDPULSE_CONFIG";
pub const ENV_BIND_ADDR: &str = "KEYWORDPULSE_BIND";
pub const ENV_GOOGLE_SERVICE_ACCOUNT: &str = "GOOGLE_SERVICE_ACCOUNT";
pub const ENV_GOOGLE_SPREADSHEET_ID: &str = "GOOGLE_SPREADSHEET_ID";
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "LOG_JSON";

const DEFAULT_CONFIG_FILE: &str = "keywordpulse.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "server.bind_addr".to_string(),
                value: self.bind_addr.clone(),
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Base64-encoded service account JSON.
    #[serde(default)]
    pub service_account: Option<String>,
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default = "default_sheets_api_base")]
    pub sheets_api_base: String,
    #[serde(default = "default_drive_api_base")]
    pub drive_api_base: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            service_account: None,
            spreadsheet_id: None,
            sheets_api_base: default_sheets_api_base(),
            drive_api_base: default_drive_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: default_telegram_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads the configuration file (if any) and applies process environment
    /// overrides on top of it. Runs before tracing is installed, so callers
    /// log `source` themselves.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match resolve_config_path()? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(raw)?;
        config.normalize();
        Ok(config)
    }

    /// Applies environment overrides through `lookup` so callers can supply
    /// something other than the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND_ADDR) {
            self.server.bind_addr = bind;
        }
        if let Some(account) = lookup(ENV_GOOGLE_SERVICE_ACCOUNT) {
            self.google.service_account = Some(account);
        }
        if let Some(id) = lookup(ENV_GOOGLE_SPREADSHEET_ID) {
            self.google.spreadsheet_id = Some(id);
        }
        if let Some(token) = lookup(ENV_TELEGRAM_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = lookup(ENV_TELEGRAM_CHAT_ID) {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.to_lowercase();
        }
        if let Some(json) = lookup(ENV_LOG_JSON) {
            self.logging.json = parse_bool(&json).ok_or_else(|| ConfigError::InvalidValue {
                field: ENV_LOG_JSON.to_string(),
                value: json.clone(),
            })?;
        }

        self.normalize();
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;
        validate_base_url("google.sheets_api_base", &self.google.sheets_api_base)?;
        validate_base_url("google.drive_api_base", &self.google.drive_api_base)?;
        validate_base_url("telegram.api_base", &self.telegram.api_base)?;
        Ok(())
    }

    fn normalize(&mut self) {
        blank_to_none(&mut self.google.service_account);
        blank_to_none(&mut self.google.spreadsheet_id);
        blank_to_none(&mut self.telegram.bot_token);
        blank_to_none(&mut self.telegram.chat_id);
    }
}

fn resolve_config_path() -> Result<Option<PathBuf>, ConfigError> {
    if let Ok(path) = env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        return Ok(Some(path));
    }

    let local = Path::new(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local.to_path_buf()));
    }

    Ok(None)
}

fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    };

    let url = Url::parse(value).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(invalid()),
    }
}

fn blank_to_none(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *value = None;
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_drive_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
