use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Sheets(e) => {
                error!("Google Sheets error details: {:?}", e);
            }
            CoreError::Telegram(e) => {
                error!("Telegram error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Sheets(e) => e.user_friendly_message(),
            CoreError::Telegram(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error while contacting an external service.".to_string()
            }
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Sheets(_) => "SHEETS".to_string(),
            CoreError::Telegram(_) => "TELEGRAM".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
        }
    }
}

impl ErrorExt for SheetsError {
    fn log_error(&self) -> &Self {
        error!("SheetsError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("SheetsError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            SheetsError::InvalidCredentials { .. } => {
                "Google service account credentials could not be read. Check GOOGLE_SERVICE_ACCOUNT."
                    .to_string()
            }
            SheetsError::SigningFailed { .. } | SheetsError::TokenExchangeFailed { .. } => {
                "Google authentication failed. Check the service account key.".to_string()
            }
            SheetsError::SpreadsheetNotFound { spreadsheet_id } => {
                format!("Spreadsheet '{}' could not be found.", spreadsheet_id)
            }
            SheetsError::ApiRejected { operation, .. } => {
                format!("Google Sheets rejected the {} request.", operation)
            }
            SheetsError::InvalidResponse { .. } => {
                "Google Sheets returned an unexpected response.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            SheetsError::InvalidCredentials { .. } => "SHEETS_INVALID_CREDENTIALS".to_string(),
            SheetsError::SigningFailed { .. } => "SHEETS_SIGNING_FAILED".to_string(),
            SheetsError::TokenExchangeFailed { .. } => "SHEETS_TOKEN_EXCHANGE_FAILED".to_string(),
            SheetsError::SpreadsheetNotFound { .. } => "SHEETS_NOT_FOUND".to_string(),
            SheetsError::ApiRejected { .. } => "SHEETS_API_REJECTED".to_string(),
            SheetsError::InvalidResponse { .. } => "SHEETS_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for TelegramError {
    fn log_error(&self) -> &Self {
        error!("TelegramError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("TelegramError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            TelegramError::ApiRejected { description, .. } => {
                format!("Telegram message delivery failed: {}", description)
            }
            TelegramError::InvalidResponse { .. } => {
                "Telegram returned an unexpected response.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            TelegramError::ApiRejected { .. } => "TELEGRAM_API_REJECTED".to_string(),
            TelegramError::InvalidResponse { .. } => "TELEGRAM_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' was not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::Parse(_) => {
                "Configuration file could not be parsed. Please check the TOML syntax.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs a failure together with its code and user-facing message.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }
}
