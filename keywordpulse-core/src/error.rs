use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Google Sheets error: {0}")]
    Sheets(#[from] SheetsError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl CoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum SheetsError {
    #[error("Service account credentials are invalid: {reason}")]
    InvalidCredentials { reason: String },

    #[error("Failed to sign token assertion: {reason}")]
    SigningFailed { reason: String },

    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed { status: u16, message: String },

    #[error("Spreadsheet not found: {spreadsheet_id}")]
    SpreadsheetNotFound { spreadsheet_id: String },

    #[error("Sheets API rejected {operation} with status {status}: {message}")]
    ApiRejected {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },
}

#[derive(Error, Debug, Clone)]
pub enum TelegramError {
    #[error("Telegram API rejected {method} with status {status}: {description}")]
    ApiRejected {
        method: String,
        status: u16,
        description: String,
    },

    #[error("Invalid Telegram response: {details}")]
    InvalidResponse { details: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
