use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("File not found: {path}")]
    NotFoundError { path: String },

    #[error("Unexpected data shape in {path}: {message}")]
    SchemaError { path: String, message: String },

    #[error("Failed to persist {path}: {message}")]
    PersistenceError { path: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    Persistence,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::NotFoundError { .. } | EtlError::IoError(_) => ErrorCategory::Input,
            EtlError::SchemaError { .. } | EtlError::SerializationError(_) => ErrorCategory::Data,
            EtlError::PersistenceError { .. } => ErrorCategory::Persistence,
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Persistence => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::NotFoundError { .. } => "Check that the input path exists and is readable",
            EtlError::SchemaError { .. } => {
                "Make sure the file holds a JSON array or one JSON object per line"
            }
            EtlError::PersistenceError { .. } => {
                "Check disk space and write permissions; earlier checkpoints are still valid, rerun with --resume"
            }
            EtlError::ApiError(_) => "Check network connectivity and the service endpoint",
            EtlError::IoError(_) => "Check file permissions and available disk space",
            EtlError::SerializationError(_) => "Inspect the input file for invalid JSON",
            EtlError::MissingConfigError { .. } => {
                "Export the missing environment variable before starting the run"
            }
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Review the configuration file and command line flags"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::NotFoundError { path } => format!("Input not found: {}", path),
            EtlError::SchemaError { path, message } => {
                format!("{} does not have the expected shape ({})", path, message)
            }
            EtlError::PersistenceError { path, .. } => {
                format!("Could not write {}; progress saved so far is kept", path)
            }
            EtlError::MissingConfigError { field } => format!("{} is not set", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
