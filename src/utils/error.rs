use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Missing txHash or productId")]
    MissingParameter,

    #[error("Invalid product ID")]
    UnknownProduct { product_id: String },

    #[error("Payment not verified. Check transaction hash and amount.")]
    PaymentNotVerified,

    #[error("GitHub API error: {status}")]
    ContentHostError { status: u16 },

    #[error("Block explorer error: {message}")]
    ExplorerError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// How a failure is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The client must correct the request.
    BadRequest,
    /// The client must supply a qualifying transaction.
    Forbidden,
    /// A dependency or the service itself failed.
    InternalError,
}

impl ErrorCategory {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorCategory::BadRequest => 400,
            ErrorCategory::Forbidden => 403,
            ErrorCategory::InternalError => 500,
        }
    }
}

impl DownloadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DownloadError::MissingParameter | DownloadError::UnknownProduct { .. } => {
                ErrorCategory::BadRequest
            }
            DownloadError::PaymentNotVerified => ErrorCategory::Forbidden,
            DownloadError::ContentHostError { .. }
            | DownloadError::ExplorerError { .. }
            | DownloadError::ApiError(_)
            | DownloadError::IoError(_)
            | DownloadError::SerializationError(_)
            | DownloadError::ConfigError { .. }
            | DownloadError::MissingConfigError { .. }
            | DownloadError::InvalidConfigValueError { .. } => ErrorCategory::InternalError,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.category().status_code()
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DownloadError::ConfigError { .. }
                | DownloadError::MissingConfigError { .. }
                | DownloadError::InvalidConfigValueError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
