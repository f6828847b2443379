use thiserror::Error;

/// Coarse classification of a failed API call, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Network,
    Timeout,
    NotFound,
    Validation,
    Conflict,
    Server,
    Status,
    Decode,
}

/// Failure of a single booking API call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Network { message: String },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Vec<String>,
    },

    #[error("{message}")]
    Conflict {
        message: String,
        error_code: Option<String>,
    },

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {message}")]
    Decode { message: String },
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Network { .. } => ApiErrorKind::Network,
            ApiError::Timeout { .. } => ApiErrorKind::Timeout,
            ApiError::NotFound { .. } => ApiErrorKind::NotFound,
            ApiError::Validation { .. } => ApiErrorKind::Validation,
            ApiError::Conflict { .. } => ApiErrorKind::Conflict,
            ApiError::Server { .. } => ApiErrorKind::Server,
            ApiError::Status { .. } => ApiErrorKind::Status,
            ApiError::Decode { .. } => ApiErrorKind::Decode,
        }
    }

    /// Human-readable message, as printed in the transcript.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Extra context that stays out of the transcript: per-field validation
    /// failures or the service's conflict code.
    pub fn details(&self) -> Option<String> {
        match self {
            ApiError::Validation { field_errors, .. } if !field_errors.is_empty() => {
                Some(field_errors.join("; "))
            }
            ApiError::Conflict {
                error_code: Some(code),
                ..
            } => Some(code.clone()),
            _ => None,
        }
    }

    /// Maps an HTTP status and the message extracted from the body.
    pub fn from_status(status: u16, message: String, error_code: Option<String>) -> Self {
        match status {
            404 => ApiError::NotFound { message },
            400 | 422 => ApiError::Validation {
                message,
                field_errors: Vec::new(),
            },
            409 => ApiError::Conflict {
                message,
                error_code,
            },
            500..=599 => ApiError::Server { status, message },
            _ => ApiError::Status { status, message },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout {
                message: e.to_string(),
            }
        } else if e.is_decode() {
            ApiError::Decode {
                message: e.to_string(),
            }
        } else {
            ApiError::Network {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode {
            message: e.to_string(),
        }
    }
}

/// Errors that can stop the demo before it starts.
#[derive(Error, Debug)]
pub enum DemoError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("HTTP client setup failed: {0}")]
    ClientSetupError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DemoError>;
