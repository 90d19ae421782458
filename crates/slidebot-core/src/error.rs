use thiserror::Error;

/// Result type for page driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Failures reported by a page driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("key press {key} failed: {reason}")]
    Input { key: String, reason: String },

    #[error("screenshot failed: {0}")]
    Screenshot(String),

    #[error("query {selector} failed: {reason}")]
    Query { selector: String, reason: String },

    #[error("browser close failed: {0}")]
    Close(String),
}

/// Fatal failures of an autoplay run
#[derive(Debug, Error)]
pub enum AutoplayError {
    /// Environment or installation problem found before the loop could start
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// Coarse grouping shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Setup,
    Driver,
    Unexpected,
}

impl AutoplayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Setup(_) | Self::Config(_) => ErrorCategory::Setup,
            Self::Driver(_) => ErrorCategory::Driver,
            Self::Unexpected(_) => ErrorCategory::Unexpected,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "Installation failure"),
            Self::Driver => write!(f, "Browser error"),
            Self::Unexpected => write!(f, "Unexpected error"),
        }
    }
}
