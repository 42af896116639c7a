use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON decode error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("CA bundle {path} is unusable: {reason}")]
    CertificateError { path: String, reason: String },

    #[error("Client credentials are unusable: {reason}")]
    CredentialsError { reason: String },

    #[error("{url} answered with HTTP {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("{url} returned an empty body")]
    EmptyBody { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    FileSystem,
    Configuration,
    Credentials,
    Decode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ProbeError {
    pub fn config(message: impl Into<String>) -> Self {
        ProbeError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ProbeError::HttpError(_)
            | ProbeError::UnexpectedStatus { .. }
            | ProbeError::EmptyBody { .. } => ErrorCategory::Network,
            ProbeError::IoError(_) => ErrorCategory::FileSystem,
            ProbeError::SerializationError(_) => ErrorCategory::Decode,
            ProbeError::UrlError(_)
            | ProbeError::ConfigError { .. }
            | ProbeError::InvalidConfigValueError { .. }
            | ProbeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ProbeError::CertificateError { .. } | ProbeError::CredentialsError { .. } => {
                ErrorCategory::Credentials
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::FileSystem => ErrorSeverity::Critical,
            ErrorCategory::Configuration
            | ErrorCategory::Credentials
            | ErrorCategory::Decode => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProbeError::HttpError(e) if e.is_connect() => {
                "Could not connect to the remote host or proxy".to_string()
            }
            ProbeError::HttpError(e) if e.is_builder() => {
                "Could not build the HTTP client".to_string()
            }
            ProbeError::IoError(e) => format!("File access failed: {}", e),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the proxy is running and the endpoint URLs are reachable",
            ErrorCategory::FileSystem => "Check that the file exists and is readable/writable",
            ErrorCategory::Configuration => "Review the command-line flags and the TOML config file",
            ErrorCategory::Credentials => {
                "Run with --getca to refresh rootCA.crt, or pass a valid --cert/--key PEM pair"
            }
            ErrorCategory::Decode => "The upstream response was not in the expected JSON shape",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
