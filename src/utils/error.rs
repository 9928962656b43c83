use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Token exchange failed with status {status}: {body}")]
    Auth { status: StatusCode, body: String },

    #[error("Fetching {resource} failed with status {status}: {body}")]
    Fetch {
        resource: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("No group found for query '{query}'")]
    GroupNotFound { query: String },

    #[error("Failed to {action} '{domain}' (status {status}): {body}")]
    Mutation {
        action: &'static str,
        domain: String,
        status: StatusCode,
        body: String,
    },

    #[error("Batch {batch} still rate limited after {attempts} attempts")]
    RateLimitExhausted { batch: usize, attempts: u32 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),


    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Fetch,
    Mutation,
    RateLimit,
    Network,
    System,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::Auth { .. } => ErrorCategory::Auth,
            SyncError::Fetch { .. } | SyncError::GroupNotFound { .. } => ErrorCategory::Fetch,
            SyncError::Mutation { .. } => ErrorCategory::Mutation,
            SyncError::RateLimitExhausted { .. } => ErrorCategory::RateLimit,
            SyncError::Http(_) => ErrorCategory::Network,
            SyncError::Io(_) => ErrorCategory::System,
            SyncError::Config { .. }
            | SyncError::MissingConfig { .. }
            | SyncError::InvalidConfigValue { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::RateLimit | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 依嚴重程度決定程序退出碼
    pub fn exit_code(&self) -> u8 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::Auth { .. } => "Please check your credentials (client_id / client_secret)",
            SyncError::Fetch { .. } => "Check the URLs in the config file and the log file for the response body",
            SyncError::GroupNotFound { .. } => "Check the 'group' query in the config file",
            SyncError::Mutation { .. } => {
                "Please check the log file; re-running converges the group from its current state"
            }
            SyncError::RateLimitExhausted { .. } => {
                "Wait for the rate limit window to pass and run again, or raise rate_limit.max_retries"
            }
            SyncError::Http(_) => "Check network connectivity or raise http.timeout_seconds",
            SyncError::Io(_) => "Check file permissions and available disk space",
            SyncError::Config { .. }
            | SyncError::MissingConfig { .. }
            | SyncError::InvalidConfigValue { .. } => "Fix the configuration file and try again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::Auth { status, .. } => {
                format!("Could not obtain an access token (status {})", status)
            }
            SyncError::Fetch {
                resource, status, ..
            } => format!("Could not fetch {} (status {})", resource, status),
            SyncError::Mutation {
                action, domain, ..
            } => format!("Could not {} {}", action, domain),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
