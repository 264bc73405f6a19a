use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("HTTP {status} for {resource}")]
    HttpStatus { resource: String, status: u16 },

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Data not found for {}", .requested.format("%a %b %d %Y"))]
    DataNotFound { requested: NaiveDate },

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Availability,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    /// True for the failures the resolver treats as "file not there yet".
    /// Missing files and transport problems are treated alike.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DashboardError::NotFound { .. }
                | DashboardError::HttpStatus { .. }
                | DashboardError::Transport(_)
                | DashboardError::Io(_)
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::NotFound { .. }
            | DashboardError::HttpStatus { .. }
            | DashboardError::Transport(_)
            | DashboardError::DataNotFound { .. } => ErrorCategory::Availability,
            DashboardError::Parse(_) | DashboardError::Csv(_) => ErrorCategory::Data,
            DashboardError::ConfigError { .. }
            | DashboardError::InvalidConfigValue { .. }
            | DashboardError::MissingConfig { .. } => ErrorCategory::Configuration,
            DashboardError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Availability => ErrorSeverity::Low,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::DataNotFound { .. } => self.to_string(),
            DashboardError::NotFound { .. } | DashboardError::HttpStatus { .. } => {
                "The requested snapshot has not been published yet".to_string()
            }
            DashboardError::Transport(_) => "Could not reach the snapshot host".to_string(),
            DashboardError::Parse(_) => "Failed to fetch data".to_string(),
            DashboardError::Csv(_) => "Failed to write the CSV report".to_string(),
            DashboardError::ConfigError { message } => format!("Configuration problem: {}", message),
            DashboardError::InvalidConfigValue { field, reason, .. } => {
                format!("Configuration value {} is invalid: {}", field, reason)
            }
            DashboardError::MissingConfig { field } => {
                format!("Configuration value {} is required", field)
            }
            DashboardError::Io(e) => format!("System error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Availability => {
                "Pick an earlier date or wait for the next daily snapshot to be published"
            }
            ErrorCategory::Data => "The snapshot file is malformed; try another date",
            ErrorCategory::Configuration => "Check the TOML configuration and command-line flags",
            ErrorCategory::System => "Check file permissions and the data directory path",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
