use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediBotError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Assistant returned HTTP {status}: {message}")]
    AssistantStatus { status: u16, message: String },

    #[error("Assistant refused to answer: {reason}")]
    AssistantRefused { reason: String },

    #[error("Assistant reply could not be parsed: {reason}")]
    MalformedReply { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Network,
    Configuration,
    System,
    Collaborator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MediBotError {
    pub fn malformed_row(line: u64, reason: impl Into<String>) -> Self {
        MediBotError::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MediBotError::CsvError(_)
            | MediBotError::MalformedRow { .. }
            | MediBotError::SerializationError(_) => ErrorCategory::Data,
            MediBotError::ApiError(_) => ErrorCategory::Network,
            MediBotError::IoError(_) => ErrorCategory::System,
            MediBotError::ConfigError { .. }
            | MediBotError::ConfigValidationError { .. }
            | MediBotError::InvalidConfigValueError { .. }
            | MediBotError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MediBotError::AssistantStatus { .. }
            | MediBotError::AssistantRefused { .. }
            | MediBotError::MalformedReply { .. } => ErrorCategory::Collaborator,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // a single assistant turn failing never ends the session
            ErrorCategory::Collaborator => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MediBotError::MalformedRow { line, reason } => {
                format!("The service table is malformed (line {}): {}", line, reason)
            }
            MediBotError::CsvError(e) => format!("The service table could not be read: {}", e),
            MediBotError::IoError(e) => format!("A file could not be accessed: {}", e),
            MediBotError::ApiError(_) => "The assistant service could not be reached".to_string(),
            MediBotError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            MediBotError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            MediBotError::AssistantRefused { .. } | MediBotError::MalformedReply { .. } => {
                "The assistant could not produce a usable answer".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MediBotError::MalformedRow { .. } | MediBotError::CsvError(_) => {
                "Check that the table has the header center,services,address,phone,hours,ratings,fees and that every row fills each column"
            }
            MediBotError::IoError(_) => "Check that the file exists and is readable",
            MediBotError::ApiError(_) | MediBotError::AssistantStatus { .. } => {
                "Check the network connection, the assistant endpoint and the API key"
            }
            MediBotError::MissingConfigError { .. } => {
                "Set the missing value in the TOML file or export the referenced environment variable"
            }
            MediBotError::ConfigError { .. }
            | MediBotError::ConfigValidationError { .. }
            | MediBotError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
            MediBotError::AssistantRefused { .. } => "Rephrase the question or try a different query",
            MediBotError::MalformedReply { .. } | MediBotError::SerializationError(_) => {
                "Try the request again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MediBotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_is_high_severity_data_error() {
        let err = MediBotError::malformed_row(3, "missing column 'phone'");
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.to_string(),
            "Malformed row at line 3: missing column 'phone'"
        );
    }

    #[test]
    fn test_collaborator_errors_are_low_severity() {
        let err = MediBotError::MalformedReply {
            reason: "missing field `quit`".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Collaborator);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.recovery_suggestion(), "Try the request again");
    }
}
