use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("QR session was issued for elevator {actual}, expected {expected}")]
    ElevatorMismatch { expected: i64, actual: i64 },

    #[error("QR session expired")]
    QrSessionExpired,

    #[error("Camera unavailable: {reason}")]
    CameraUnavailable { reason: String },

    #[error("QR scan cancelled")]
    ScanCancelled,

    #[error("QR scan timed out after {seconds}s")]
    ScanTimeout { seconds: u64 },

    #[error("QR scan failed: {message}")]
    ScanFailed { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Validation,
    Device,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ClientError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::HttpError(_) | ClientError::ApiError { .. } => ErrorCategory::Network,
            ClientError::Unauthorized { .. }
            | ClientError::Forbidden { .. }
            | ClientError::NotAuthenticated
            | ClientError::SessionExpired
            | ClientError::InvalidToken { .. }
            | ClientError::ElevatorMismatch { .. }
            | ClientError::QrSessionExpired => ErrorCategory::Authentication,
            ClientError::ConfigError { .. }
            | ClientError::MissingConfigError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::UrlError(_) => ErrorCategory::Configuration,
            ClientError::ValidationError { .. } => ErrorCategory::Validation,
            ClientError::CameraUnavailable { .. }
            | ClientError::ScanCancelled
            | ClientError::ScanTimeout { .. }
            | ClientError::ScanFailed { .. }
            | ClientError::ImageError(_) => ErrorCategory::Device,
            ClientError::SerializationError(_)
            | ClientError::CsvError(_)
            | ClientError::ProcessingError { .. } => ErrorCategory::Data,
            ClientError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClientError::ScanCancelled => ErrorSeverity::Low,
            ClientError::HttpError(_)
            | ClientError::ApiError { .. }
            | ClientError::ScanTimeout { .. }
            | ClientError::ScanFailed { .. }
            | ClientError::SessionExpired
            | ClientError::QrSessionExpired => ErrorSeverity::Medium,
            ClientError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 需要重新登入的錯誤
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized { .. }
                | ClientError::NotAuthenticated
                | ClientError::SessionExpired
                | ClientError::InvalidToken { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::HttpError(e) if e.is_timeout() => {
                "The server did not answer in time".to_string()
            }
            ClientError::HttpError(e) if e.is_connect() => {
                "Could not reach the server".to_string()
            }
            ClientError::ApiError { message, .. } => message.clone(),
            ClientError::Unauthorized { .. }
            | ClientError::NotAuthenticated
            | ClientError::SessionExpired
            | ClientError::InvalidToken { .. } => {
                "Your session has ended, please log in again".to_string()
            }
            ClientError::Forbidden { message } => {
                format!("You are not allowed to do this: {}", message)
            }
            ClientError::ElevatorMismatch { expected, actual } => format!(
                "The scanned QR code belongs to elevator {} instead of {}",
                actual, expected
            ),
            ClientError::QrSessionExpired => {
                "The QR session has expired, scan the code again".to_string()
            }
            ClientError::ValidationError { field, message } => {
                format!("{}: {}", field, message)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            _ if self.requires_login() => "Run `elevator-client login` and retry".to_string(),
            ErrorCategory::Network => {
                "Check the API URL and your network connection, then submit again".to_string()
            }
            ErrorCategory::Authentication => match self {
                ClientError::Forbidden { .. } => {
                    "Ask an administrator (PATRON) to perform this action".to_string()
                }
                _ => "Scan the elevator's QR code again to start a new session".to_string(),
            },
            ErrorCategory::Configuration => {
                "Check the configuration file and command-line flags".to_string()
            }
            ErrorCategory::Validation => "Correct the highlighted value and retry".to_string(),
            ErrorCategory::Device => {
                "Check the image files or enter the QR code manually with --qr-code".to_string()
            }
            ErrorCategory::Data => "The server returned unexpected data; retry later".to_string(),
            ErrorCategory::System => "Check file permissions and free disk space".to_string(),
        }
    }
}

/// Best-effort extraction of a human readable message from a backend error body.
pub fn extract_api_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return message_from_json(&value);
    }

    const MAX_LEN: usize = 200;
    if trimmed.chars().count() > MAX_LEN {
        let cut: String = trimmed.chars().take(MAX_LEN).collect();
        Some(format!("{}…", cut))
    } else {
        Some(trimmed.to_string())
    }
}

fn message_from_json(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Object(obj) => {
            for key in ["message", "error", "detail", "title"] {
                if let Some(msg) = obj.get(key).and_then(message_from_json) {
                    return Some(msg);
                }
            }
            if let Some(serde_json::Value::Array(errors)) = obj.get("errors") {
                let messages: Vec<String> = errors
                    .iter()
                    .filter_map(|e| match e {
                        serde_json::Value::Object(o) => o
                            .get("message")
                            .or_else(|| o.get("defaultMessage"))
                            .and_then(message_from_json),
                        other => message_from_json(other),
                    })
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_field() {
        assert_eq!(
            extract_api_message(r#"{"success":false,"message":"Asansör bulunamadı"}"#),
            Some("Asansör bulunamadı".to_string())
        );
        assert_eq!(
            extract_api_message(r#"{"error":{"message":"nested"}}"#),
            Some("nested".to_string())
        );
    }

    #[test]
    fn test_extract_validation_errors() {
        let body = r#"{"errors":[{"field":"date","defaultMessage":"must not be null"},"bad amount"]}"#;
        assert_eq!(
            extract_api_message(body),
            Some("must not be null; bad amount".to_string())
        );
    }

    #[test]
    fn test_extract_plain_text_and_empty() {
        assert_eq!(extract_api_message("  "), None);
        assert_eq!(
            extract_api_message("Bad Gateway"),
            Some("Bad Gateway".to_string())
        );
        let long = "x".repeat(500);
        let msg = extract_api_message(&long).unwrap();
        assert!(msg.ends_with('…'));
        assert_eq!(msg.chars().count(), 201);
        assert_eq!(extract_api_message(r#"{"status":500}"#), None);
    }

    #[test]
    fn test_login_errors() {
        assert!(ClientError::SessionExpired.requires_login());
        assert!(!ClientError::QrSessionExpired.requires_login());
        assert_eq!(ClientError::ScanCancelled.severity(), ErrorSeverity::Low);
        assert_eq!(
            ClientError::Forbidden {
                message: "x".into()
            }
            .category(),
            ErrorCategory::Authentication
        );
    }
}
