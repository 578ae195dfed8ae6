use thiserror::Error;

/// 使用者輸入問題：沒有文字、不允許的檔案類型、或擷取後為空
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("No text or file received")]
    NothingReceived,

    #[error("Uploaded file has an empty name")]
    EmptyFilename,

    #[error("File extension not allowed: {filename} (allowed: txt, pdf)")]
    UnsupportedKind { filename: String },
}

/// 文件內容無法依宣告的類型解析
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Failed to parse PDF: {0}")]
    Pdf(String),
}

/// 分類失敗。它的 Display 就是放進 `{error}` 的診斷訊息。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("missing credential")]
    MissingCredential,

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Classification service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Classification service blocked the prompt: {reason}")]
    Blocked { reason: String },

    #[error("Classification service reply contained no text")]
    EmptyReply,

    #[error("Reply does not match the expected schema: {0}")]
    Schema(String),
}

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Extraction,
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

impl TriageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TriageError::Input(_) => ErrorCategory::Input,
            TriageError::Extraction(_) => ErrorCategory::Extraction,
            TriageError::ConfigError { .. }
            | TriageError::ConfigValidationError { .. }
            | TriageError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TriageError::IoError(_)
            | TriageError::SerializationError(_)
            | TriageError::InternalError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Extraction => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給操作者的建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TriageError::Input(InputError::UnsupportedKind { .. }) => {
                "Upload a .txt or .pdf file, or send the text directly"
            }
            TriageError::Input(_) => "Send a non-empty `text` field or a `file` upload",
            TriageError::Extraction(_) => {
                "Check that the document is not corrupted or password protected"
            }
            TriageError::ConfigError { .. }
            | TriageError::ConfigValidationError { .. }
            | TriageError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags"
            }
            TriageError::IoError(_) => "Check that the file exists and is readable",
            TriageError::SerializationError(_) | TriageError::InternalError { .. } => {
                "Retry the request; if it keeps failing, run with --verbose and inspect the logs"
            }
        }
    }

    /// 對外顯示的訊息，不帶內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            TriageError::Input(e) => e.to_string(),
            TriageError::Extraction(e) => format!("Could not read the document: {}", e),
            TriageError::ConfigError { message } => format!("Configuration problem: {}", message),
            TriageError::ConfigValidationError { field, message } => {
                format!("Configuration problem in {}: {}", field, message)
            }
            TriageError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration problem in {}: {}", field, reason)
            }
            TriageError::IoError(e) => format!("File access failed: {}", e),
            TriageError::SerializationError(_) | TriageError::InternalError { .. } => {
                "Unexpected failure while processing the request".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
