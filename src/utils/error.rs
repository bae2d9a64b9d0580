use std::time::Duration;
use thiserror::Error;

/// 前端 (CLI / 設定檔) 層級的錯誤
#[derive(Error, Debug)]
pub enum GateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl GateError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            GateError::IoError(e) => format!("無法讀取檔案: {}", e),
            GateError::TomlError(e) => format!("設定檔格式錯誤: {}", e),
            GateError::ConfigError { message } => format!("設定錯誤: {}", message),
            GateError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("參數 {} 的值 '{}' 無效: {}", field, value, reason),
            GateError::MissingConfigError { field } => format!("缺少必要參數: {}", field),
        }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;

/// 單一國家查詢的終止錯誤 (重試耗盡或不可重試)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server {status}")]
    Server { status: u16 },

    #[error("status {status}: {body}")]
    Client { status: u16, body: String },

    #[error("build request: {0}")]
    InvalidRequest(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("lookup cancelled")]
    Cancelled,

    #[error("lookup task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 連線失敗、逾時、5xx
    Transient,
    /// 4xx 或請求本身有誤
    Client,
    /// 200 但內容無法解析
    Decode,
    Cancelled,
    Internal,
}

impl LookupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LookupError::Timeout(_) | LookupError::Transport(_) | LookupError::Server { .. } => {
                ErrorCategory::Transient
            }
            LookupError::Client { .. } | LookupError::InvalidRequest(_) => ErrorCategory::Client,
            LookupError::Decode(_) => ErrorCategory::Decode,
            LookupError::Cancelled => ErrorCategory::Cancelled,
            LookupError::Task(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }
}
