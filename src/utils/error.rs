use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZipMailError {
    #[error("Usage error: {message}")]
    UsageError { message: String },

    #[error("Source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid email address: {address}")]
    InvalidAddress { address: String },

    /// 外部服務 (SMTP) 失敗，保留底層訊息
    #[error("Email delivery failed: {message}")]
    MailError { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Directory walk failed: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ZipMailError>;

pub mod exit_code {
    pub const USAGE: i32 = 1;
    pub const SOURCE_NOT_FOUND: i32 = 2;
    pub const SEND_FAILED: i32 = 3;
}

impl ZipMailError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn mail(message: impl Into<String>) -> Self {
        Self::MailError {
            message: message.into(),
        }
    }

    /// Errors raised by the mail stage. The archive already exists when these occur.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::InvalidAddress { .. } | Self::MailError { .. }
        )
    }

    /// Process exit status for errors the CLI handles explicitly.
    ///
    /// Archive faults other than a missing source have no dedicated status and
    /// return `None`; the binary lets them escape `main`.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::UsageError { .. } => Some(exit_code::USAGE),
            Self::SourceNotFound { .. } => Some(exit_code::SOURCE_NOT_FOUND),
            e if e.is_delivery_failure() => Some(exit_code::SEND_FAILED),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::UsageError { .. } => "Run with --help to see the expected arguments",
            Self::SourceNotFound { .. } => {
                "Check the topic name and that <root>/output/<topic> exists"
            }
            Self::ConfigError { .. } => {
                "Set SMTP_HOST, SMTP_USER and SMTP_PASSWORD in the environment or in .env"
            }
            Self::InvalidAddress { .. } => "Check the recipient and FROM_EMAIL addresses",
            Self::MailError { .. } => "Check the SMTP server, port and credentials",
            Self::ZipError(_) | Self::WalkError(_) | Self::IoError(_) => {
                "Check file permissions and free disk space under the output directory"
            }
        }
    }
}
