pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::env_file::EnvFile;
pub use crate::config::mail::{ConfigSource, MailConfig, TlsMode};
pub use crate::core::archive::archive;
pub use crate::core::delivery::{DeliveryEngine, DeliveryRequest};
pub use crate::core::mailer::SmtpMailer;
pub use crate::domain::model::{ArchiveJob, ArchiveReport, Delivery, DeliveryOutcome};
pub use crate::domain::ports::Mailer;
pub use crate::utils::error::{Result, ZipMailError};
