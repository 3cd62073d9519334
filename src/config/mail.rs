use crate::config::env_file::EnvFile;
use crate::utils::error::{Result, ZipMailError};
use std::collections::HashMap;
use std::fmt;

pub const SMTP_HOST: &str = "SMTP_HOST";
pub const SMTP_PORT: &str = "SMTP_PORT";
pub const SMTP_USER: &str = "SMTP_USER";
pub const SMTP_PASSWORD: &str = "SMTP_PASSWORD";
pub const FROM_EMAIL: &str = "FROM_EMAIL";

pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Debug, Clone)]
enum EnvLookup {
    Process,
    Fixed(HashMap<String, String>),
}

/// Environment variables layered over the `.env` file.
///
/// A key present in the environment always wins, even when empty; the file
/// only fills keys the environment leaves unset.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    env: EnvLookup,
    file: EnvFile,
}

impl ConfigSource {
    pub fn from_process_env(file: EnvFile) -> Self {
        Self {
            env: EnvLookup::Process,
            file,
        }
    }

    pub fn with_env(env: HashMap<String, String>, file: EnvFile) -> Self {
        Self {
            env: EnvLookup::Fixed(env),
            file,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let from_env = match &self.env {
            EnvLookup::Process => {
                std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
            }
            EnvLookup::Fixed(map) => map.get(key).cloned(),
        };

        from_env.or_else(|| self.file.get(key).map(str::to_string))
    }

    /// Raw value, or `None` when unset or whitespace-only. The value itself is
    /// never trimmed: passwords may carry meaningful spaces.
    fn get_non_blank(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get_non_blank(key)
            .ok_or_else(|| ZipMailError::config(format!("{} is not set", key)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte (SMTPS).
    Implicit,
    /// Plain connect, then a mandatory STARTTLS before authentication.
    StartTls,
}

impl TlsMode {
    pub fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            Self::Implicit
        } else {
            Self::StartTls
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl MailConfig {
    pub fn resolve(source: &ConfigSource) -> Result<Self> {
        let host = source.require(SMTP_HOST)?;
        let username = source.require(SMTP_USER)?;
        let password = source.require(SMTP_PASSWORD)?;

        let port = match source.get_non_blank(SMTP_PORT) {
            Some(raw) => raw.trim().parse::<u16>().ok().filter(|p| *p > 0).ok_or_else(|| {
                ZipMailError::config(format!("{} is not a valid port: {}", SMTP_PORT, raw))
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let from = source
            .get_non_blank(FROM_EMAIL)
            .unwrap_or_else(|| username.clone());

        Ok(Self {
            host,
            port,
            username,
            password,
            from,
        })
    }

    pub fn tls_mode(&self) -> TlsMode {
        TlsMode::for_port(self.port)
    }
}

// 避免密碼出現在 debug 日誌
impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("from", &self.from)
            .finish()
    }
}
