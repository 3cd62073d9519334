use crate::utils::error::{Result, ZipMailError};
use std::path::{Component, Path};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn usage_error(field_name: &str, reason: &str) -> ZipMailError {
    ZipMailError::UsageError {
        message: format!("{} {}", field_name, reason),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(usage_error(field_name, "cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(usage_error(field_name, "cannot be empty"));
    }

    if path.contains('\0') {
        return Err(usage_error(field_name, "contains null bytes"));
    }

    Ok(())
}

/// Topic 是 output/ 底下的相對路徑，可含子目錄，但不能用 `..` 跳出
pub fn validate_topic(field_name: &str, topic: &str) -> Result<()> {
    validate_non_empty_string(field_name, topic)?;
    validate_path(field_name, topic)?;

    if Path::new(topic)
        .components()
        .any(|component| component == Component::ParentDir)
    {
        return Err(usage_error(field_name, "must not contain '..' components"));
    }

    Ok(())
}
