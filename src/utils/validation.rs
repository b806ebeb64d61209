use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 至少要有一個檔案的副檔名在允許清單內；其餘檔案會在批次處理時被略過
pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    if files.is_empty() {
        return Err(EtlError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();
    let has_supported = files.iter().any(|file| {
        std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| allowed_set.contains(ext.to_lowercase().as_str()))
            .unwrap_or(false)
    });

    if !has_supported {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: files.join(", "),
            reason: format!(
                "No valid Excel or CSV files found. Allowed extensions: {}",
                allowed_extensions.join(", ")
            ),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
