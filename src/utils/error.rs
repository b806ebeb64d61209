use thiserror::Error;

/// 單一檔案在進入管道前就被拒絕的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("The file appears to be empty. Please check the file content.")]
    FileEmpty,

    #[error("The CSV file format is invalid. Please ensure it's a properly formatted CSV file.")]
    InvalidCsvFormat,

    #[error("The Excel file format is invalid. Please ensure it's a properly formatted Excel file.")]
    InvalidWorkbookFormat,

    #[error("No worksheets found in the file. Please ensure the file contains at least one sheet.")]
    NoSheetsFound,

    #[error("Error parsing the worksheet. The sheet structure might be corrupted.")]
    SheetParsing,

    #[error("The worksheet is empty. Please ensure it contains data.")]
    EmptySheet,

    #[error("No headers found in the worksheet. Please ensure the first row contains column headers.")]
    NoHeadersFound,

    #[error("Required columns missing: {}. Please ensure all required columns are present.", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unsupported file type: {0}. Only .xlsx, .xls and .csv files are accepted.")]
    UnsupportedFileType(String),
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{file_name}: {source}")]
    Input {
        file_name: String,
        #[source]
        source: InputError,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("No files could be processed ({failed} failed)")]
    NoFilesProcessed { failed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Configuration,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn input(file_name: impl Into<String>, source: InputError) -> Self {
        Self::Input {
            file_name: file_name.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) => ErrorCategory::Io,
            Self::Input { .. } | Self::NoFilesProcessed { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ProcessingError { .. } | Self::ValidationError { .. } => {
                ErrorCategory::Processing
            }
            Self::ZipError(_) | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單一檔案失敗不影響批次中的其他檔案
            ErrorCategory::Input => match self {
                Self::NoFilesProcessed { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            ErrorCategory::Configuration | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Input { file_name, source } => format!("{}: {}", file_name, source),
            Self::IoError(e) => format!(
                "Failed to read or write a file. The file might be corrupted or inaccessible ({}).",
                e
            ),
            Self::NoFilesProcessed { .. } => "No valid Excel or CSV files could be processed.".to_string(),
            Self::ZipError(_) | Self::CsvError(_) | Self::SerializationError(_) => {
                "Failed to generate the report archive.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Input {
                source: InputError::MissingColumns(_),
                ..
            } => "Check that your file has the required columns (Keyword, Volume)",
            Self::Input {
                source: InputError::InvalidWorkbookFormat,
                ..
            } => "If using XLSX, try exporting as CSV instead and ensure the file is not password protected",
            Self::Input { .. } | Self::NoFilesProcessed { .. } => {
                "Re-export the keyword data and check that the first row contains the column headers"
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Review the command line arguments or the TOML configuration file"
            }
            Self::IoError(_) => "Check that the paths exist and that you have read/write permissions",
            _ => "Retry the operation; if the problem persists, split large files into smaller ones",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_columns() {
        let err = InputError::MissingColumns(vec!["Keyword".to_string(), "Volume".to_string()]);
        assert_eq!(
            err.to_string(),
            "Required columns missing: Keyword, Volume. Please ensure all required columns are present."
        );
    }

    #[test]
    fn test_input_error_keeps_file_name() {
        let err = EtlError::input("export.csv", InputError::EmptySheet);
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().starts_with("export.csv: "));
    }

    #[test]
    fn test_severity_by_category() {
        let config = EtlError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(config.severity(), ErrorSeverity::High);

        let io = EtlError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);
    }
}
