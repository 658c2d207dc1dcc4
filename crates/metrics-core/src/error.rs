use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading and analysing usage metrics.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A calendar day string was not in `YYYY-MM-DD` form.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The input path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No metrics files were found under the given directory.
    #[error("No metrics files found in {0}")]
    NoDataFiles(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the metrics crates.
pub type Result<T> = std::result::Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = MetricsError::FileRead {
            path: PathBuf::from("/some/report.jsonl"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/report.jsonl"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_invalid_date() {
        let err = MetricsError::InvalidDate("2025-13-40".to_string());
        assert_eq!(err.to_string(), "Invalid date: 2025-13-40");
    }

    #[test]
    fn test_error_display_data_path_not_found() {
        let err = MetricsError::DataPathNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Data path not found: /missing/dir");
    }

    #[test]
    fn test_error_display_no_data_files() {
        let err = MetricsError::NoDataFiles(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No metrics files found in /empty/dir");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: MetricsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: MetricsError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
