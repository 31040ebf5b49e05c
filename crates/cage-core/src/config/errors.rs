//! Configuration error types.

use crate::errors::CageError;
use std::path::PathBuf;

/// Fatal errors raised while reading configuration layers.
///
/// A missing file is not represented here: the reader reports it as an
/// absent layer and resolution carries on.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config file '{}'{}: {message}", .path.display(), format_position(.line, .column))]
    ParseError {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error("Invalid value for '{field}' in config file '{}': expected {expected}", .path.display())]
    InvalidFieldValue {
        path: PathBuf,
        field: String,
        expected: &'static str,
    },

    #[error("Invalid backend '{value}' in config file '{}'. Supported backends: docker, ssh", .path.display())]
    InvalidBackend { path: PathBuf, value: String },

    #[error("Failed to read config file '{}': {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_position(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" at line {line}, column {column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

impl ConfigError {
    /// Path of the config file that caused the error.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ConfigError::ParseError { path, .. }
            | ConfigError::InvalidFieldValue { path, .. }
            | ConfigError::InvalidBackend { path, .. }
            | ConfigError::ReadError { path, .. } => path,
        }
    }
}

impl CageError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidFieldValue { .. } => "CONFIG_INVALID_FIELD_VALUE",
            ConfigError::InvalidBackend { .. } => "CONFIG_INVALID_BACKEND",
            ConfigError::ReadError { .. } => "CONFIG_READ_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ParseError { .. }
                | ConfigError::InvalidFieldValue { .. }
                | ConfigError::InvalidBackend { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_with_position() {
        let error = ConfigError::ParseError {
            path: PathBuf::from("/home/me/.config/cage/config.json"),
            line: Some(3),
            column: Some(7),
            message: "expected `:`".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse config file '/home/me/.config/cage/config.json' at line 3, column 7: expected `:`"
        );
        assert_eq!(error.error_code(), "CONFIG_PARSE_ERROR");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_parse_error_display_without_position() {
        let error = ConfigError::ParseError {
            path: PathBuf::from("config.json"),
            line: None,
            column: None,
            message: "stream did not contain valid UTF-8".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse config file 'config.json': stream did not contain valid UTF-8"
        );
    }

    #[test]
    fn test_invalid_field_value_display() {
        let error = ConfigError::InvalidFieldValue {
            path: PathBuf::from(".cage/config.json"),
            field: "tools.claude.env[1]".to_string(),
            expected: "a string",
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for 'tools.claude.env[1]' in config file '.cage/config.json': expected a string"
        );
        assert_eq!(error.error_code(), "CONFIG_INVALID_FIELD_VALUE");
        assert_eq!(error.path(), std::path::Path::new(".cage/config.json"));
    }

    #[test]
    fn test_read_error_is_not_user_error() {
        let error = ConfigError::ReadError {
            path: PathBuf::from("config.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error.error_code(), "CONFIG_READ_ERROR");
        assert!(!error.is_user_error());
    }
}
