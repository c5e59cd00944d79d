//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or installing settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A connection string failed to parse.
    #[error(transparent)]
    Dsn(#[from] sextant_dsn::DsnError),

    /// An environment variable could not be converted to its declared type.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParse {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },

    /// A value failed the declared type of a settings field.
    #[error("settings validation failed: {0}")]
    Validation(String),

    /// A required field could not be resolved.
    #[error("missing required settings field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// Settings file not found.
    #[error("settings file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read a settings file.
    #[error("failed to read settings file: {}", path.display())]
    Read {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON settings: {0}")]
    Json(#[from] serde_json::Error),
}

impl SettingsError {
    /// Create a new environment variable parse error.
    pub fn env_parse(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParse {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a new file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_error() {
        let err = SettingsError::env_parse("DJANGO_EMAIL_PORT", "expected integer");
        assert!(err.to_string().contains("DJANGO_EMAIL_PORT"));
        assert!(err.to_string().contains("expected integer"));
    }

    #[test]
    fn test_missing_field_error() {
        let err = SettingsError::missing_field("SECRET_KEY");
        assert!(err.to_string().contains("SECRET_KEY"));
    }

    #[test]
    fn test_dsn_error_is_transparent() {
        let dsn_err = sextant_dsn::DsnError::scheme_not_allowed("gopher");
        let err: SettingsError = dsn_err.into();
        assert!(err.to_string().contains("gopher"));
    }
}
