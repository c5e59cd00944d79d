//! DSN parsing error types.

use thiserror::Error;

/// Errors that can occur while parsing a connection string.
#[derive(Error, Debug)]
pub enum DsnError {
    /// The URL scheme is not in the allow-list of the relevant parser.
    #[error("connection URL scheme '{scheme}' is not allowed")]
    SchemeNotAllowed {
        /// The rejected scheme.
        scheme: String,
    },

    /// The connection string is not a well-formed URL.
    #[error("invalid connection URL '{url}': {source}")]
    InvalidUrl {
        /// The offending connection string.
        url: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// A query argument with a declared numeric type failed to parse.
    #[error("invalid value '{value}' for connection option {key}: expected an integer")]
    InvalidOption {
        /// The query argument key.
        key: String,
        /// The rejected value.
        value: String,
    },
}

impl DsnError {
    /// Create a new scheme-not-allowed error.
    pub fn scheme_not_allowed(scheme: impl Into<String>) -> Self {
        Self::SchemeNotAllowed {
            scheme: scheme.into(),
        }
    }

    /// Create a new invalid-URL error.
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// Create a new invalid-option error.
    pub fn invalid_option(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_not_allowed_error() {
        let err = DsnError::scheme_not_allowed("gopher");
        assert!(err.to_string().contains("gopher"));
    }

    #[test]
    fn test_invalid_option_error() {
        let err = DsnError::invalid_option("MAX_ENTRIES", "lots");
        assert!(err.to_string().contains("MAX_ENTRIES"));
        assert!(err.to_string().contains("lots"));
    }
}
