//! Encoding and file error types.

use std::path::PathBuf;

use hyperconf_schema::ConfError;
use thiserror::Error;

use crate::Format;

/// Result type alias using [`FormatError`].
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors that can occur while encoding, decoding or storing configurations.
#[derive(Error, Debug)]
pub enum FormatError {
    /// JSON encoding or parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    TomlDecode(#[from] toml::de::Error),

    /// TOML encoding error.
    #[error("failed to encode TOML: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// YAML encoding or parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML has no representation for an absent value.
    #[error("TOML cannot encode the absent value at `{path}`")]
    TomlNull {
        /// Path of the absent value.
        path: String,
    },

    /// The decoded document is not a mapping.
    #[error("{format} document must be a mapping, found {found}")]
    NotAMapping {
        /// The document format.
        format: Format,
        /// The top-level value type found.
        found: &'static str,
    },

    /// The format name or file extension is not recognized.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Failed to read a configuration file.
    #[error("failed to read configuration file: {path}")]
    Read {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a configuration file.
    #[error("failed to write configuration file: {path}")]
    Write {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The decoded data does not fit the configuration type.
    #[error(transparent)]
    Conf(#[from] ConfError),
}

impl FormatError {
    /// Create a new read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a new write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a new unsupported format error.
    pub fn unsupported_format(name: impl Into<String>) -> Self {
        Self::UnsupportedFormat(name.into())
    }

    /// The schema error, if the document decoded but did not fit the type.
    pub fn as_conf_error(&self) -> Option<&ConfError> {
        match self {
            Self::Conf(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_mapping_display() {
        let err = FormatError::NotAMapping {
            format: Format::Yaml,
            found: "sequence",
        };
        assert_eq!(err.to_string(), "YAML document must be a mapping, found sequence");
    }

    #[test]
    fn test_read_error_display() {
        let err = FormatError::read(
            "/etc/train.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(
            err.to_string(),
            "failed to read configuration file: /etc/train.toml"
        );
    }

    #[test]
    fn test_conf_error_is_transparent() {
        let err = FormatError::from(ConfError::unknown_field("bogus"));
        assert_eq!(err.to_string(), "unknown field `bogus`");
        assert!(err.as_conf_error().is_some());
    }
}
