//! Arg validation error types.

use std::fmt::Display;

use serde_json::Value;
use thiserror::Error;

use crate::ArgKind;

/// Errors raised while constructing or parsing an Arg.
///
/// A failing [`parse`](crate::Arg::parse) never changes the Arg's current value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// An absent value was given to an Arg that does not allow absence.
    #[error("value cannot be none")]
    AbsentNotAllowed,

    /// The input could not be converted to the Arg's scalar kind.
    #[error("cannot convert {input} to {kind}")]
    Coercion {
        /// Rendering of the rejected input.
        input: String,
        /// The kind the input was being converted to.
        kind: ArgKind,
    },

    /// The value is below the configured minimum.
    #[error("value {value} is less than minimum {min}")]
    BelowMinimum {
        /// The rejected value.
        value: String,
        /// The configured minimum.
        min: String,
    },

    /// The value is above the configured maximum.
    #[error("value {value} is greater than maximum {max}")]
    AboveMaximum {
        /// The rejected value.
        value: String,
        /// The configured maximum.
        max: String,
    },

    /// The value is not a member of the option set.
    #[error("value {value} is not one of [{options}]")]
    NotAnOption {
        /// The rejected value.
        value: String,
        /// The accepted options, comma separated.
        options: String,
    },

    /// A float value or bound is NaN or infinite.
    #[error("value {value} is not a finite number")]
    NonFinite {
        /// Rendering of the rejected number.
        value: String,
    },

    /// The minimum bound is greater than the maximum bound.
    #[error("minimum {min} cannot be greater than maximum {max}")]
    InvalidBounds {
        /// The configured minimum.
        min: String,
        /// The configured maximum.
        max: String,
    },

    /// An option Arg was declared with no options.
    #[error("option set cannot be empty")]
    EmptyOptions,

    /// The bound environment variable holds non-unicode data.
    #[error("environment variable {var} is not valid unicode")]
    EnvNotUnicode {
        /// The environment variable name.
        var: String,
    },

    /// The bound environment variable holds a value the Arg rejects.
    #[error("environment variable {var} rejected: {source}")]
    EnvOverride {
        /// The environment variable name.
        var: String,
        /// Why the value was rejected.
        #[source]
        source: Box<ArgError>,
    },
}

impl ArgError {
    /// Create a new coercion error.
    pub fn coercion(input: &Value, kind: ArgKind) -> Self {
        Self::Coercion {
            input: input.to_string(),
            kind,
        }
    }

    /// Create a new below-minimum error.
    pub fn below_minimum(value: impl Display, min: impl Display) -> Self {
        Self::BelowMinimum {
            value: value.to_string(),
            min: min.to_string(),
        }
    }

    /// Create a new above-maximum error.
    pub fn above_maximum(value: impl Display, max: impl Display) -> Self {
        Self::AboveMaximum {
            value: value.to_string(),
            max: max.to_string(),
        }
    }

    /// Create a new option membership error.
    pub fn not_an_option<'a>(value: &str, options: impl IntoIterator<Item = &'a str>) -> Self {
        Self::NotAnOption {
            value: value.to_string(),
            options: options.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    /// Create a new invalid bounds error.
    pub fn invalid_bounds(min: impl Display, max: impl Display) -> Self {
        Self::InvalidBounds {
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Wrap a parse failure of an environment override.
    pub fn env_override(var: impl Into<String>, source: ArgError) -> Self {
        Self::EnvOverride {
            var: var.into(),
            source: Box::new(source),
        }
    }
}
