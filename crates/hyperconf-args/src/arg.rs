//! The common Arg contract.
//!
//! Every Arg kind owns an optional current value and changes it only through
//! [`Arg::parse`], which validates the input before committing it.

use std::fmt;

use serde_json::Value;

use crate::ArgError;

/// Scalar kind held by an Arg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Free-form string.
    Str,
    /// Boolean.
    Bool,
    /// String restricted to a fixed option set.
    Option,
}

impl ArgKind {
    /// Returns the lowercase name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Option => "option",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, validated scalar value holder.
///
/// # Example
///
/// ```
/// use hyperconf_args::{Arg, IntArg};
/// use serde_json::json;
///
/// let mut epochs = IntArg::builder(10).range(1, 100).build().unwrap();
/// assert_eq!(epochs.parse(&json!("50")).unwrap(), Some(50));
/// assert!(epochs.parse(&json!(101)).is_err());
/// assert_eq!(epochs.value(), Some(50));
/// ```
pub trait Arg: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The scalar type held by this Arg.
    type Value: Clone + fmt::Debug + PartialEq + Send + Sync;

    /// The scalar kind of this Arg.
    fn kind(&self) -> ArgKind;

    /// Returns the current value, or `None` when absent.
    fn value(&self) -> Option<Self::Value>;

    /// Validates `input` and, on success, replaces the current value with it.
    ///
    /// The strings `none` and `null` (any case, surrounding whitespace ignored)
    /// and JSON `null` mean "absent" and are accepted only when the Arg allows
    /// absence.
    fn parse(&mut self, input: &Value) -> Result<Option<Self::Value>, ArgError>;

    /// Parses a text representation of the value.
    fn parse_str(&mut self, input: &str) -> Result<Option<Self::Value>, ArgError> {
        self.parse(&Value::String(input.to_owned()))
    }

    /// Whether the value may be absent.
    fn allows_none(&self) -> bool;

    /// Name of the environment variable bound to this Arg, if any.
    fn env_bind(&self) -> Option<&str>;

    /// Plain-data form of the current value; absent encodes as `null`.
    fn to_plain(&self) -> Value;

    /// Whether the current value is absent.
    fn is_absent(&self) -> bool {
        self.value().is_none()
    }
}

/// Whether `text` spells an absent value.
///
/// ```
/// use hyperconf_args::is_absent_marker;
///
/// assert!(is_absent_marker("  NULL "));
/// assert!(!is_absent_marker("nil"));
/// ```
pub fn is_absent_marker(text: &str) -> bool {
    let text = text.trim();
    text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("null")
}

/// Returns a human-readable name for a plain-data value type.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

// Strips the absence spellings, leaving only inputs that need coercion.
pub(crate) fn present(input: &Value) -> Option<&Value> {
    match input {
        Value::Null => None,
        Value::String(text) if is_absent_marker(text) => None,
        other => Some(other),
    }
}

// Resolves an absent candidate against the Arg's absence flag.
pub(crate) fn absent<T>(allow_none: bool) -> Result<Option<T>, ArgError> {
    if allow_none {
        Ok(None)
    } else {
        Err(ArgError::AbsentNotAllowed)
    }
}

pub(crate) fn display_value<T: fmt::Display>(
    value: Option<&T>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match value {
        Some(value) => value.fmt(f),
        None => f.write_str("none"),
    }
}
