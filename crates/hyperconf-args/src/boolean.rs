//! Boolean Arg.

use std::fmt;

use serde_json::Value;

use crate::arg::{absent, display_value, present};
use crate::{env, Arg, ArgError, ArgKind};

/// Parse a boolean word.
///
/// Accepts `true`/`1`/`yes` and `false`/`0`/`no`, case-insensitively.
pub fn parse_bool_word(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn coerce_bool(input: &Value) -> Result<bool, ArgError> {
    match input {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ArgError::coercion(input, ArgKind::Bool)),
        },
        Value::String(text) => {
            parse_bool_word(text).ok_or_else(|| ArgError::coercion(input, ArgKind::Bool))
        }
        _ => Err(ArgError::coercion(input, ArgKind::Bool)),
    }
}

/// An Arg holding a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolArg {
    value: Option<bool>,
    allow_none: bool,
    env_bind: Option<String>,
}

impl BoolArg {
    /// Start building an Arg with the given default.
    pub fn builder(default: bool) -> BoolArgBuilder {
        BoolArgBuilder {
            default: Some(default),
            allow_none: false,
            env_bind: None,
        }
    }

    /// Start building an Arg whose default is absent. Absence is allowed.
    pub fn absent() -> BoolArgBuilder {
        BoolArgBuilder {
            default: None,
            allow_none: true,
            env_bind: None,
        }
    }

    /// Create an Arg with the given default.
    pub fn new(default: bool) -> Result<Self, ArgError> {
        Self::builder(default).build()
    }

    /// Whether the current value is present and true.
    pub fn is_true(&self) -> bool {
        self.value == Some(true)
    }
}

impl Arg for BoolArg {
    type Value = bool;

    fn kind(&self) -> ArgKind {
        ArgKind::Bool
    }

    fn value(&self) -> Option<bool> {
        self.value
    }

    fn parse(&mut self, input: &Value) -> Result<Option<bool>, ArgError> {
        let next = match present(input) {
            Some(value) => Some(coerce_bool(value)?),
            None => absent(self.allow_none)?,
        };
        self.value = next;
        Ok(next)
    }

    fn allows_none(&self) -> bool {
        self.allow_none
    }

    fn env_bind(&self) -> Option<&str> {
        self.env_bind.as_deref()
    }

    fn to_plain(&self) -> Value {
        self.value.map_or(Value::Null, Value::Bool)
    }
}

impl fmt::Display for BoolArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self.value.as_ref(), f)
    }
}

/// Builder for [`BoolArg`].
#[derive(Debug, Clone)]
pub struct BoolArgBuilder {
    default: Option<bool>,
    allow_none: bool,
    env_bind: Option<String>,
}

impl BoolArgBuilder {
    /// Allow the value to be absent.
    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    /// Bind an environment variable that overrides the default when set.
    pub fn env_bind(mut self, var: impl Into<String>) -> Self {
        self.env_bind = Some(var.into());
        self
    }

    /// Validate the default, then apply the environment override.
    pub fn build(self) -> Result<BoolArg, ArgError> {
        let mut arg = BoolArg {
            value: None,
            allow_none: self.allow_none,
            env_bind: self.env_bind,
        };
        arg.value = match self.default {
            Some(value) => Some(value),
            None => absent(arg.allow_none)?,
        };
        env::apply_override(&mut arg)?;
        Ok(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bool_word() {
        for word in ["true", "True", "TRUE", "1", "yes", "YES", " yes "] {
            assert_eq!(parse_bool_word(word), Some(true), "{word:?}");
        }
        for word in ["false", "False", "0", "no", "No"] {
            assert_eq!(parse_bool_word(word), Some(false), "{word:?}");
        }
        for word in ["on", "off", "maybe", "", "2"] {
            assert_eq!(parse_bool_word(word), None, "{word:?}");
        }
    }

    #[test]
    fn test_bool_inputs() {
        let mut arg = BoolArg::new(false).unwrap();
        assert_eq!(arg.parse(&json!(true)).unwrap(), Some(true));
        assert_eq!(arg.parse(&json!("No")).unwrap(), Some(false));
        assert_eq!(arg.parse(&json!(1)).unwrap(), Some(true));
        assert!(arg.is_true());

        for bad in [json!(2), json!("maybe"), json!(0.5), json!([true])] {
            assert!(arg.parse(&bad).is_err(), "{bad}");
        }
        assert_eq!(arg.value(), Some(true));
    }

    #[test]
    fn test_bool_absence() {
        let mut required = BoolArg::new(true).unwrap();
        assert_eq!(required.parse(&Value::Null), Err(ArgError::AbsentNotAllowed));
        assert_eq!(required.value(), Some(true));

        let mut optional = BoolArg::builder(true).allow_none().build().unwrap();
        assert_eq!(optional.parse_str("none").unwrap(), None);
        assert_eq!(optional.to_plain(), Value::Null);
    }

    #[test]
    fn test_bool_env_override() {
        std::env::set_var("HYPERCONF_ARGS_TEST_VERBOSE", "yes");
        let arg = BoolArg::builder(false)
            .env_bind("HYPERCONF_ARGS_TEST_VERBOSE")
            .build()
            .unwrap();
        assert_eq!(arg.value(), Some(true));
    }
}
