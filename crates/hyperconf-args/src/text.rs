//! String and option-set Args.

use std::fmt;

use indexmap::IndexSet;
use serde_json::Value;

use crate::arg::{absent, display_value, present};
use crate::{env, Arg, ArgError, ArgKind};

// Numbers and booleans are accepted through their canonical text form.
fn coerce_text(input: &Value, kind: ArgKind) -> Result<String, ArgError> {
    match input {
        Value::String(text) => Ok(text.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ArgError::coercion(input, kind)),
    }
}

/// An Arg holding a free-form string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrArg {
    value: Option<String>,
    allow_none: bool,
    env_bind: Option<String>,
}

impl StrArg {
    /// Start building an Arg with the given default.
    pub fn builder(default: impl Into<String>) -> StrArgBuilder {
        StrArgBuilder {
            default: Some(default.into()),
            allow_none: false,
            env_bind: None,
        }
    }

    /// Start building an Arg whose default is absent. Absence is allowed.
    pub fn absent() -> StrArgBuilder {
        StrArgBuilder {
            default: None,
            allow_none: true,
            env_bind: None,
        }
    }

    /// Create an Arg with the given default.
    pub fn new(default: impl Into<String>) -> Result<Self, ArgError> {
        Self::builder(default).build()
    }

    /// Borrow the current value.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn check(&self, candidate: Option<String>) -> Result<Option<String>, ArgError> {
        match candidate {
            Some(text) => Ok(Some(text)),
            None => absent(self.allow_none),
        }
    }
}

impl Arg for StrArg {
    type Value = String;

    fn kind(&self) -> ArgKind {
        ArgKind::Str
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }

    fn parse(&mut self, input: &Value) -> Result<Option<String>, ArgError> {
        let candidate = present(input)
            .map(|v| coerce_text(v, ArgKind::Str))
            .transpose()?;
        self.value = self.check(candidate)?;
        Ok(self.value.clone())
    }

    fn allows_none(&self) -> bool {
        self.allow_none
    }

    fn env_bind(&self) -> Option<&str> {
        self.env_bind.as_deref()
    }

    fn to_plain(&self) -> Value {
        self.value.clone().map_or(Value::Null, Value::String)
    }
}

impl fmt::Display for StrArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self.value.as_ref(), f)
    }
}

/// Builder for [`StrArg`].
#[derive(Debug, Clone)]
pub struct StrArgBuilder {
    default: Option<String>,
    allow_none: bool,
    env_bind: Option<String>,
}

impl StrArgBuilder {
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
    pub fn build(self) -> Result<StrArg, ArgError> {
        let mut arg = StrArg {
            value: None,
            allow_none: self.allow_none,
            env_bind: self.env_bind,
        };
        arg.value = arg.check(self.default)?;
        env::apply_override(&mut arg)?;
        Ok(arg)
    }
}

/// An Arg holding one string out of a fixed, non-empty option set.
///
/// # Example
///
/// ```
/// use hyperconf_args::{Arg, OptionArg};
///
/// let mut optimizer = OptionArg::builder("adam", ["adam", "sgd"]).build().unwrap();
/// optimizer.parse_str("sgd").unwrap();
/// assert!(optimizer.parse_str("rmsprop").is_err());
/// assert_eq!(optimizer.as_str(), Some("sgd"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionArg {
    value: Option<String>,
    options: IndexSet<String>,
    allow_none: bool,
    env_bind: Option<String>,
}

impl OptionArg {
    /// Start building an Arg with the given default and option set.
    pub fn builder<I, S>(default: impl Into<String>, options: I) -> OptionArgBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionArgBuilder {
            default: Some(default.into()),
            options: options.into_iter().map(Into::into).collect(),
            allow_none: false,
            env_bind: None,
        }
    }

    /// Start building an Arg whose default is absent. Absence is allowed.
    pub fn absent<I, S>(options: I) -> OptionArgBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionArgBuilder {
            default: None,
            options: options.into_iter().map(Into::into).collect(),
            allow_none: true,
            env_bind: None,
        }
    }

    /// Borrow the current value.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The accepted options, in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &str> + '_ {
        self.options.iter().map(String::as_str)
    }

    /// Whether `candidate` is one of the accepted options.
    pub fn accepts(&self, candidate: &str) -> bool {
        self.options.contains(candidate)
    }

    fn check(&self, candidate: Option<String>) -> Result<Option<String>, ArgError> {
        match candidate {
            Some(text) if self.accepts(&text) => Ok(Some(text)),
            Some(text) => Err(ArgError::not_an_option(&text, self.options())),
            None => absent(self.allow_none),
        }
    }
}

impl Arg for OptionArg {
    type Value = String;

    fn kind(&self) -> ArgKind {
        ArgKind::Option
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }

    fn parse(&mut self, input: &Value) -> Result<Option<String>, ArgError> {
        let candidate = present(input)
            .map(|v| coerce_text(v, ArgKind::Option))
            .transpose()?;
        self.value = self.check(candidate)?;
        Ok(self.value.clone())
    }

    fn allows_none(&self) -> bool {
        self.allow_none
    }

    fn env_bind(&self) -> Option<&str> {
        self.env_bind.as_deref()
    }

    fn to_plain(&self) -> Value {
        self.value.clone().map_or(Value::Null, Value::String)
    }
}

impl fmt::Display for OptionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self.value.as_ref(), f)
    }
}

/// Builder for [`OptionArg`].
#[derive(Debug, Clone)]
pub struct OptionArgBuilder {
    default: Option<String>,
    options: IndexSet<String>,
    allow_none: bool,
    env_bind: Option<String>,
}

impl OptionArgBuilder {
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

    /// Validate the option set and default, then apply the environment override.
    pub fn build(self) -> Result<OptionArg, ArgError> {
        if self.options.is_empty() {
            return Err(ArgError::EmptyOptions);
        }

        let mut arg = OptionArg {
            value: None,
            options: self.options,
            allow_none: self.allow_none,
            env_bind: self.env_bind,
        };
        arg.value = arg.check(self.default)?;
        env::apply_override(&mut arg)?;
        Ok(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_coercion() {
        let mut arg = StrArg::new("base").unwrap();
        assert_eq!(arg.parse(&json!(12)).unwrap().as_deref(), Some("12"));
        assert_eq!(arg.parse(&json!(false)).unwrap().as_deref(), Some("false"));
        assert_eq!(arg.parse(&json!("  padded ")).unwrap().as_deref(), Some("  padded "));
        assert!(arg.parse(&json!(["x"])).is_err());
        assert_eq!(arg.as_str(), Some("  padded "));
    }

    #[test]
    fn test_str_absence() {
        let mut required = StrArg::new("run").unwrap();
        assert_eq!(required.parse_str("None"), Err(ArgError::AbsentNotAllowed));
        assert_eq!(required.as_str(), Some("run"));

        let mut optional = StrArg::absent().build().unwrap();
        assert_eq!(optional.to_plain(), Value::Null);
        optional.parse_str("run-7").unwrap();
        assert_eq!(optional.parse_str(" NULL ").unwrap(), None);
        assert!(optional.is_absent());
    }

    #[test]
    fn test_option_membership() {
        let mut arg = OptionArg::builder("a", ["a", "b"]).build().unwrap();
        assert_eq!(arg.parse_str("b").unwrap().as_deref(), Some("b"));
        assert_eq!(arg.value().as_deref(), Some("b"));

        let err = arg.parse_str("c").unwrap_err();
        assert!(matches!(err, ArgError::NotAnOption { .. }));
        assert_eq!(arg.value().as_deref(), Some("b"));
    }

    #[test]
    fn test_option_numeric_members() {
        let mut arg = OptionArg::builder("32", ["16", "32", "64"]).build().unwrap();
        assert_eq!(arg.parse(&json!(64)).unwrap().as_deref(), Some("64"));
        assert!(arg.parse(&json!(8)).is_err());
    }

    #[test]
    fn test_option_default_must_be_member() {
        let err = OptionArg::builder("c", ["a", "b"]).build().unwrap_err();
        assert!(matches!(err, ArgError::NotAnOption { .. }));
    }

    #[test]
    fn test_option_set_must_not_be_empty() {
        let err = OptionArg::builder("a", Vec::<String>::new())
            .build()
            .unwrap_err();
        assert_eq!(err, ArgError::EmptyOptions);

        let err = OptionArg::absent(Vec::<&str>::new()).build().unwrap_err();
        assert_eq!(err, ArgError::EmptyOptions);
    }

    #[test]
    fn test_option_absent_default() {
        let arg = OptionArg::absent(["x", "y"]).build().unwrap();
        assert!(arg.is_absent());
        assert_eq!(arg.options().collect::<Vec<_>>(), vec!["x", "y"]);
        assert!(arg.accepts("y"));
    }

    #[test]
    fn test_option_env_override() {
        std::env::set_var("HYPERCONF_ARGS_TEST_OPTIMIZER", "sgd");
        let arg = OptionArg::builder("adam", ["adam", "sgd"])
            .env_bind("HYPERCONF_ARGS_TEST_OPTIMIZER")
            .build()
            .unwrap();
        assert_eq!(arg.as_str(), Some("sgd"));
    }
}
