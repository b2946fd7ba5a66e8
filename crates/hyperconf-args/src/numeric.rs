//! Bounded integer and float Args.
//!
//! [`IntArg`] and [`FloatArg`] share one implementation, [`NumericArg`],
//! parameterised over the scalar type.

use std::fmt;

use serde_json::{Number, Value};

use crate::arg::{absent, display_value, present};
use crate::{env, Arg, ArgError, ArgKind};

mod sealed {
    pub trait Sealed {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

/// Scalar types usable in a [`NumericArg`].
pub trait Numeric:
    sealed::Sealed + Copy + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The Arg kind for this scalar.
    const KIND: ArgKind;

    /// Converts a present plain-data input to this scalar.
    fn coerce(input: &Value) -> Result<Self, ArgError>;

    /// Rejects values that plain data cannot represent.
    fn ensure_finite(self) -> Result<Self, ArgError>;

    /// Plain-data form of the scalar.
    fn to_plain(self) -> Value;
}

impl Numeric for i64 {
    const KIND: ArgKind = ArgKind::Int;

    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn coerce(input: &Value) -> Result<Self, ArgError> {
        match input {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(i);
                }
                // Floats are accepted only when they carry no fractional part.
                // `i64::MAX as f64` is 2^63, one past the largest i64.
                match n.as_f64() {
                    Some(f)
                        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
                    {
                        Ok(f as i64)
                    }
                    _ => Err(ArgError::coercion(input, Self::KIND)),
                }
            }
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::String(text) => text
                .trim()
                .parse()
                .map_err(|_| ArgError::coercion(input, Self::KIND)),
            _ => Err(ArgError::coercion(input, Self::KIND)),
        }
    }

    fn ensure_finite(self) -> Result<Self, ArgError> {
        Ok(self)
    }

    fn to_plain(self) -> Value {
        Value::from(self)
    }
}

impl Numeric for f64 {
    const KIND: ArgKind = ArgKind::Float;

    fn coerce(input: &Value) -> Result<Self, ArgError> {
        let value = match input {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ArgError::coercion(input, Self::KIND))?,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::String(text) => text
                .trim()
                .parse()
                .map_err(|_| ArgError::coercion(input, Self::KIND))?,
            _ => return Err(ArgError::coercion(input, Self::KIND)),
        };
        value.ensure_finite()
    }

    fn ensure_finite(self) -> Result<Self, ArgError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(ArgError::NonFinite {
                value: self.to_string(),
            })
        }
    }

    fn to_plain(self) -> Value {
        Number::from_f64(self).map_or(Value::Null, Value::Number)
    }
}

/// An Arg holding a bounded number.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArg<N: Numeric> {
    value: Option<N>,
    min: Option<N>,
    max: Option<N>,
    allow_none: bool,
    env_bind: Option<String>,
}

/// An integer Arg with optional inclusive bounds.
pub type IntArg = NumericArg<i64>;

/// A float Arg with optional inclusive bounds.
pub type FloatArg = NumericArg<f64>;

impl<N: Numeric> NumericArg<N> {
    /// Start building an Arg with the given default.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperconf_args::{Arg, FloatArg};
    ///
    /// let rate = FloatArg::builder(0.01).range(0.0, 1.0).build().unwrap();
    /// assert_eq!(rate.value(), Some(0.01));
    /// ```
    pub fn builder(default: N) -> NumericArgBuilder<N> {
        NumericArgBuilder {
            default: Some(default),
            min: None,
            max: None,
            allow_none: false,
            env_bind: None,
        }
    }

    /// Start building an Arg whose default is absent. Absence is allowed.
    pub fn absent() -> NumericArgBuilder<N> {
        NumericArgBuilder {
            default: None,
            min: None,
            max: None,
            allow_none: true,
            env_bind: None,
        }
    }

    /// Create an unbounded Arg with the given default.
    pub fn new(default: N) -> Result<Self, ArgError> {
        Self::builder(default).build()
    }

    /// The inclusive lower bound.
    pub fn min(&self) -> Option<N> {
        self.min
    }

    /// The inclusive upper bound.
    pub fn max(&self) -> Option<N> {
        self.max
    }

    // Validates a candidate without touching the current value.
    fn check(&self, candidate: Option<N>) -> Result<Option<N>, ArgError> {
        let Some(value) = candidate else {
            return absent(self.allow_none);
        };
        let value = value.ensure_finite()?;

        if let Some(min) = self.min {
            if value < min {
                return Err(ArgError::below_minimum(value, min));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(ArgError::above_maximum(value, max));
            }
        }
        Ok(Some(value))
    }
}

impl<N: Numeric> Arg for NumericArg<N> {
    type Value = N;

    fn kind(&self) -> ArgKind {
        N::KIND
    }

    fn value(&self) -> Option<N> {
        self.value
    }

    fn parse(&mut self, input: &Value) -> Result<Option<N>, ArgError> {
        let candidate = present(input).map(N::coerce).transpose()?;
        let next = self.check(candidate)?;
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
        self.value.map_or(Value::Null, N::to_plain)
    }
}

impl<N: Numeric> fmt::Display for NumericArg<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self.value.as_ref(), f)
    }
}

/// Builder for [`NumericArg`].
#[derive(Debug, Clone)]
pub struct NumericArgBuilder<N: Numeric> {
    default: Option<N>,
    min: Option<N>,
    max: Option<N>,
    allow_none: bool,
    env_bind: Option<String>,
}

impl<N: Numeric> NumericArgBuilder<N> {
    /// Set the inclusive lower bound.
    pub fn min(mut self, min: N) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the inclusive upper bound.
    pub fn max(mut self, max: N) -> Self {
        self.max = Some(max);
        self
    }

    /// Set both inclusive bounds.
    pub fn range(self, min: N, max: N) -> Self {
        self.min(min).max(max)
    }

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

    /// Validate the bounds and default, then apply the environment override.
    ///
    /// # Errors
    ///
    /// Returns `ArgError` if the bounds are inverted or not finite, if the
    /// default violates them or the absence rule, or if the bound environment
    /// variable holds an invalid value.
    pub fn build(self) -> Result<NumericArg<N>, ArgError> {
        let min = self.min.map(N::ensure_finite).transpose()?;
        let max = self.max.map(N::ensure_finite).transpose()?;
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ArgError::invalid_bounds(min, max));
            }
        }

        let mut arg = NumericArg {
            value: None,
            min,
            max,
            allow_none: self.allow_none,
            env_bind: self.env_bind,
        };
        arg.value = arg.check(self.default)?;
        env::apply_override(&mut arg)?;
        Ok(arg)
    }
}
