//! Live configuration instances.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::descriptor::Descriptor;
use crate::field::{ApplyContext, ApplyOptions, ApplyReport, FieldValue};
use crate::{registry, ConfResult, Configurable};

/// A configuration instance bound to its type's descriptor.
///
/// Reads go through `Deref`. Every write goes through [`set`](Self::set),
/// [`replace`](Self::replace) or [`update`](Self::update), which run the
/// assigned fields' monitors. Writes are staged on a copy: a failing call
/// leaves the instance exactly as it was.
///
/// # Example
///
/// ```
/// use hyperconf_schema::{fields, ApplyOptions, Conf, ConfResult, Configurable, SchemaBuilder};
/// use hyperconf_args::{Arg, IntArg};
/// use serde_json::json;
///
/// #[derive(Debug, Clone)]
/// struct Batch {
///     size: IntArg,
/// }
///
/// impl Configurable for Batch {
///     fn defaults() -> ConfResult<Self> {
///         Ok(Self { size: IntArg::builder(32).range(1, 512).build()? })
///     }
///
///     fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
///         fields!(schema, size);
///         Ok(())
///     }
/// }
///
/// let mut batch = Conf::<Batch>::new().unwrap();
/// assert!(batch.set("size", 1024).is_err());
/// assert_eq!(batch.size.value(), Some(32));
///
/// let input = json!({"size": 64, "shuffle": true});
/// let report = batch
///     .update(input.as_object().unwrap().clone(), ApplyOptions::lenient())
///     .unwrap();
/// assert_eq!(report.ignored, vec!["shuffle"]);
/// assert_eq!(batch.size.value(), Some(64));
/// ```
pub struct Conf<T: Configurable> {
    descriptor: Arc<Descriptor<T>>,
    value: T,
}

impl<T: Configurable> Conf<T> {
    /// Creates an instance holding the type-level defaults.
    pub fn new() -> ConfResult<Self> {
        let descriptor = registry::descriptor::<T>()?;
        Ok(Self {
            value: descriptor.instantiate(),
            descriptor,
        })
    }

    /// Wraps an existing value.
    pub fn from_value(value: T) -> ConfResult<Self> {
        Ok(Self {
            descriptor: registry::descriptor::<T>()?,
            value,
        })
    }

    /// Creates an instance from the defaults overlaid with `input`.
    ///
    /// Keys dropped under lenient options are only logged; use
    /// [`from_plain_with_report`](Self::from_plain_with_report) to see them.
    pub fn from_plain(input: Map<String, Value>, options: ApplyOptions) -> ConfResult<Self> {
        Self::from_plain_with_report(input, options).map(|(conf, _)| conf)
    }

    /// Like [`from_plain`](Self::from_plain), also returning the dropped keys.
    pub fn from_plain_with_report(
        input: Map<String, Value>,
        options: ApplyOptions,
    ) -> ConfResult<(Self, ApplyReport)> {
        let descriptor = registry::descriptor::<T>()?;
        let (value, report) = descriptor.from_plain(input, options)?;
        Ok((Self { descriptor, value }, report))
    }

    /// The type's descriptor.
    pub fn descriptor(&self) -> &Descriptor<T> {
        &self.descriptor
    }

    /// Borrows `field` as `F`, if declared with that type.
    pub fn get<F: FieldValue>(&self, field: &str) -> Option<&F> {
        self.descriptor.get(&self.value, field)
    }

    /// Plain-data form of every declared field.
    pub fn to_plain(&self) -> ConfResult<Map<String, Value>> {
        self.descriptor.to_plain(&self.value)
    }

    /// Converts `input` into `field` and runs its monitors.
    ///
    /// Nested objects given as mappings must not contain unknown keys.
    ///
    /// # Errors
    ///
    /// [`ConfError::UnknownField`](crate::ConfError::UnknownField) for
    /// undeclared fields, plus any conversion or reaction error.
    pub fn set(&mut self, field: &str, input: impl Into<Value>) -> ConfResult<()> {
        let mut staged = self.value.clone();
        let mut cx = ApplyContext::new(ApplyOptions::strict());
        self.descriptor
            .assign(&mut staged, field, input.into(), &mut cx)?;
        self.value = staged;
        Ok(())
    }

    /// Stores a typed value into `field` and runs its monitors.
    pub fn replace<F: FieldValue>(&mut self, field: &str, value: F) -> ConfResult<()> {
        let mut staged = self.value.clone();
        self.descriptor.replace(&mut staged, field, value)?;
        self.value = staged;
        Ok(())
    }

    /// Applies `input` in dependency order.
    ///
    /// Returns the dropped keys under lenient options.
    pub fn update(
        &mut self,
        input: Map<String, Value>,
        options: ApplyOptions,
    ) -> ConfResult<ApplyReport> {
        let mut staged = self.value.clone();
        let mut cx = ApplyContext::new(options);
        self.descriptor.apply(&mut staged, input, &mut cx)?;
        self.value = staged;
        Ok(cx.into_report())
    }

    /// Unwraps the instance.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Configurable> Deref for Conf<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Configurable> AsRef<T> for Conf<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: Configurable> Clone for Conf<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            value: self.value.clone(),
        }
    }
}

impl<T: Configurable> fmt::Debug for Conf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Conf").field(&self.value).finish()
    }
}

impl<T: Configurable> fmt::Display for Conf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_plain() {
            Ok(plain) => write!(f, "{}({})", self.descriptor.type_name(), Value::Object(plain)),
            Err(_) => write!(f, "{}(..)", self.descriptor.type_name()),
        }
    }
}
