//! Field values and the plain-data conversion context.
//!
//! Only three shapes may be declared as fields: Args, nested configuration
//! types and sequences of either. [`FieldValue`] is sealed to exactly those.

use std::fmt;

use hyperconf_args::{value_type_name, Arg, BoolArg, FloatArg, IntArg, OptionArg, StrArg};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{registry, ConfError, ConfResult, Configurable};

/// Declared shape of a field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// A scalar Arg of the given kind.
    Arg(hyperconf_args::ArgKind),
    /// A nested configuration object of the named type.
    Object(&'static str),
    /// A sequence, with the shape of each element.
    Sequence(Vec<FieldShape>),
}

impl FieldShape {
    /// Describes the plain data this shape accepts.
    pub fn expected(&self) -> String {
        match self {
            Self::Arg(kind) => kind.to_string(),
            Self::Object(_) => "mapping".to_string(),
            Self::Sequence(items) => sequence_of(items.len()),
        }
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arg(kind) => kind.fmt(f),
            Self::Object(name) => f.write_str(name),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

fn sequence_of(len: usize) -> String {
    format!("sequence of length {len}")
}

/// Options for applying plain data to a configuration instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Fail on input keys that match no declared field, at any depth.
    ///
    /// When `false` such keys are dropped, logged and reported.
    pub strict: bool,
}

impl ApplyOptions {
    /// Options that reject unexpected fields.
    pub const fn strict() -> Self {
        Self { strict: true }
    }

    /// Options that drop unexpected fields.
    pub const fn lenient() -> Self {
        Self { strict: false }
    }
}

/// Outcome of a successful apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Paths of the input keys that were dropped, in input order.
    pub ignored: Vec<String>,
}

impl ApplyReport {
    /// Whether every input key was consumed.
    pub fn is_clean(&self) -> bool {
        self.ignored.is_empty()
    }
}

/// State carried through one recursive apply.
#[derive(Debug)]
pub struct ApplyContext {
    options: ApplyOptions,
    path: Vec<String>,
    ignored: Vec<String>,
}

impl ApplyContext {
    /// Creates a context rooted at the top-level instance.
    pub fn new(options: ApplyOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
            ignored: Vec::new(),
        }
    }

    /// The options for this apply.
    pub fn options(&self) -> ApplyOptions {
        self.options
    }

    /// Path of the value currently being applied.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Path of `segment` below the current value.
    pub fn child_path(&self, segment: &str) -> String {
        if self.path.is_empty() {
            segment.to_owned()
        } else {
            format!("{}.{segment}", self.path())
        }
    }

    /// Runs `f` one path segment deeper.
    pub fn within<R>(&mut self, segment: impl Into<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment.into());
        let result = f(self);
        self.path.pop();
        result
    }

    pub(crate) fn ignore(&mut self, path: String) {
        self.ignored.push(path);
    }

    /// Finishes the apply.
    pub fn into_report(self) -> ApplyReport {
        ApplyReport {
            ignored: self.ignored,
        }
    }
}

/// Path segment addressing sequence position `index`.
pub fn index_segment(index: usize) -> String {
    format!("[{index}]")
}

mod sealed {
    pub trait Sealed {}
}

/// A value that can be declared as a configuration field.
///
/// Implemented for every Arg kind, every [`Configurable`] type and `Vec`s of
/// field values.
pub trait FieldValue: Clone + fmt::Debug + Send + Sync + 'static + sealed::Sealed {
    /// Current shape of the value.
    fn shape(&self) -> FieldShape;

    /// Plain-data form of the value.
    fn to_plain(&self) -> ConfResult<Value>;

    /// Converts `input` using the value's current shape and stores the result.
    ///
    /// Nested objects and sequence elements are updated in place.
    fn apply_plain(&mut self, input: Value, cx: &mut ApplyContext) -> ConfResult<()>;

    /// Checks that the value type can be declared.
    fn check_schema() -> ConfResult<()>;
}

macro_rules! arg_field_value {
    ($($arg:ty),+ $(,)?) => {$(
        impl sealed::Sealed for $arg {}

        impl FieldValue for $arg {
            fn shape(&self) -> FieldShape {
                FieldShape::Arg(self.kind())
            }

            fn to_plain(&self) -> ConfResult<Value> {
                Ok(Arg::to_plain(self))
            }

            fn apply_plain(&mut self, input: Value, cx: &mut ApplyContext) -> ConfResult<()> {
                self.parse(&input)
                    .map(drop)
                    .map_err(|source| ConfError::validation(cx.path(), source))
            }

            fn check_schema() -> ConfResult<()> {
                Ok(())
            }
        }
    )+};
}

arg_field_value!(IntArg, FloatArg, StrArg, BoolArg, OptionArg);

impl<T: Configurable> sealed::Sealed for T {}

impl<T: Configurable> FieldValue for T {
    fn shape(&self) -> FieldShape {
        FieldShape::Object(crate::schema::short_type_name::<T>())
    }

    fn to_plain(&self) -> ConfResult<Value> {
        let descriptor = registry::descriptor::<T>()?;
        descriptor.to_plain(self).map(Value::Object)
    }

    fn apply_plain(&mut self, input: Value, cx: &mut ApplyContext) -> ConfResult<()> {
        match input {
            Value::Object(map) => registry::descriptor::<T>()?.apply(self, map, cx),
            other => Err(ConfError::shape_mismatch(
                cx.path(),
                "mapping",
                value_type_name(&other),
            )),
        }
    }

    fn check_schema() -> ConfResult<()> {
        // Recursive types reach themselves through a sequence while declaring.
        if registry::is_building::<T>() {
            return Ok(());
        }
        registry::descriptor::<T>().map(drop)
    }
}

impl<F: FieldValue> sealed::Sealed for Vec<F> {}

impl<F: FieldValue> FieldValue for Vec<F> {
    fn shape(&self) -> FieldShape {
        FieldShape::Sequence(self.iter().map(F::shape).collect())
    }

    fn to_plain(&self) -> ConfResult<Value> {
        self.iter()
            .map(F::to_plain)
            .collect::<ConfResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn apply_plain(&mut self, input: Value, cx: &mut ApplyContext) -> ConfResult<()> {
        let items = match input {
            Value::Array(items) => items,
            other => {
                return Err(ConfError::shape_mismatch(
                    cx.path(),
                    sequence_of(self.len()),
                    value_type_name(&other),
                ))
            }
        };
        if items.len() != self.len() {
            return Err(ConfError::shape_mismatch(
                cx.path(),
                sequence_of(self.len()),
                sequence_of(items.len()),
            ));
        }

        for (index, (slot, item)) in self.iter_mut().zip(items).enumerate() {
            cx.within(index_segment(index), |cx| slot.apply_plain(item, cx))?;
        }
        Ok(())
    }

    fn check_schema() -> ConfResult<()> {
        F::check_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperconf_args::ArgKind;
    use serde_json::json;

    #[test]
    fn test_context_paths() {
        let mut cx = ApplyContext::new(ApplyOptions::default());
        assert_eq!(cx.path(), "");
        assert_eq!(cx.child_path("model"), "model");

        let nested = cx.within("model", |cx| {
            cx.within(index_segment(1), |cx| cx.child_path("units"))
        });
        assert_eq!(nested, "model.[1].units");
        assert_eq!(cx.path(), "");
    }

    #[test]
    fn test_arg_field_value() {
        let mut epochs = IntArg::builder(10).range(1, 100).build().unwrap();
        let mut cx = ApplyContext::new(ApplyOptions::strict());

        cx.within("epochs", |cx| epochs.apply_plain(json!("50"), cx))
            .unwrap();
        assert_eq!(FieldValue::to_plain(&epochs).unwrap(), json!(50));

        let err = cx
            .within("epochs", |cx| epochs.apply_plain(json!(200), cx))
            .unwrap_err();
        assert!(matches!(err, ConfError::Validation { ref path, .. } if path == "epochs"));
        assert_eq!(epochs.value(), Some(50));
        assert_eq!(epochs.shape(), FieldShape::Arg(ArgKind::Int));
    }

    #[test]
    fn test_sequence_length_must_match() {
        let mut sizes = vec![IntArg::new(1).unwrap(), IntArg::new(2).unwrap()];
        let mut cx = ApplyContext::new(ApplyOptions::default());

        let err = cx
            .within("sizes", |cx| sizes.apply_plain(json!([5]), cx))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfError::ShapeMismatch { ref expected, ref found, .. }
                if expected == "sequence of length 2" && found == "sequence of length 1"
        ));

        let err = sizes.apply_plain(json!({"0": 5}), &mut cx).unwrap_err();
        assert!(matches!(err, ConfError::ShapeMismatch { ref found, .. } if found == "mapping"));
    }

    #[test]
    fn test_sequence_element_paths() {
        let mut sizes = vec![IntArg::new(1).unwrap(), IntArg::new(2).unwrap()];
        let mut cx = ApplyContext::new(ApplyOptions::default());

        let err = cx
            .within("sizes", |cx| sizes.apply_plain(json!([3, "x"]), cx))
            .unwrap_err();
        assert_eq!(err.path(), Some("sizes.[1]"));

        sizes.apply_plain(json!([3, 4]), &mut cx).unwrap();
        assert_eq!(sizes.to_plain().unwrap(), json!([3, 4]));
        assert_eq!(sizes.shape().to_string(), "[int, int]");
    }

    #[test]
    fn test_shape_expected() {
        assert_eq!(FieldShape::Arg(ArgKind::Float).expected(), "float");
        assert_eq!(FieldShape::Object("Model").expected(), "mapping");
        assert_eq!(
            FieldShape::Sequence(vec![FieldShape::Object("Layer")]).expected(),
            "sequence of length 1"
        );
    }

    #[test]
    fn test_apply_options_deserialize() {
        let options: ApplyOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, ApplyOptions::lenient());
        let options: ApplyOptions = serde_json::from_value(json!({"strict": true})).unwrap();
        assert_eq!(options, ApplyOptions::strict());
    }
}
