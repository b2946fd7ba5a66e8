//! Typed access to one field of a configuration struct.

use std::any::{type_name, Any};
use std::sync::Arc;

use serde_json::Value;

use crate::field::{ApplyContext, FieldShape, FieldValue};
use crate::ConfResult;

/// Type-erased view of one declared field of `T`.
pub(crate) trait Accessor<T>: Send + Sync {
    fn shape(&self, target: &T) -> FieldShape;

    fn to_plain(&self, target: &T) -> ConfResult<Value>;

    fn apply_plain(&self, target: &mut T, input: Value, cx: &mut ApplyContext) -> ConfResult<()>;

    /// Stores `value` if it has the field's type, otherwise hands it back.
    fn replace(&self, target: &mut T, value: Box<dyn Any>) -> Result<(), Box<dyn Any>>;

    fn value_any<'a>(&self, target: &'a T) -> &'a dyn Any;

    fn value_type(&self) -> &'static str;
}

/// A field stored directly on `T`.
pub(crate) struct Direct<T, F> {
    pub(crate) get: fn(&T) -> &F,
    pub(crate) get_mut: fn(&mut T) -> &mut F,
}

impl<T: 'static, F: FieldValue> Accessor<T> for Direct<T, F> {
    fn shape(&self, target: &T) -> FieldShape {
        (self.get)(target).shape()
    }

    fn to_plain(&self, target: &T) -> ConfResult<Value> {
        (self.get)(target).to_plain()
    }

    fn apply_plain(&self, target: &mut T, input: Value, cx: &mut ApplyContext) -> ConfResult<()> {
        (self.get_mut)(target).apply_plain(input, cx)
    }

    fn replace(&self, target: &mut T, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        *(self.get_mut)(target) = *value.downcast::<F>()?;
        Ok(())
    }

    fn value_any<'a>(&self, target: &'a T) -> &'a dyn Any {
        (self.get)(target)
    }

    fn value_type(&self) -> &'static str {
        type_name::<F>()
    }
}

/// A field of an embedded base configuration `B`, exposed on `D`.
pub(crate) struct Projected<D, B> {
    pub(crate) inner: Arc<dyn Accessor<B>>,
    pub(crate) get: fn(&D) -> &B,
    pub(crate) get_mut: fn(&mut D) -> &mut B,
}

impl<D: 'static, B: 'static> Accessor<D> for Projected<D, B> {
    fn shape(&self, target: &D) -> FieldShape {
        self.inner.shape((self.get)(target))
    }

    fn to_plain(&self, target: &D) -> ConfResult<Value> {
        self.inner.to_plain((self.get)(target))
    }

    fn apply_plain(&self, target: &mut D, input: Value, cx: &mut ApplyContext) -> ConfResult<()> {
        self.inner.apply_plain((self.get_mut)(target), input, cx)
    }

    fn replace(&self, target: &mut D, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        self.inner.replace((self.get_mut)(target), value)
    }

    fn value_any<'a>(&self, target: &'a D) -> &'a dyn Any {
        self.inner.value_any((self.get)(target))
    }

    fn value_type(&self) -> &'static str {
        self.inner.value_type()
    }
}
