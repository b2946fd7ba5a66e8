//! Schema and deserialization error types.

use hyperconf_args::ArgError;
use thiserror::Error;

use crate::monitor::ReactionError;

/// Result type alias using [`ConfError`].
pub type ConfResult<T> = Result<T, ConfError>;

/// Errors raised while declaring configuration types or moving values in and
/// out of them.
///
/// Paths name the failing field from the root of the call, with sequence
/// positions written as `[N]` segments: `optimizer.layers.[1].units`.
#[derive(Error, Debug)]
pub enum ConfError {
    /// A configuration type could not be declared.
    #[error("invalid schema for {type_name}: {reason}")]
    Schema {
        /// The configuration type being declared.
        type_name: String,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// Adding the dependency would create a cycle.
    #[error("dependency from `{parent}` to `{child}` would create a cycle")]
    Cycle {
        /// The requested parent field.
        parent: String,
        /// The requested child field.
        child: String,
    },

    /// The dependency already exists.
    #[error("dependency from `{parent}` to `{child}` already exists")]
    DuplicateEdge {
        /// The parent field.
        parent: String,
        /// The child field.
        child: String,
    },

    /// The field is not declared on the configuration type.
    #[error("unknown field `{field}`")]
    UnknownField {
        /// The undeclared field name.
        field: String,
    },

    /// An Arg rejected its new value.
    #[error("invalid value for `{path}`: {source}")]
    Validation {
        /// Path of the rejected field.
        path: String,
        /// Why the Arg rejected the value.
        #[source]
        source: ArgError,
    },

    /// A configuration type's default value was rejected.
    #[error("invalid default: {0}")]
    InvalidDefault(#[from] ArgError),

    /// The plain data does not have the shape the field declares.
    #[error("shape mismatch at `{path}`: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Path of the mismatched field.
        path: String,
        /// The shape the field declares.
        expected: String,
        /// The shape found in the input.
        found: String,
    },

    /// Strict deserialization found keys no field consumed.
    #[error("unexpected fields: {}", fields.join(", "))]
    UnexpectedFields {
        /// Paths of the unconsumed keys, in input order.
        fields: Vec<String>,
    },

    /// A monitor reaction failed.
    #[error("reaction `{reaction}` on `{path}` failed: {source}")]
    Reaction {
        /// Path of the assigned field.
        path: String,
        /// Name of the failing reaction.
        reaction: String,
        /// The reaction's error.
        #[source]
        source: ReactionError,
    },

    /// A typed replacement does not match the field's declared type.
    #[error("field `{field}` holds {expected}, not {found}")]
    TypeMismatch {
        /// The field being replaced.
        field: String,
        /// The declared field type.
        expected: &'static str,
        /// The type that was supplied.
        found: &'static str,
    },
}

impl ConfError {
    /// Create a new schema error.
    pub fn schema(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new cycle error.
    pub fn cycle(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::Cycle {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Create a new duplicate edge error.
    pub fn duplicate_edge(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::DuplicateEdge {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Create a new unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation(path: impl Into<String>, source: ArgError) -> Self {
        Self::Validation {
            path: path.into(),
            source,
        }
    }

    /// Create a new shape mismatch error.
    pub fn shape_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a new reaction error.
    pub fn reaction(
        path: impl Into<String>,
        reaction: impl Into<String>,
        source: ReactionError,
    ) -> Self {
        Self::Reaction {
            path: path.into(),
            reaction: reaction.into(),
            source,
        }
    }

    /// Returns `true` for errors raised by a graph mutation.
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::Cycle { .. } | Self::DuplicateEdge { .. } | Self::UnknownField { .. }
        )
    }

    /// Path of the failing field, for errors raised while applying values.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Validation { path, .. }
            | Self::ShapeMismatch { path, .. }
            | Self::Reaction { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ConfError::validation("optimizer.lr", ArgError::AbsentNotAllowed);
        assert_eq!(
            err.to_string(),
            "invalid value for `optimizer.lr`: value cannot be none"
        );
        assert_eq!(err.path(), Some("optimizer.lr"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unexpected_fields_display() {
        let err = ConfError::UnexpectedFields {
            fields: vec!["bogus".to_string(), "model.extra".to_string()],
        };
        assert_eq!(err.to_string(), "unexpected fields: bogus, model.extra");
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_invalid_default_from_arg_error() {
        fn build() -> ConfResult<()> {
            Err(ArgError::EmptyOptions)?;
            Ok(())
        }
        let err = build().unwrap_err();
        assert!(matches!(err, ConfError::InvalidDefault(ArgError::EmptyOptions)));
        assert_eq!(err.to_string(), "invalid default: option set cannot be empty");
    }

    #[test]
    fn test_graph_errors() {
        assert!(ConfError::cycle("a", "b").is_graph_error());
        assert!(ConfError::duplicate_edge("a", "b").is_graph_error());
        assert!(ConfError::unknown_field("a").is_graph_error());
        assert!(!ConfError::schema("Train", "bad").is_graph_error());
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = ConfError::shape_mismatch("layers", "sequence of length 2", "mapping");
        assert_eq!(
            err.to_string(),
            "shape mismatch at `layers`: expected sequence of length 2, found mapping"
        );
    }
}
