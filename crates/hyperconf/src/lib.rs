//! # Hyperconf
//!
//! Typed hyperparameter configurations: validated scalar Args, nested and
//! sequenced configuration objects, dependency-ordered loading, change
//! monitors and JSON/TOML/YAML encodings.
//!
//! ## Quick Start
//!
//! ```
//! use hyperconf::prelude::*;
//! use serde_json::json;
//!
//! #[derive(Debug, Clone)]
//! struct Train {
//!     epochs: IntArg,
//!     rate: FloatArg,
//!     schedule: OptionArg,
//! }
//!
//! impl Configurable for Train {
//!     fn defaults() -> ConfResult<Self> {
//!         Ok(Self {
//!             epochs: IntArg::builder(10).range(1, 100).build()?,
//!             rate: FloatArg::builder(0.01).range(0.0, 1.0).build()?,
//!             schedule: OptionArg::builder("constant", ["constant", "cosine"]).build()?,
//!         })
//!     }
//!
//!     fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
//!         fields!(schema, epochs, rate, schedule);
//!         // A cosine schedule decays from the configured rate.
//!         schema.add_dependency("rate", "schedule")?;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut train = Conf::<Train>::from_yaml("epochs: 50\n", ApplyOptions::strict())?;
//! assert_eq!(train.epochs.value(), Some(50));
//!
//! assert!(train.set("epochs", 200).is_err());
//! assert_eq!(train.epochs.value(), Some(50));
//!
//! train.set("schedule", "cosine")?;
//! assert_eq!(
//!     train.to_json()?,
//!     json!({"epochs": 50, "rate": 0.01, "schedule": "cosine"}).to_string()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | module      | contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`args`]    | `IntArg`, `FloatArg`, `StrArg`, `BoolArg`, `OptionArg`      |
//! | [`schema`]  | `Configurable`, descriptors, dependency graph, `Conf`       |
//! | [`formats`] | JSON, TOML and YAML encodings, file load and save           |
//! | [`flatten`] | flat dotted-key namespaces to and from plain data           |

#![doc(html_root_url = "https://docs.rs/hyperconf/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export Arg types
pub use hyperconf_args as args;

// Re-export schema types
pub use hyperconf_schema as schema;

// Re-export text encodings
pub use hyperconf_formats as formats;

// Re-export flat-key conversion
pub use hyperconf_flatten as flatten;

// Re-export the field declaration macro
pub use hyperconf_schema::fields;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hyperconf::prelude::*;
/// ```
pub mod prelude {
    pub use hyperconf_args::{
        Arg, ArgError, ArgKind, BoolArg, FloatArg, IntArg, OptionArg, StrArg,
    };

    pub use hyperconf_schema::{
        fields, ApplyOptions, ApplyReport, Conf, ConfError, ConfResult, Configurable,
        ReactionError, SchemaBuilder,
    };

    pub use hyperconf_formats::{
        load_file, save_file, ConfFormatExt, EncodeOptions, Format, FormatError,
    };

    pub use hyperconf_flatten::{flatten, unflatten, FlattenError};
}
