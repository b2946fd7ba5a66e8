//! Typed scalar value holders for hyperconf.
//!
//! An *Arg* owns one scalar value that may be absent, plus the constraints
//! that every new value must satisfy:
//!
//! - [`IntArg`] and [`FloatArg`] - numbers with optional inclusive bounds
//! - [`StrArg`] - free-form strings
//! - [`BoolArg`] - booleans, also accepting `yes`/`no` and `1`/`0`
//! - [`OptionArg`] - one string out of a fixed option set
//!
//! Values change only through [`Arg::parse`], which coerces the input to the
//! Arg's kind, validates it and commits it. A rejected input leaves the Arg
//! untouched.
//!
//! # Example
//!
//! ```
//! use hyperconf_args::{Arg, BoolArg, IntArg, OptionArg};
//!
//! # fn main() -> Result<(), hyperconf_args::ArgError> {
//! let mut epochs = IntArg::builder(10).range(1, 100).build()?;
//! let mut verbose = BoolArg::new(false)?;
//! let optimizer = OptionArg::builder("adam", ["adam", "sgd"]).build()?;
//!
//! epochs.parse_str("25")?;
//! verbose.parse_str("yes")?;
//!
//! assert_eq!(epochs.value(), Some(25));
//! assert_eq!(verbose.value(), Some(true));
//! assert_eq!(optimizer.as_str(), Some("adam"));
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every builder accepts an `env_bind` name. When that variable is set at
//! construction time its text replaces the default, through the same
//! validation as any other input:
//!
//! ```no_run
//! use hyperconf_args::IntArg;
//!
//! // EPOCHS=42 in the environment yields 42 instead of 7.
//! let epochs = IntArg::builder(7).env_bind("EPOCHS").build().unwrap();
//! ```

#![warn(missing_docs)]

mod arg;
mod boolean;
mod env;
mod error;
mod numeric;
mod text;

pub use arg::{is_absent_marker, value_type_name, Arg, ArgKind};
pub use boolean::{parse_bool_word, BoolArg, BoolArgBuilder};
pub use error::ArgError;
pub use numeric::{FloatArg, IntArg, Numeric, NumericArg, NumericArgBuilder};
pub use text::{OptionArg, OptionArgBuilder, StrArg, StrArgBuilder};

/// Result type for Arg operations.
pub type ArgResult<T> = Result<T, ArgError>;
