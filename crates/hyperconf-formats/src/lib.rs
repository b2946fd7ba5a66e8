//! JSON, TOML and YAML encodings of hyperconf configurations.
//!
//! Every encoding is a structural serialization of the plain-data tree that
//! [`Conf::to_plain`](hyperconf_schema::Conf::to_plain) produces. Decoding
//! parses text back into a mapping and applies it in dependency order, so the
//! same validation, ordering and monitor rules hold for every format.
//!
//! ```
//! use hyperconf_formats::{decode, encode, EncodeOptions, Format};
//!
//! let data = decode(Format::Yaml, "epochs: 10\nrate: 0.01\n").unwrap();
//! let json = encode(Format::Json, &data, &EncodeOptions::default()).unwrap();
//! assert_eq!(json, r#"{"epochs":10,"rate":0.01}"#);
//! ```
//!
//! TOML has no null, so a configuration holding an absent value cannot be
//! written as TOML.

#![warn(missing_docs)]

mod error;
mod ext;
mod file;
mod format;

pub use error::{FormatError, FormatResult};
pub use ext::ConfFormatExt;
pub use file::{load_file, save_file, update_from_file};
pub use format::{decode, encode, EncodeOptions, Format};
