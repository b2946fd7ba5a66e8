//! Configuration schemas for hyperconf.
//!
//! A configuration type is a plain struct whose fields are Args, nested
//! configuration types, or sequences of either. Implementing
//! [`Configurable`] declares it:
//!
//! - `defaults` supplies the type-level default values
//! - `declare` lists the fields on a [`SchemaBuilder`], together with field
//!   dependencies and monitors
//!
//! The first request for a type's [`Descriptor`] runs both and stores the
//! result in a process-wide registry. The descriptor is immutable from then on;
//! each [`Conf`] instance owns a private copy of the values.
//!
//! # Dependencies
//!
//! `add_dependency(parent, child)` guarantees that, when plain data is
//! applied, `parent` is converted and assigned before `child`. Dependencies
//! form a [`DependencyGraph`] that rejects cycles, duplicates and undeclared
//! fields without changing.
//!
//! # Monitors
//!
//! `monitor(fields, name, reaction)` binds a reaction that runs whenever one of
//! the fields is assigned on a live instance, whether by [`Conf::set`] or while
//! applying plain data.
//!
//! # Plain Data
//!
//! [`Conf::to_plain`] converts an instance to a `serde_json` map, with absent
//! values as `null`. [`Conf::update`] and [`Conf::from_plain`] go the other way,
//! rejecting or dropping unexpected keys according to [`ApplyOptions`].

#![warn(missing_docs)]

mod accessor;
mod descriptor;
mod error;
mod field;
mod graph;
mod instance;
mod monitor;
mod registry;
mod schema;

pub use descriptor::Descriptor;
pub use error::{ConfError, ConfResult};
pub use field::{index_segment, ApplyContext, ApplyOptions, ApplyReport, FieldShape, FieldValue};
pub use graph::DependencyGraph;
pub use instance::Conf;
pub use monitor::{MonitorTable, ReactionError, ReactionFn};
pub use registry::{descriptor, is_registered, register};
pub use schema::{Configurable, SchemaBuilder};
