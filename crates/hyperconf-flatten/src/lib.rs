//! Flat dotted-key namespaces for hyperconf plain data.
//!
//! Form-style front ends keep one value per widget under a flat key such as
//! `ui.optimizer.layers.[0].units`. [`unflatten`] nests such entries into the
//! mapping that `Conf::update` consumes; [`flatten`] lists the leaves of a
//! `to_plain` mapping under the same key scheme.

#![warn(missing_docs)]

mod error;
mod tree;

pub use error::{FlattenError, FlattenResult};
pub use tree::{flatten, unflatten, MAX_SEQUENCE_INDEX};
