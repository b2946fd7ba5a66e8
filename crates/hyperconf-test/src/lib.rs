//! # Hyperconf Test
//!
//! Test utilities shared by the hyperconf crates.
//!
//! - [`fixtures`]: configuration types covering every field shape, nesting,
//!   dependencies, monitors and environment bindings
//! - [`init_test_logging`]: a `tracing` subscriber routed through the test
//!   harness, filtered by `HYPERCONF_LOG`
//! - [`EnvGuard`]: serialized, self-restoring environment changes
//!
//! ```
//! use hyperconf_schema::Conf;
//! use hyperconf_test::fixtures::TrainConfig;
//! use hyperconf_test::init_test_logging;
//!
//! init_test_logging();
//! let train = Conf::<TrainConfig>::new().unwrap();
//! assert_eq!(train.to_string(), r#"TrainConfig({"epochs":10,"rate":0.01})"#);
//! ```

#![warn(missing_docs)]

mod env;
pub mod fixtures;
mod logging;

pub use env::EnvGuard;
pub use logging::{init_test_logging, LOG_ENV};
