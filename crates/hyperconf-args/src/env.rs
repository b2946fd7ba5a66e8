//! Environment variable overrides applied at Arg construction.

use std::env::{self, VarError};

use tracing::debug;

use crate::{Arg, ArgError};

/// Reads the Arg's bound environment variable, if any, and feeds it through
/// [`Arg::parse`].
///
/// The variable is read once, after the constructor default was validated.
pub(crate) fn apply_override<A: Arg>(arg: &mut A) -> Result<(), ArgError> {
    let Some(var) = arg.env_bind().map(str::to_owned) else {
        return Ok(());
    };

    match env::var(&var) {
        Ok(text) => {
            arg.parse_str(&text)
                .map_err(|source| ArgError::env_override(var.as_str(), source))?;
            debug!(var = %var, value = %arg, "applied environment override");
            Ok(())
        }
        Err(VarError::NotPresent) => Ok(()),
        Err(VarError::NotUnicode(_)) => Err(ArgError::EnvNotUnicode { var }),
    }
}
