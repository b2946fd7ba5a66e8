//! Loading and saving configuration files.
//!
//! The format is chosen from the file extension: `.json`, `.toml`, `.yaml`
//! or `.yml`.

use std::fs;
use std::path::Path;

use hyperconf_schema::{ApplyOptions, ApplyReport, Conf, Configurable};
use tracing::debug;

use crate::ext::ConfFormatExt;
use crate::format::{EncodeOptions, Format};
use crate::{FormatError, FormatResult};

/// Loads a configuration file into a fresh instance.
///
/// # Errors
///
/// Returns `FormatError` if the extension is not recognized, the file cannot
/// be read, does not parse, or does not fit `T`.
///
/// # Example
///
/// ```no_run
/// use hyperconf_formats::load_file;
/// use hyperconf_schema::ApplyOptions;
/// # use hyperconf_schema::{Configurable, ConfResult, SchemaBuilder};
/// # #[derive(Debug, Clone)]
/// # struct Train;
/// # impl Configurable for Train {
/// #     fn defaults() -> ConfResult<Self> { Ok(Self) }
/// #     fn declare(_: &mut SchemaBuilder<Self>) -> ConfResult<()> { Ok(()) }
/// # }
///
/// # fn main() -> Result<(), hyperconf_formats::FormatError> {
/// let train = load_file::<Train>("train.toml", ApplyOptions::strict())?;
/// # Ok(())
/// # }
/// ```
pub fn load_file<T: Configurable>(
    path: impl AsRef<Path>,
    options: ApplyOptions,
) -> FormatResult<Conf<T>> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|e| FormatError::read(path, e))?;

    let conf = Conf::from_str_as(format, &text, options)?;
    debug!(path = %path.display(), %format, "loaded configuration file");
    Ok(conf)
}

/// Applies a configuration file to an existing instance.
///
/// Nothing changes if any step fails.
pub fn update_from_file<T: Configurable>(
    conf: &mut Conf<T>,
    path: impl AsRef<Path>,
    options: ApplyOptions,
) -> FormatResult<ApplyReport> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|e| FormatError::read(path, e))?;

    let report = conf.update_from_str(format, &text, options)?;
    debug!(
        path = %path.display(),
        %format,
        ignored = report.ignored.len(),
        "applied configuration file"
    );
    Ok(report)
}

/// Writes an instance to a file, replacing any existing content.
///
/// # Errors
///
/// Returns `FormatError` if the extension is not recognized, the instance
/// cannot be encoded in that format, or the file cannot be written.
pub fn save_file<T: Configurable>(
    conf: &Conf<T>,
    path: impl AsRef<Path>,
    options: &EncodeOptions,
) -> FormatResult<()> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let text = conf.to_string_as(format, options)?;

    fs::write(path, text).map_err(|e| FormatError::write(path, e))?;
    debug!(path = %path.display(), %format, "saved configuration file");
    Ok(())
}
