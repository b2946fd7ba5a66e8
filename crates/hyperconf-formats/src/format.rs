//! Text encodings of plain configuration data.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use hyperconf_args::value_type_name;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use crate::{FormatError, FormatResult};

/// A supported text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// JSON.
    Json,
    /// TOML.
    Toml,
    /// YAML.
    Yaml,
}

impl Format {
    /// All supported formats.
    pub const ALL: [Self; 3] = [Self::Json, Self::Toml, Self::Yaml];

    /// Picks the format for a file extension (`json`, `toml`, `yaml`, `yml`).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Picks the format for a file path by its extension.
    pub fn from_path(path: &Path) -> FormatResult<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| FormatError::unsupported_format(path.display().to_string()))
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
        })
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| FormatError::unsupported_format(s))
    }
}

/// Encoding options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Indent JSON output by this many spaces. `None` writes compact JSON.
    pub json_indent: Option<usize>,
}

impl EncodeOptions {
    /// Options producing JSON indented by `indent` spaces.
    pub const fn pretty(indent: usize) -> Self {
        Self {
            json_indent: Some(indent),
        }
    }
}

/// Encodes a plain-data mapping.
///
/// # Errors
///
/// [`FormatError::TomlNull`] when encoding an absent value as TOML, or the
/// underlying encoder's error.
pub fn encode(
    format: Format,
    data: &Map<String, Value>,
    options: &EncodeOptions,
) -> FormatResult<String> {
    match format {
        Format::Json => encode_json(data, options.json_indent),
        Format::Toml => {
            if let Some(path) = find_null(data) {
                return Err(FormatError::TomlNull { path });
            }
            Ok(toml::to_string(data)?)
        }
        Format::Yaml => Ok(serde_yaml::to_string(data)?),
    }
}

/// Decodes text into a plain-data mapping.
///
/// # Errors
///
/// [`FormatError::NotAMapping`] if the top-level value is not a mapping, or
/// the underlying parser's error.
pub fn decode(format: Format, text: &str) -> FormatResult<Map<String, Value>> {
    let value: Value = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Toml => toml::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    };
    match value {
        Value::Object(map) => Ok(map),
        other => Err(FormatError::NotAMapping {
            format,
            found: value_type_name(&other),
        }),
    }
}

fn encode_json(data: &Map<String, Value>, indent: Option<usize>) -> FormatResult<String> {
    let Some(width) = indent else {
        return Ok(serde_json::to_string(data)?);
    };

    let indent = " ".repeat(width);
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    data.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// Path of the first null in the tree, depth first.
fn find_null(data: &Map<String, Value>) -> Option<String> {
    fn walk(value: &Value, path: String) -> Option<String> {
        match value {
            Value::Null => Some(path),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .find_map(|(index, item)| walk(item, format!("{path}.[{index}]"))),
            Value::Object(map) => map
                .iter()
                .find_map(|(key, item)| walk(item, format!("{path}.{key}"))),
            _ => None,
        }
    }

    data.iter()
        .find_map(|(key, value)| walk(value, key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Map<String, Value> {
        match json!({"epochs": 10, "rate": 0.01, "tags": ["a", "b"], "model": {"units": 8}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("JSON"), Some(Format::Json));
        assert_eq!(Format::from_extension("yml"), Some(Format::Yaml));
        assert_eq!(Format::from_extension("ini"), None);
        assert_eq!("toml".parse::<Format>().unwrap(), Format::Toml);
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("conf/train.yaml")).unwrap(), Format::Yaml);
        let err = Format::from_path(Path::new("conf/train")).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_json_compact_and_indented() {
        let data = sample();
        let compact = encode(Format::Json, &data, &EncodeOptions::default()).unwrap();
        assert_eq!(
            compact,
            r#"{"epochs":10,"rate":0.01,"tags":["a","b"],"model":{"units":8}}"#
        );

        let pretty = encode(Format::Json, &data, &EncodeOptions::pretty(4)).unwrap();
        assert!(pretty.contains("\n    \"epochs\": 10,"));
        assert_eq!(decode(Format::Json, &pretty).unwrap(), data);
    }

    #[test]
    fn test_toml_and_yaml_decode_to_same_tree() {
        let data = sample();
        for format in [Format::Toml, Format::Yaml] {
            let text = encode(format, &data, &EncodeOptions::default()).unwrap();
            assert_eq!(decode(format, &text).unwrap(), data, "{format}");
        }
    }

    #[test]
    fn test_yaml_keeps_field_order() {
        let text = encode(Format::Yaml, &sample(), &EncodeOptions::default()).unwrap();
        let epochs = text.find("epochs").unwrap();
        let model = text.find("model").unwrap();
        assert!(epochs < model);
    }

    #[test]
    fn test_toml_rejects_null() {
        let mut data = sample();
        data.insert("layers".to_string(), json!([{"units": 1}, {"units": null}]));
        let err = encode(Format::Toml, &data, &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::TomlNull { ref path } if path == "layers.[1].units"));

        assert!(encode(Format::Json, &data, &EncodeOptions::default()).is_ok());
        assert!(encode(Format::Yaml, &data, &EncodeOptions::default()).is_ok());
    }

    #[test]
    fn test_decode_rejects_non_mapping() {
        let err = decode(Format::Json, "[1, 2]").unwrap_err();
        assert!(matches!(
            err,
            FormatError::NotAMapping { format: Format::Json, found: "sequence" }
        ));

        let err = decode(Format::Yaml, "- a\n- b\n").unwrap_err();
        assert!(matches!(err, FormatError::NotAMapping { format: Format::Yaml, .. }));

        let err = decode(Format::Yaml, "42").unwrap_err();
        assert!(matches!(err, FormatError::NotAMapping { found: "number", .. }));
    }

    #[test]
    fn test_decode_parse_errors() {
        assert!(matches!(decode(Format::Json, "{"), Err(FormatError::Json(_))));
        assert!(matches!(
            decode(Format::Toml, "epochs = "),
            Err(FormatError::TomlDecode(_))
        ));
        assert!(matches!(
            decode(Format::Yaml, "a: [1, 2"),
            Err(FormatError::Yaml(_))
        ));
    }
}
