//! Text encodings on live instances.

use hyperconf_schema::{ApplyOptions, ApplyReport, Conf, Configurable};

use crate::format::{decode, encode, EncodeOptions, Format};
use crate::FormatResult;

/// Encodes and decodes [`Conf`] instances as JSON, TOML or YAML.
///
/// Encoding goes through `to_plain`; decoding parses the text into a mapping
/// and applies it in dependency order.
pub trait ConfFormatExt: Sized {
    /// Encodes the instance as `format`.
    fn to_string_as(&self, format: Format, options: &EncodeOptions) -> FormatResult<String>;

    /// Creates an instance from the defaults overlaid with `text`, returning
    /// the keys dropped under lenient options.
    fn from_str_with_report(
        format: Format,
        text: &str,
        options: ApplyOptions,
    ) -> FormatResult<(Self, ApplyReport)>;

    /// Applies `text` to this instance. Nothing changes on error.
    fn update_from_str(
        &mut self,
        format: Format,
        text: &str,
        options: ApplyOptions,
    ) -> FormatResult<ApplyReport>;

    /// Creates an instance from the defaults overlaid with `text`.
    fn from_str_as(format: Format, text: &str, options: ApplyOptions) -> FormatResult<Self> {
        Self::from_str_with_report(format, text, options).map(|(conf, _)| conf)
    }

    /// Compact JSON.
    fn to_json(&self) -> FormatResult<String> {
        self.to_string_as(Format::Json, &EncodeOptions::default())
    }

    /// JSON with the given options.
    fn to_json_with(&self, options: &EncodeOptions) -> FormatResult<String> {
        self.to_string_as(Format::Json, options)
    }

    /// TOML. Fails if any value is absent.
    fn to_toml(&self) -> FormatResult<String> {
        self.to_string_as(Format::Toml, &EncodeOptions::default())
    }

    /// YAML.
    fn to_yaml(&self) -> FormatResult<String> {
        self.to_string_as(Format::Yaml, &EncodeOptions::default())
    }

    /// Decodes JSON.
    fn from_json(text: &str, options: ApplyOptions) -> FormatResult<Self> {
        Self::from_str_as(Format::Json, text, options)
    }

    /// Decodes TOML.
    fn from_toml(text: &str, options: ApplyOptions) -> FormatResult<Self> {
        Self::from_str_as(Format::Toml, text, options)
    }

    /// Decodes YAML.
    fn from_yaml(text: &str, options: ApplyOptions) -> FormatResult<Self> {
        Self::from_str_as(Format::Yaml, text, options)
    }
}

impl<T: Configurable> ConfFormatExt for Conf<T> {
    fn to_string_as(&self, format: Format, options: &EncodeOptions) -> FormatResult<String> {
        let plain = self.to_plain()?;
        encode(format, &plain, options)
    }

    fn from_str_with_report(
        format: Format,
        text: &str,
        options: ApplyOptions,
    ) -> FormatResult<(Self, ApplyReport)> {
        let input = decode(format, text)?;
        Ok(Self::from_plain_with_report(input, options)?)
    }

    fn update_from_str(
        &mut self,
        format: Format,
        text: &str,
        options: ApplyOptions,
    ) -> FormatResult<ApplyReport> {
        let input = decode(format, text)?;
        Ok(self.update(input, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatError;
    use hyperconf_args::{Arg, FloatArg, IntArg, StrArg};
    use hyperconf_schema::{fields, ConfError, ConfResult, SchemaBuilder};

    #[derive(Debug, Clone)]
    struct Sgd {
        rate: FloatArg,
        momentum: FloatArg,
        epochs: IntArg,
        note: StrArg,
    }

    impl Configurable for Sgd {
        fn defaults() -> ConfResult<Self> {
            Ok(Self {
                rate: FloatArg::builder(0.1).range(0.0, 1.0).build()?,
                momentum: FloatArg::new(0.9)?,
                epochs: IntArg::builder(10).min(1).build()?,
                note: StrArg::absent().build()?,
            })
        }

        fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
            fields!(schema, rate, momentum, epochs, note);
            Ok(())
        }
    }

    #[test]
    fn test_json_round_trip() {
        let mut conf = Conf::<Sgd>::new().unwrap();
        conf.set("epochs", 30).unwrap();
        let text = conf.to_json().unwrap();
        assert_eq!(
            text,
            r#"{"rate":0.1,"momentum":0.9,"epochs":30,"note":null}"#
        );

        let back = Conf::<Sgd>::from_json(&text, ApplyOptions::strict()).unwrap();
        assert_eq!(back.epochs.value(), Some(30));
        assert!(back.note.is_absent());
    }

    #[test]
    fn test_toml_fails_on_absent_value() {
        let conf = Conf::<Sgd>::new().unwrap();
        let err = conf.to_toml().unwrap_err();
        assert!(matches!(err, FormatError::TomlNull { ref path } if path == "note"));

        let mut conf = conf;
        conf.set("note", "warmup").unwrap();
        let text = conf.to_toml().unwrap();
        assert!(text.contains("note = \"warmup\""));
    }

    #[test]
    fn test_yaml_update_is_atomic() {
        let mut conf = Conf::<Sgd>::new().unwrap();
        let err = conf
            .update_from_str(Format::Yaml, "epochs: 5\nrate: 3.0\n", ApplyOptions::strict())
            .unwrap_err();
        assert!(matches!(err.as_conf_error(), Some(ConfError::Validation { .. })));
        assert_eq!(conf.epochs.value(), Some(10));

        let report = conf
            .update_from_str(Format::Yaml, "epochs: 5\nextra: 1\n", ApplyOptions::lenient())
            .unwrap();
        assert_eq!(report.ignored, vec!["extra"]);
        assert_eq!(conf.epochs.value(), Some(5));
    }

    #[test]
    fn test_lenient_decode_reports_dropped_keys() {
        let (conf, report) = Conf::<Sgd>::from_str_with_report(
            Format::Json,
            r#"{"epochs": 4, "warmup": 2}"#,
            ApplyOptions::lenient(),
        )
        .unwrap();
        assert_eq!(conf.epochs.value(), Some(4));
        assert_eq!(report.ignored, vec!["warmup"]);

        let (_, report) =
            Conf::<Sgd>::from_str_with_report(Format::Yaml, "epochs: 4\n", ApplyOptions::lenient())
                .unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn test_strict_decode_rejects_unknown_keys() {
        let err = Conf::<Sgd>::from_toml("epochs = 3\nbogus = 1\n", ApplyOptions::strict())
            .unwrap_err();
        assert!(matches!(
            err.as_conf_error(),
            Some(ConfError::UnexpectedFields { fields }) if fields == &["bogus"]
        ));
    }
}
