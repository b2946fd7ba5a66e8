//! Integration tests for loading and saving configuration files.

use std::fs;

use hyperconf_args::{Arg, IntArg, OptionArg};
use hyperconf_formats::{
    load_file, save_file, update_from_file, ConfFormatExt, EncodeOptions, Format, FormatError,
};
use hyperconf_schema::{fields, ApplyOptions, Conf, ConfError, ConfResult, Configurable, SchemaBuilder};
use tempfile::TempDir;

#[derive(Debug, Clone)]
struct Layer {
    units: IntArg,
    activation: OptionArg,
}

impl Configurable for Layer {
    fn defaults() -> ConfResult<Self> {
        Ok(Self {
            units: IntArg::builder(16).range(1, 4096).build()?,
            activation: OptionArg::builder("relu", ["relu", "tanh", "gelu"]).build()?,
        })
    }

    fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
        fields!(schema, units, activation);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Network {
    seed: IntArg,
    layers: Vec<Layer>,
}

impl Configurable for Network {
    fn defaults() -> ConfResult<Self> {
        Ok(Self {
            seed: IntArg::new(0)?,
            layers: vec![Layer::defaults()?, Layer::defaults()?],
        })
    }

    fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
        fields!(schema, seed, layers);
        Ok(())
    }
}

fn customized() -> Conf<Network> {
    let mut net = Conf::<Network>::new().unwrap();
    net.set("seed", 7).unwrap();
    net.set("layers", serde_json::json!([{"units": 64}, {"activation": "gelu"}]))
        .unwrap();
    net
}

#[test]
fn test_save_and_load_every_format() {
    let dir = TempDir::new().unwrap();
    let net = customized();

    for format in Format::ALL {
        let path = dir.path().join(format!("network.{}", format.extension()));
        save_file(&net, &path, &EncodeOptions::pretty(2)).unwrap();

        let loaded = load_file::<Network>(&path, ApplyOptions::strict()).unwrap();
        assert_eq!(loaded.to_plain().unwrap(), net.to_plain().unwrap(), "{format}");
        assert_eq!(loaded.layers[0].units.value(), Some(64));
        assert_eq!(loaded.layers[1].activation.as_str(), Some("gelu"));
    }
}

#[test]
fn test_yml_extension_is_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("network.yml");
    fs::write(&path, "seed: 3\n").unwrap();

    let loaded = load_file::<Network>(&path, ApplyOptions::strict()).unwrap();
    assert_eq!(loaded.seed.value(), Some(3));
    assert_eq!(loaded.layers.len(), 2);
}

#[test]
fn test_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("network.ini");
    fs::write(&path, "seed = 3\n").unwrap();

    let err = load_file::<Network>(&path, ApplyOptions::strict()).unwrap_err();
    assert!(matches!(err, FormatError::UnsupportedFormat(_)));

    let err = save_file(&customized(), &path, &EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, FormatError::UnsupportedFormat(_)));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_file::<Network>(dir.path().join("absent.json"), ApplyOptions::strict())
        .unwrap_err();
    assert!(matches!(err, FormatError::Read { .. }));
}

#[test]
fn test_top_level_must_be_mapping() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("network.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let err = load_file::<Network>(&path, ApplyOptions::strict()).unwrap_err();
    assert!(matches!(
        err,
        FormatError::NotAMapping { format: Format::Json, found: "sequence" }
    ));
}

#[test]
fn test_sequence_length_mismatch_reports_path() {
    let err = Conf::<Network>::from_json(r#"{"layers": [{"units": 1}]}"#, ApplyOptions::strict())
        .unwrap_err();
    match err.as_conf_error() {
        Some(ConfError::ShapeMismatch { path, .. }) => assert_eq!(path, "layers"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_option_in_file_keeps_instance() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("patch.yaml");
    fs::write(&path, "seed: 9\nlayers:\n  - activation: swish\n  - {}\n").unwrap();

    let mut net = customized();
    let before = net.to_plain().unwrap();
    let err = update_from_file(&mut net, &path, ApplyOptions::strict()).unwrap_err();
    match err.as_conf_error() {
        Some(ConfError::Validation { path, .. }) => assert_eq!(path, "layers.[0].activation"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(net.to_plain().unwrap(), before);
}

#[test]
fn test_lenient_file_update_reports_nested_drops() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("patch.json");
    fs::write(&path, r#"{"layers": [{"units": 8, "bias": true}, {}], "notes": "x"}"#).unwrap();

    let mut net = customized();
    let report = update_from_file(&mut net, &path, ApplyOptions::lenient()).unwrap();
    assert_eq!(report.ignored, vec!["layers.[0].bias", "notes"]);
    assert_eq!(net.layers[0].units.value(), Some(8));
    assert_eq!(net.seed.value(), Some(7));
}
