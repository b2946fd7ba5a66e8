//! Conversion between flat dotted keys and nested plain data.

use std::sync::OnceLock;

use hyperconf_args::value_type_name;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{FlattenError, FlattenResult};

/// Largest sequence index a flat key may address.
///
/// Bounds the null padding a single key can cause.
pub const MAX_SEQUENCE_INDEX: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\[(\d+)\]$").expect("index pattern is valid"))
}

/// Nests flat `prefix.path` entries into a plain-data mapping.
///
/// Path segments are separated by `.`; a segment of the form `[N]` addresses
/// position `N` of a sequence, padding it with nulls as needed, and any other
/// segment addresses a mapping key. Keys outside the prefix are skipped. An
/// empty prefix takes every key. Later entries overwrite earlier ones at the
/// same path.
///
/// ```
/// use hyperconf_flatten::unflatten;
/// use serde_json::json;
///
/// let nested = unflatten(
///     [
///         ("ui.user.name", json!("ada")),
///         ("ui.user.addresses.[1].city", json!("Turin")),
///         ("theme", json!("dark")),
///     ],
///     "ui",
/// )
/// .unwrap();
/// assert_eq!(
///     serde_json::Value::Object(nested),
///     json!({"user": {"name": "ada", "addresses": [null, {"city": "Turin"}]}})
/// );
/// ```
///
/// # Errors
///
/// - [`FlattenError::InvalidKey`] for a key with an empty path or segment,
///   or whose path starts with an index
/// - [`FlattenError::ShapeConflict`] when a segment disagrees with the value
///   already at that path
/// - [`FlattenError::IndexTooLarge`] for an index above [`MAX_SEQUENCE_INDEX`]
pub fn unflatten<I, K>(entries: I, prefix: &str) -> FlattenResult<Map<String, Value>>
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut root = Map::new();
    let mut used = 0usize;
    let mut skipped = 0usize;

    for (key, value) in entries {
        let key = key.as_ref();
        let Some(path) = strip_prefix(key, prefix)? else {
            skipped += 1;
            continue;
        };
        insert(&mut root, key, path, value)?;
        used += 1;
    }

    debug!(prefix, used, skipped, "nested flat entries");
    Ok(root)
}

/// Lists the leaves of `map` as flat `prefix.path` entries.
///
/// The inverse of [`unflatten`]: empty mappings and sequences are kept as
/// leaves so that nesting the output again reproduces `map`.
///
/// ```
/// use hyperconf_flatten::flatten;
/// use serde_json::json;
///
/// let data = json!({"epochs": 10, "layers": [{"units": 8}]});
/// let flat = flatten(data.as_object().unwrap(), "ui");
/// assert_eq!(
///     flat,
///     vec![
///         ("ui.epochs".to_string(), json!(10)),
///         ("ui.layers.[0].units".to_string(), json!(8)),
///     ]
/// );
/// ```
pub fn flatten(map: &Map<String, Value>, prefix: &str) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    for (name, value) in map {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        collect(value, key, &mut out);
    }
    out
}

fn collect(value: &Value, key: String, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (name, item) in map {
                collect(item, format!("{key}.{name}"), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                collect(item, format!("{key}.[{index}]"), out);
            }
        }
        leaf => out.push((key, leaf.clone())),
    }
}

// `Ok(None)` for keys outside the prefix.
fn strip_prefix<'k>(key: &'k str, prefix: &str) -> FlattenResult<Option<&'k str>> {
    if prefix.is_empty() {
        return Ok(Some(key));
    }
    let Some(rest) = key.strip_prefix(prefix) else {
        return Ok(None);
    };
    if rest.is_empty() {
        return Err(FlattenError::invalid_key(key, "missing path after prefix"));
    }
    Ok(rest.strip_prefix('.'))
}

fn parse_segment<'a>(key: &str, segment: &'a str) -> FlattenResult<Segment<'a>> {
    if segment.is_empty() {
        return Err(FlattenError::invalid_key(key, "empty path segment"));
    }
    let Some(captures) = index_pattern().captures(segment) else {
        return Ok(Segment::Key(segment));
    };

    let too_large = || FlattenError::IndexTooLarge {
        key: key.to_string(),
        segment: segment.to_string(),
        limit: MAX_SEQUENCE_INDEX,
    };
    let index: usize = captures[1].parse().map_err(|_| too_large())?;
    if index > MAX_SEQUENCE_INDEX {
        return Err(too_large());
    }
    Ok(Segment::Index(index))
}

fn insert(root: &mut Map<String, Value>, key: &str, path: &str, value: Value) -> FlattenResult<()> {
    let segments = path
        .split('.')
        .map(|segment| parse_segment(key, segment))
        .collect::<FlattenResult<Vec<_>>>()?;

    let Some((Segment::Key(first), rest)) = segments.split_first() else {
        return Err(FlattenError::invalid_key(key, "path must start with a field name"));
    };

    let mut slot = root.entry(*first).or_insert(Value::Null);
    let mut at = (*first).to_string();
    for segment in rest {
        slot = descend(slot, *segment, key, &at)?;
        match segment {
            Segment::Key(name) => {
                at.push('.');
                at.push_str(name);
            }
            Segment::Index(index) => at.push_str(&format!(".[{index}]")),
        }
    }
    *slot = value;
    Ok(())
}

fn descend<'v>(
    slot: &'v mut Value,
    segment: Segment<'_>,
    key: &str,
    at: &str,
) -> FlattenResult<&'v mut Value> {
    match segment {
        Segment::Key(name) => {
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            match slot {
                Value::Object(map) => Ok(map.entry(name).or_insert(Value::Null)),
                other => Err(conflict(key, at, "mapping", other)),
            }
        }
        Segment::Index(index) => {
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            match slot {
                Value::Array(items) => {
                    if items.len() <= index {
                        items.resize(index + 1, Value::Null);
                    }
                    Ok(&mut items[index])
                }
                other => Err(conflict(key, at, "sequence", other)),
            }
        }
    }
}

fn conflict(key: &str, at: &str, expected: &'static str, found: &Value) -> FlattenError {
    FlattenError::ShapeConflict {
        key: key.to_string(),
        path: at.to_string(),
        expected,
        found: value_type_name(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn nest(entries: Vec<(&str, Value)>) -> FlattenResult<Value> {
        unflatten(entries, "ui").map(Value::Object)
    }

    #[test]
    fn test_index_segments() {
        assert_eq!(parse_segment("k", "[3]").unwrap(), Segment::Index(3));
        assert_eq!(parse_segment("k", "[x]").unwrap(), Segment::Key("[x]"));
        assert_eq!(parse_segment("k", "3").unwrap(), Segment::Key("3"));
        assert!(matches!(
            parse_segment("k", "[99999999999999999999999]"),
            Err(FlattenError::IndexTooLarge { .. })
        ));
        assert!(matches!(
            parse_segment("k", "[4097]"),
            Err(FlattenError::IndexTooLarge { limit: 4096, .. })
        ));
    }

    #[test]
    fn test_skips_keys_outside_prefix() {
        let nested = nest(vec![
            ("ui.epochs", json!(5)),
            ("uix.epochs", json!(6)),
            ("other", json!(7)),
        ])
        .unwrap();
        assert_eq!(nested, json!({"epochs": 5}));
    }

    #[test]
    fn test_empty_prefix_takes_everything() {
        let nested = unflatten([("a.b", json!(1)), ("c", json!(2))], "").unwrap();
        assert_eq!(Value::Object(nested), json!({"a": {"b": 1}, "c": 2}));
    }

    #[test]
    fn test_sequences_pad_with_null() {
        let nested = nest(vec![
            ("ui.layers.[2].units", json!(8)),
            ("ui.layers.[0].units", json!(4)),
        ])
        .unwrap();
        assert_eq!(
            nested,
            json!({"layers": [{"units": 4}, null, {"units": 8}]})
        );
    }

    #[test]
    fn test_nested_sequences() {
        let nested = nest(vec![("ui.grid.[1].[1]", json!(true))]).unwrap();
        assert_eq!(nested, json!({"grid": [null, [null, true]]}));
    }

    #[test]
    fn test_shape_conflicts() {
        let err = nest(vec![
            ("ui.model.units", json!(8)),
            ("ui.model.[0]", json!(1)),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            FlattenError::ShapeConflict {
                key: "ui.model.[0]".to_string(),
                path: "model".to_string(),
                expected: "sequence",
                found: "mapping",
            }
        );

        let err = nest(vec![("ui.rate", json!(0.1)), ("ui.rate.max", json!(1))]).unwrap_err();
        assert!(matches!(
            err,
            FlattenError::ShapeConflict { expected: "mapping", found: "number", .. }
        ));
    }

    #[test]
    fn test_conflicts_name_found_values_like_args() {
        let cases = [(json!("x"), "string"), (json!(true), "boolean")];
        for (scalar, name) in cases {
            let err = nest(vec![("ui.a", scalar.clone()), ("ui.a.b", json!(1))]).unwrap_err();
            let FlattenError::ShapeConflict { found, .. } = err else {
                panic!("expected a shape conflict, got {err:?}");
            };
            assert_eq!(found, name);
            assert_eq!(found, value_type_name(&scalar));
        }

        let err = nest(vec![("ui.a.[0]", json!(1)), ("ui.a.b", json!(1))]).unwrap_err();
        assert!(matches!(
            err,
            FlattenError::ShapeConflict { expected: "mapping", found: "sequence", .. }
        ));
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["ui", "ui.", "ui.a..b", "ui.[0]"] {
            let err = nest(vec![(key, json!(1))]).unwrap_err();
            assert!(matches!(err, FlattenError::InvalidKey { .. }), "{key}");
        }
    }

    #[test]
    fn test_later_entry_wins() {
        let nested = nest(vec![("ui.a", json!(1)), ("ui.a", json!(2))]).unwrap();
        assert_eq!(nested, json!({"a": 2}));
    }

    #[test]
    fn test_flatten_keeps_empty_containers() {
        let data = json!({"tags": [], "extra": {}, "none": null});
        let flat = flatten(data.as_object().unwrap(), "");
        assert_eq!(
            flat,
            vec![
                ("tags".to_string(), json!([])),
                ("extra".to_string(), json!({})),
                ("none".to_string(), Value::Null),
            ]
        );
    }

    fn tree() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z ]{0,8}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_flatten_then_unflatten(
            map in prop::collection::btree_map("[a-z]{1,4}", tree(), 0..5)
        ) {
            let map: Map<String, Value> = map.into_iter().collect();
            let flat = flatten(&map, "ui");
            let nested = unflatten(flat, "ui").unwrap();
            prop_assert_eq!(nested, map);
        }
    }
}
