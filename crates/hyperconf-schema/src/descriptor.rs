//! Per-type schema descriptors.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

use crate::accessor::Accessor;
use crate::field::{ApplyContext, ApplyOptions, ApplyReport, FieldShape, FieldValue};
use crate::graph::DependencyGraph;
use crate::monitor::MonitorTable;
use crate::{ConfError, ConfResult};

/// The declared schema of one configuration type.
///
/// Built once per type by the registry and never mutated afterwards. Holds the
/// ordered field table, the dependency graph, the monitor table and the
/// prototype every new instance is cloned from.
pub struct Descriptor<T> {
    type_name: &'static str,
    fields: IndexMap<String, Arc<dyn Accessor<T>>>,
    graph: DependencyGraph,
    monitors: MonitorTable<T>,
    prototype: T,
}

impl<T: Clone + 'static> Descriptor<T> {
    pub(crate) fn new(
        type_name: &'static str,
        fields: IndexMap<String, Arc<dyn Accessor<T>>>,
        graph: DependencyGraph,
        monitors: MonitorTable<T>,
        prototype: T,
    ) -> Self {
        Self {
            type_name,
            fields,
            graph,
            monitors,
            prototype,
        }
    }

    /// Name of the configuration type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    /// Whether `field` is declared.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the type declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Shape of `field` in the prototype.
    pub fn shape_of(&self, field: &str) -> Option<FieldShape> {
        self.fields
            .get(field)
            .map(|accessor| accessor.shape(&self.prototype))
    }

    /// The field dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The monitor table.
    pub fn monitors(&self) -> &MonitorTable<T> {
        &self.monitors
    }

    /// The type-level default values.
    pub fn prototype(&self) -> &T {
        &self.prototype
    }

    /// A fresh copy of the prototype.
    pub fn instantiate(&self) -> T {
        self.prototype.clone()
    }

    /// Borrows `field` of `target` as `F`.
    ///
    /// Returns `None` if the field is undeclared or holds another type.
    pub fn get<'a, F: FieldValue>(&self, target: &'a T, field: &str) -> Option<&'a F> {
        self.fields
            .get(field)
            .and_then(|accessor| accessor.value_any(target).downcast_ref::<F>())
    }

    /// Converts every declared field of `target` to plain data.
    pub fn to_plain(&self, target: &T) -> ConfResult<Map<String, Value>> {
        let mut plain = Map::new();
        for (name, accessor) in &self.fields {
            plain.insert(name.clone(), accessor.to_plain(target)?);
        }
        Ok(plain)
    }

    /// Applies `input` to `target` field by field, in topological order.
    ///
    /// Each consumed field triggers its monitors. Keys that match no field are
    /// rejected under strict options and dropped otherwise. The first failing
    /// field stops the walk; fields applied before it stay applied.
    pub fn apply(
        &self,
        target: &mut T,
        mut input: Map<String, Value>,
        cx: &mut ApplyContext,
    ) -> ConfResult<()> {
        let unexpected: Vec<String> = input
            .keys()
            .filter(|key| !self.fields.contains_key(key.as_str()))
            .cloned()
            .collect();

        for name in self.graph.topological_order() {
            if let Some(value) = input.remove(name) {
                self.assign_with(target, name, value, cx)?;
            }
        }

        if unexpected.is_empty() {
            return Ok(());
        }
        let paths: Vec<String> = unexpected.iter().map(|key| cx.child_path(key)).collect();
        if cx.options().strict {
            return Err(ConfError::UnexpectedFields { fields: paths });
        }
        for path in paths {
            warn!(type_name = self.type_name, field = %path, "ignoring unexpected field");
            cx.ignore(path);
        }
        Ok(())
    }

    /// Builds a new instance from the prototype and `input`.
    pub fn from_plain(
        &self,
        input: Map<String, Value>,
        options: ApplyOptions,
    ) -> ConfResult<(T, ApplyReport)> {
        let mut target = self.instantiate();
        let mut cx = ApplyContext::new(options);
        self.apply(&mut target, input, &mut cx)?;
        Ok((target, cx.into_report()))
    }

    /// Converts `input` into `field` of `target` and runs its monitors.
    pub fn assign(
        &self,
        target: &mut T,
        field: &str,
        input: Value,
        cx: &mut ApplyContext,
    ) -> ConfResult<()> {
        if !self.contains(field) {
            return Err(ConfError::unknown_field(field));
        }
        self.assign_with(target, field, input, cx)
    }

    /// Stores `value` into `field` of `target` and runs its monitors.
    ///
    /// The plain form of `value` must load into the field's default, so
    /// sequences keep their declared lengths and Args their declared
    /// constraints. Anything else could not be read back by `from_plain`.
    pub fn replace<F: FieldValue>(&self, target: &mut T, field: &str, value: F) -> ConfResult<()> {
        let accessor = self
            .fields
            .get(field)
            .ok_or_else(|| ConfError::unknown_field(field))?;
        let mismatch = || ConfError::TypeMismatch {
            field: field.to_owned(),
            expected: accessor.value_type(),
            found: type_name::<F>(),
        };
        let Some(declared) = accessor.value_any(&self.prototype).downcast_ref::<F>() else {
            return Err(mismatch());
        };

        let plain = value.to_plain()?;
        let mut cx = ApplyContext::new(ApplyOptions::strict());
        cx.within(field, |cx| declared.clone().apply_plain(plain, cx))?;

        accessor
            .replace(target, Box::new(value))
            .map_err(|_| mismatch())?;
        self.monitors.dispatch(field, target, field)
    }

    fn assign_with(
        &self,
        target: &mut T,
        field: &str,
        input: Value,
        cx: &mut ApplyContext,
    ) -> ConfResult<()> {
        let Some(accessor) = self.fields.get(field) else {
            return Err(ConfError::unknown_field(field));
        };
        cx.within(field, |cx| accessor.apply_plain(target, input, cx))?;
        self.monitors.dispatch(field, target, &cx.child_path(field))
    }

    pub(crate) fn accessors(&self) -> impl Iterator<Item = (&str, &Arc<dyn Accessor<T>>)> + '_ {
        self.fields
            .iter()
            .map(|(name, accessor)| (name.as_str(), accessor))
    }
}

impl<T: fmt::Debug> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("graph", &self.graph)
            .field("monitors", &self.monitors)
            .field("prototype", &self.prototype)
            .finish()
    }
}
