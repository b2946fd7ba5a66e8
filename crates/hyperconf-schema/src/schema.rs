//! Configuration type declaration.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::accessor::{Accessor, Direct, Projected};
use crate::descriptor::Descriptor;
use crate::field::FieldValue;
use crate::graph::DependencyGraph;
use crate::monitor::{MonitorTable, ReactionError, ReactionFn};
use crate::{registry, ConfError, ConfResult};

/// A struct usable as a configuration type.
///
/// `defaults` produces the type-level default values and `declare` lists the
/// fields, dependencies and monitors. Both run once, when the type's
/// descriptor is first requested.
///
/// # Example
///
/// ```
/// use hyperconf_schema::{fields, Conf, ConfResult, Configurable, SchemaBuilder};
/// use hyperconf_args::{FloatArg, IntArg};
///
/// #[derive(Debug, Clone)]
/// struct Train {
///     epochs: IntArg,
///     rate: FloatArg,
/// }
///
/// impl Configurable for Train {
///     fn defaults() -> ConfResult<Self> {
///         Ok(Self {
///             epochs: IntArg::builder(10).range(1, 100).build()?,
///             rate: FloatArg::builder(0.01).range(0.0, 1.0).build()?,
///         })
///     }
///
///     fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
///         fields!(schema, epochs, rate);
///         schema.add_dependency("epochs", "rate")?;
///         Ok(())
///     }
/// }
///
/// let mut train = Conf::<Train>::new().unwrap();
/// train.set("epochs", 50).unwrap();
/// assert_eq!(train.to_plain().unwrap()["epochs"], 50);
/// ```
pub trait Configurable: Clone + fmt::Debug + Send + Sync + Sized + 'static {
    /// Builds the type-level default values.
    fn defaults() -> ConfResult<Self>;

    /// Declares fields, dependencies and monitors.
    fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()>;
}

/// Declares struct members as fields under their own names.
///
/// Expands to one [`SchemaBuilder::field`] call per member, each followed by
/// `?`, so it must be used inside `declare`.
#[macro_export]
macro_rules! fields {
    ($schema:expr, $($field:ident),+ $(,)?) => {
        $(
            $schema.field(stringify!($field), |c| &c.$field, |c| &mut c.$field)?;
        )+
    };
}

/// Collects the declaration of one configuration type.
pub struct SchemaBuilder<T> {
    type_name: &'static str,
    fields: IndexMap<String, Arc<dyn Accessor<T>>>,
    graph: DependencyGraph,
    monitors: MonitorTable<T>,
}

impl<T: Configurable> SchemaBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            type_name: short_type_name::<T>(),
            fields: IndexMap::new(),
            graph: DependencyGraph::new(),
            monitors: MonitorTable::new(),
        }
    }

    /// Name of the type being declared.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declares a field reached through `get` and `get_mut`.
    ///
    /// # Errors
    ///
    /// [`ConfError::Schema`] if the name is empty, starts with `_`, contains
    /// `.`, `[` or `]`, is already declared, or if the field's nested
    /// configuration type fails to declare.
    pub fn field<F: FieldValue>(
        &mut self,
        name: &str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> ConfResult<&mut Self> {
        self.check_name(name)?;
        F::check_schema()
            .map_err(|err| ConfError::schema(self.type_name, format!("field `{name}`: {err}")))?;
        self.insert(name, Arc::new(Direct { get, get_mut }))
    }

    /// Copies every field, dependency and monitor of the base type `B`,
    /// embedded in `T` and reached through `get` and `get_mut`.
    ///
    /// The copy is independent: nothing declared on `T` afterwards affects `B`.
    pub fn inherit<B: Configurable>(
        &mut self,
        get: fn(&T) -> &B,
        get_mut: fn(&mut T) -> &mut B,
    ) -> ConfResult<&mut Self> {
        let base = registry::descriptor::<B>().map_err(|err| {
            ConfError::schema(
                self.type_name,
                format!("base {}: {err}", short_type_name::<B>()),
            )
        })?;

        if let Some(name) = base.field_names().find(|name| self.fields.contains_key(*name)) {
            return Err(ConfError::schema(
                self.type_name,
                format!(
                    "field `{name}` of base {} is already declared",
                    base.type_name()
                ),
            ));
        }

        for (name, inner) in base.accessors() {
            let projected: Arc<dyn Accessor<T>> = Arc::new(Projected {
                inner: Arc::clone(inner),
                get,
                get_mut,
            });
            self.insert(name, projected)?;
        }
        self.graph.merge(base.graph())?;
        base.monitors().project(get_mut).merge_into(&mut self.monitors);

        debug!(
            type_name = self.type_name,
            base = base.type_name(),
            "inherited base schema"
        );
        Ok(self)
    }

    /// Declares that `parent` must be applied before `child`.
    ///
    /// # Errors
    ///
    /// [`ConfError::UnknownField`], [`ConfError::Cycle`] or
    /// [`ConfError::DuplicateEdge`]; the graph is unchanged on error.
    pub fn add_dependency(&mut self, parent: &str, child: &str) -> ConfResult<&mut Self> {
        self.graph.add_dependency(parent, child)?;
        Ok(self)
    }

    /// Binds `reaction`, named `name`, to every field in `fields`.
    ///
    /// The reaction runs each time one of those fields is assigned on a live
    /// instance. Binding a field that is never declared is allowed; the
    /// reaction then never runs.
    pub fn monitor<I, S, R>(&mut self, fields: I, name: &str, reaction: R) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: Fn(&mut T) -> Result<(), ReactionError> + Send + Sync + 'static,
    {
        let reaction: ReactionFn<T> = Arc::new(reaction);
        for field in fields {
            self.monitors.bind(field, name, Arc::clone(&reaction));
        }
        self
    }

    /// The dependency graph declared so far.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Field names declared so far, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    pub(crate) fn finish(self, prototype: T) -> Descriptor<T> {
        for field in self.monitors.fields() {
            if !self.fields.contains_key(field) {
                debug!(
                    type_name = self.type_name,
                    field, "monitor bound to an undeclared field will never run"
                );
            }
        }
        Descriptor::new(
            self.type_name,
            self.fields,
            self.graph,
            self.monitors,
            prototype,
        )
    }

    fn check_name(&self, name: &str) -> ConfResult<()> {
        let reason = if name.is_empty() {
            "field names cannot be empty".to_string()
        } else if name.starts_with('_') {
            format!("field `{name}` cannot start with `_`")
        } else if name.contains(['.', '[', ']']) {
            format!("field `{name}` cannot contain `.`, `[` or `]`")
        } else {
            return Ok(());
        };
        Err(ConfError::schema(self.type_name, reason))
    }

    fn insert(&mut self, name: &str, accessor: Arc<dyn Accessor<T>>) -> ConfResult<&mut Self> {
        if self.fields.contains_key(name) {
            return Err(ConfError::schema(
                self.type_name,
                format!("field `{name}` is declared twice"),
            ));
        }
        self.graph.add_node(name);
        self.fields.insert(name.to_owned(), accessor);
        Ok(self)
    }
}

impl<T> fmt::Debug for SchemaBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("graph", &self.graph)
            .field("monitors", &self.monitors)
            .finish()
    }
}

/// Type name without module path or generic arguments.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
