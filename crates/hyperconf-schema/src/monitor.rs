//! Field monitors.
//!
//! A monitor table binds field names to named reactions. Each time a field is
//! assigned on a live instance its reactions run, in registration order.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::{ConfError, ConfResult};

/// Error type returned by reactions.
pub type ReactionError = Box<dyn std::error::Error + Send + Sync>;

/// A reaction invoked with the instance whose field was assigned.
pub type ReactionFn<T> = Arc<dyn Fn(&mut T) -> Result<(), ReactionError> + Send + Sync>;

/// Field name to named reactions.
pub struct MonitorTable<T> {
    bindings: IndexMap<String, IndexMap<String, ReactionFn<T>>>,
}

impl<T> MonitorTable<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            bindings: IndexMap::new(),
        }
    }

    /// Binds `reaction` under `name` to `field`.
    ///
    /// A name already bound to the field keeps its first reaction; returns
    /// `false` in that case.
    pub fn bind(
        &mut self,
        field: impl Into<String>,
        name: impl Into<String>,
        reaction: ReactionFn<T>,
    ) -> bool {
        let reactions = self.bindings.entry(field.into()).or_default();
        let name = name.into();
        if reactions.contains_key(&name) {
            return false;
        }
        reactions.insert(name, reaction);
        true
    }

    /// Names of the reactions bound to `field`, in registration order.
    pub fn reactions_for<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.bindings
            .get(field)
            .into_iter()
            .flat_map(|reactions| reactions.keys().map(String::as_str))
    }

    /// Fields with at least one reaction.
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.bindings.keys().map(String::as_str)
    }

    /// Whether `field` has any reaction.
    pub fn is_monitored(&self, field: &str) -> bool {
        self.bindings
            .get(field)
            .is_some_and(|reactions| !reactions.is_empty())
    }

    /// Whether the table has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.values().all(IndexMap::is_empty)
    }

    /// Runs every reaction bound to `field` against `target`.
    ///
    /// Stops at the first failing reaction. `path` names the field in errors.
    pub fn dispatch(&self, field: &str, target: &mut T, path: &str) -> ConfResult<()> {
        let Some(reactions) = self.bindings.get(field) else {
            return Ok(());
        };

        for (name, reaction) in reactions {
            trace!(field = %path, reaction = %name, "dispatching reaction");
            reaction(target).map_err(|source| ConfError::reaction(path, name.as_str(), source))?;
        }
        Ok(())
    }

    /// Copies every binding into `other`, skipping names it already binds.
    pub(crate) fn merge_into(&self, other: &mut Self) {
        for (field, reactions) in &self.bindings {
            for (name, reaction) in reactions {
                other.bind(field.as_str(), name.as_str(), Arc::clone(reaction));
            }
        }
    }

    /// Re-targets every reaction at a type embedding `T`.
    pub(crate) fn project<D>(&self, get_mut: fn(&mut D) -> &mut T) -> MonitorTable<D>
    where
        T: 'static,
        D: 'static,
    {
        let mut projected = MonitorTable::new();
        for (field, reactions) in &self.bindings {
            for (name, reaction) in reactions {
                let reaction = Arc::clone(reaction);
                projected.bind(
                    field.as_str(),
                    name.as_str(),
                    Arc::new(move |outer: &mut D| reaction(get_mut(outer))),
                );
            }
        }
        projected
    }
}

impl<T> Default for MonitorTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MonitorTable<T> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
        }
    }
}

impl<T> fmt::Debug for MonitorTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (field, reactions) in &self.bindings {
            map.entry(field, &reactions.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}
