//! Process-wide descriptor registry.
//!
//! Descriptors are keyed by `TypeId` and built on first request. A build that
//! fails is not cached, so the next request tries again.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::descriptor::Descriptor;
use crate::schema::{short_type_name, SchemaBuilder};
use crate::{ConfError, ConfResult, Configurable};

type Entry = Arc<dyn Any + Send + Sync>;

fn registry() -> &'static RwLock<HashMap<TypeId, Entry>> {
    static REGISTRY: OnceLock<RwLock<HashMap<TypeId, Entry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

thread_local! {
    static BUILDING: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

// Marks a type as being built on this thread until dropped.
struct BuildGuard(TypeId);

impl BuildGuard {
    fn enter<T: Configurable>() -> ConfResult<Self> {
        let id = TypeId::of::<T>();
        BUILDING.with(|building| {
            let mut building = building.borrow_mut();
            if building.contains(&id) {
                return Err(ConfError::schema(
                    short_type_name::<T>(),
                    "descriptor requested while the type is being declared",
                ));
            }
            building.push(id);
            Ok(Self(id))
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|building| building.borrow_mut().retain(|id| *id != self.0));
    }
}

/// Returns the descriptor of `T`, declaring the type on first use.
///
/// # Errors
///
/// Any error raised by `T::defaults` or `T::declare`, or
/// [`ConfError::Schema`] if `T`'s declaration requests its own descriptor.
pub fn descriptor<T: Configurable>() -> ConfResult<Arc<Descriptor<T>>> {
    if let Some(found) = lookup::<T>() {
        return Ok(found);
    }

    let guard = BuildGuard::enter::<T>()?;
    let built = build::<T>()?;
    drop(guard);

    let entry = {
        let mut registry = registry().write();
        Arc::clone(
            registry
                .entry(TypeId::of::<T>())
                .or_insert_with(|| Arc::new(built) as Entry),
        )
    };
    entry.downcast::<Descriptor<T>>().map_err(|_| {
        ConfError::schema(short_type_name::<T>(), "registry holds a foreign descriptor")
    })
}

/// Declares `T` now instead of on first use.
pub fn register<T: Configurable>() -> ConfResult<Arc<Descriptor<T>>> {
    descriptor::<T>()
}

/// Whether `T` has been declared successfully.
pub fn is_registered<T: Configurable>() -> bool {
    registry().read().contains_key(&TypeId::of::<T>())
}

pub(crate) fn is_building<T: Configurable>() -> bool {
    let id = TypeId::of::<T>();
    BUILDING.with(|building| building.borrow().contains(&id))
}

fn lookup<T: Configurable>() -> Option<Arc<Descriptor<T>>> {
    let entry = registry().read().get(&TypeId::of::<T>()).cloned()?;
    entry.downcast::<Descriptor<T>>().ok()
}

fn build<T: Configurable>() -> ConfResult<Descriptor<T>> {
    let mut schema = SchemaBuilder::<T>::new();
    T::declare(&mut schema)?;
    let prototype = T::defaults()?;
    let descriptor = schema.finish(prototype);

    debug!(
        type_name = descriptor.type_name(),
        fields = descriptor.len(),
        edges = descriptor.graph().edges().count(),
        "registered configuration type"
    );
    Ok(descriptor)
}
