//! Memoizing instance cache.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::lock;

type Instance = Arc<dyn Any + Send + Sync>;
type Slot = Arc<Mutex<Option<Instance>>>;

/// Lazily built, shared service instances keyed by name and type.
///
/// Each `(name, T)` pair is constructed at most once between calls to
/// [`destroy`](Self::destroy). The map lock is only held to find a slot;
/// construction runs under the slot's own lock, so distinct names can be built
/// concurrently while callers of the same name wait for the first one.
///
/// A factory must not ask for its own `(name, T)` again; that deadlocks.
#[derive(Default)]
pub struct Instances {
    slots: Mutex<HashMap<(String, TypeId), Slot>>,
}

impl Instances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached `T` under `name`, building it with `factory` first if needed.
    pub fn get_or_create<T, F>(&self, name: &str, factory: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        match self.try_get_or_create(name, || Ok::<T, Infallible>(factory())) {
            Ok(instance) => instance,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_create`](Self::get_or_create) for fallible factories.
    ///
    /// A factory error is returned unchanged, nothing is cached and the slot is
    /// dropped, so the next call runs a factory again.
    pub fn try_get_or_create<T, E, F>(&self, name: &str, factory: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, E>,
    {
        let key = (name.to_string(), TypeId::of::<T>());

        loop {
            let slot = self.slot(&key);
            let mut cached = lock(&slot);

            if let Some(instance) = cached.as_ref() {
                if let Ok(instance) = Arc::clone(instance).downcast::<T>() {
                    return Ok(instance);
                }
            }

            // The slot was dropped by a failed build or a destroy while we waited.
            if !self.is_current(&key, &slot) {
                continue;
            }

            return match factory() {
                Ok(value) => {
                    let instance = Arc::new(value);
                    *cached = Some(Arc::clone(&instance) as Instance);
                    tracing::debug!(
                        name,
                        type_name = std::any::type_name::<T>(),
                        "instance created"
                    );
                    Ok(instance)
                }
                Err(e) => {
                    let mut slots = lock(&self.slots);
                    if slots.get(&key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                        slots.remove(&key);
                    }
                    tracing::debug!(
                        name,
                        type_name = std::any::type_name::<T>(),
                        "instance factory failed"
                    );
                    Err(e)
                }
            };
        }
    }

    /// Returns the cached `T` under `name` without building it.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let slot = lock(&self.slots)
            .get(&(name.to_string(), TypeId::of::<T>()))
            .cloned()?;
        let cached = lock(&slot).clone()?;
        cached.downcast::<T>().ok()
    }

    pub fn contains<T: Any + Send + Sync>(&self, name: &str) -> bool {
        self.get::<T>(name).is_some()
    }

    /// Number of built instances.
    pub fn len(&self) -> usize {
        let slots = lock(&self.slots).values().cloned().collect::<Vec<_>>();
        slots.iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases every cached instance. Calling it on an empty cache does nothing.
    ///
    /// Instances are dropped after the map lock is released, in no particular order.
    pub fn destroy(&self) {
        let drained = std::mem::take(&mut *lock(&self.slots));
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "destroying cached instances");
        }
        drop(drained);
    }

    fn slot(&self, key: &(String, TypeId)) -> Slot {
        Arc::clone(lock(&self.slots).entry(key.clone()).or_default())
    }

    fn is_current(&self, key: &(String, TypeId), slot: &Slot) -> bool {
        lock(&self.slots)
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }
}

impl fmt::Debug for Instances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = lock(&self.slots);
        f.debug_set()
            .entries(slots.keys().map(|(name, _)| name))
            .finish()
    }
}
