use std::sync::{Mutex, OnceLock};

use crate::Result;

/// A lazily initialised value with compute-or-wait semantics.
///
/// The first caller runs the initialiser while concurrent callers block until the value is available.
/// Once populated, reads are lock free. A failing initialiser leaves the slot empty and the error is
/// returned to the caller that ran it, a later call will retry the computation.
#[derive(Debug)]
pub struct OnceSlot<V> {
    value: OnceLock<V>,
    init: Mutex<()>,
}

impl<V> Default for OnceSlot<V> {
    fn default() -> Self {
        OnceSlot {
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }
}

impl<V> OnceSlot<V> {
    /// A slot that is already populated.
    pub fn with_value(value: V) -> Self {
        OnceSlot {
            value: OnceLock::from(value),
            init: Mutex::new(()),
        }
    }
}

impl<V: Clone> OnceSlot<V> {
    pub fn get(&self) -> Option<V> {
        self.value.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    pub fn get_or_try_init(&self, init: impl FnOnce() -> Result<V>) -> Result<V> {
        if let Some(val) = self.value.get() {
            return Ok(val.clone());
        }

        let _guard = self.init.lock()?;
        // Another thread could have finished the computation while we were waiting for the lock
        if let Some(val) = self.value.get() {
            return Ok(val.clone());
        }

        let val = init()?;
        let _ = self.value.set(val.clone());
        Ok(val)
    }
}
