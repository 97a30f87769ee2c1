//! In-memory state store for tests and dry runs: same contract as the JSON
//! store, no disk I/O, deterministic.

use std::sync::Mutex;

use super::{PersistedState, PersistenceError, ProgressStore};

/// In-memory implementation of [`ProgressStore`].
#[derive(Default)]
pub struct MemoryStateStore {
    inner: Mutex<Option<PersistedState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with prior state already present, as if a previous run had saved.
    pub fn seeded(state: PersistedState) -> Self {
        Self {
            inner: Mutex::new(Some(state)),
        }
    }

    /// Inspect the most recently saved state without going through `load`.
    pub fn saved(&self) -> Option<PersistedState> {
        self.inner.lock().expect("state lock").clone()
    }
}

impl ProgressStore for MemoryStateStore {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        Ok(self.inner.lock().expect("state lock").clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        *self.inner.lock().expect("state lock") = Some(state.clone());
        Ok(())
    }
}
