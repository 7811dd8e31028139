//! Application state
//!
//! Arc-wrapped state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

#[derive(Debug)]
struct InnerState {
    config: Config,
    storage: Mutex<Storage>,
}

impl AppState {
    /// Create state around an open store.
    #[must_use]
    pub fn new(config: Config, storage: Storage) -> Self {
        Self {
            inner: Arc::new(InnerState {
                config,
                storage: Mutex::new(storage),
            }),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Lock the store. Never hold the guard across an `.await`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a previous holder panicked.
    pub fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.inner
            .storage
            .lock()
            .map_err(|_| Error::internal("storage mutex poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_shared_between_clones() {
        let state = AppState::new(Config::default(), Storage::open_in_memory().unwrap());
        let clone = state.clone();
        assert!(state.storage().unwrap().is_empty().unwrap());
        drop(clone.storage().unwrap());
        assert_eq!(clone.config().site.per_page, 12);
    }
}
