//! Pick a storage backend from configuration.
//!
//! Priority for `Auto`: localStorage → Memory (fallback)

use std::rc::Rc;

use elearn_core::ports::StoragePort;
use elearn_types::config::{StorageBackendType, StorageConfig};
use elearn_types::Result;

use super::{LocalStorage, MemoryStorage};

/// Returns a trait object so callers are backend-agnostic.
///
/// Only `Auto` degrades to memory. An explicit `LocalStorage` that cannot be
/// opened is an error: a memory store would lose the session on reload.
pub fn auto_detect_storage(config: &StorageConfig) -> Result<Rc<dyn StoragePort>> {
    match config.backend {
        StorageBackendType::Memory => {
            log::info!("Storage backend: memory (configured)");
            Ok(Rc::new(MemoryStorage::new()))
        }
        StorageBackendType::LocalStorage => {
            let local = LocalStorage::open().map_err(|e| {
                log::error!("localStorage configured but unavailable: {}", e);
                e
            })?;
            log::info!("Storage backend: localStorage (configured)");
            Ok(Rc::new(local))
        }
        StorageBackendType::Auto => match LocalStorage::open() {
            Ok(local) => {
                log::info!("Storage backend: localStorage");
                Ok(Rc::new(local))
            }
            Err(e) => {
                log::warn!("localStorage unavailable ({}), falling back to memory", e);
                Ok(Rc::new(MemoryStorage::new()))
            }
        },
    }
}
