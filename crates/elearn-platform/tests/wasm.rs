//! WASM-target tests for elearn-platform (Node.js runtime).
//!
//! Tests MemoryStorage, storage selection and the token store on top of it
//! under wasm32-unknown-unknown via `wasm-pack test --node`.
//!
//! fetch and WebSocket need a browser and are not covered here.

use wasm_bindgen_test::*;

use elearn_core::ports::StoragePort;
use elearn_core::session::TokenStore;
use elearn_platform::storage::{auto_detect_storage, MemoryStorage};
use elearn_types::config::{StorageBackendType, StorageConfig};
use elearn_types::ClientError;
use elearn_types::session::{Session, UserRole, ACCESS_TOKEN_KEY};
use std::rc::Rc;

// ─── MemoryStorage Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn memory_storage_backend_name() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
fn memory_storage_get_missing() {
    let storage = MemoryStorage::new();
    assert!(storage.get("nonexistent").unwrap().is_none());
}

#[wasm_bindgen_test]
fn memory_storage_set_and_get() {
    let storage = MemoryStorage::new();
    storage.set("access_token", "abc").unwrap();
    assert_eq!(storage.get("access_token").unwrap().as_deref(), Some("abc"));
}

#[wasm_bindgen_test]
fn memory_storage_overwrite() {
    let storage = MemoryStorage::new();
    storage.set("k", "v1").unwrap();
    storage.set("k", "v2").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
}

#[wasm_bindgen_test]
fn memory_storage_remove() {
    let storage = MemoryStorage::new();
    storage.set("k", "v").unwrap();
    storage.remove("k").unwrap();
    assert!(storage.get("k").unwrap().is_none());
    // removing again is fine
    storage.remove("k").unwrap();
}

// ─── auto_detect_storage Tests ───────────────────────────

#[wasm_bindgen_test]
fn configured_memory_backend() {
    let config = StorageConfig {
        backend: StorageBackendType::Memory,
    };
    let storage = auto_detect_storage(&config).unwrap();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
fn auto_backend_is_usable() {
    let storage = auto_detect_storage(&StorageConfig::default()).unwrap();
    storage.set("check", "1").unwrap();
    assert_eq!(storage.get("check").unwrap().as_deref(), Some("1"));
    storage.remove("check").unwrap();
}

#[wasm_bindgen_test]
fn configured_local_storage_never_degrades_to_memory() {
    let config = StorageConfig {
        backend: StorageBackendType::LocalStorage,
    };
    // Node has no `window`; a browser runner has a real localStorage.
    match auto_detect_storage(&config) {
        Ok(storage) => assert_eq!(storage.backend_name(), "localStorage"),
        Err(e) => assert!(matches!(e, ClientError::Storage(_))),
    }
}

// ─── TokenStore over MemoryStorage ───────────────────────

#[wasm_bindgen_test]
fn token_store_clear_removes_everything() {
    let storage = Rc::new(MemoryStorage::new());
    let tokens = TokenStore::new(storage.clone());
    tokens
        .save(&Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            user_id: Some(1),
            role: Some(UserRole::Teacher),
        })
        .unwrap();
    assert_eq!(tokens.role(), Some(UserRole::Teacher));

    tokens.clear();
    assert!(tokens.session().is_none());
    assert!(tokens.user_id().is_none());
    assert!(storage.get(ACCESS_TOKEN_KEY).unwrap().is_none());
}
