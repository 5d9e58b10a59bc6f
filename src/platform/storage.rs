//! LocalStorage JSON helpers
//!
//! On the web, values are stored as JSON strings under a fixed key. Native
//! builds have no persistent storage: loads miss and saves are dropped.

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Read and decode the value stored under `key`
#[cfg(target_arch = "wasm32")]
pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok()??;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", key, e);
            None
        }
    }
}

/// Encode and store `value` under `key`. Returns whether it was written.
#[cfg(target_arch = "wasm32")]
pub fn save_json<T: Serialize>(key: &str, value: &T) -> bool {
    let Some(storage) = local_storage() else {
        return false;
    };
    match serde_json::to_string(value) {
        Ok(json) => storage.set_item(key, &json).is_ok(),
        Err(e) => {
            log::warn!("Could not encode {}: {}", key, e);
            false
        }
    }
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn load_json<T: DeserializeOwned>(_key: &str) -> Option<T> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_json<T: Serialize>(_key: &str, _value: &T) -> bool {
    false
}
