//! Host Command Wrappers
//!
//! Frontend bindings to the host commands that front the item store, the
//! client configuration and hub negotiation.

mod config;
mod hub;
mod item;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use list_sync_core::{SyncError, SyncResult};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "core"])]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

pub use config::*;
pub use hub::*;
pub use item::*;

/// Serialize `args` (None as null, maps as plain objects), invoke `cmd` and
/// decode the reply. Every failure surfaces as a network error.
pub(crate) async fn call<A, T>(cmd: &str, args: Option<&A>) -> SyncResult<T>
where
    A: Serialize,
    T: DeserializeOwned,
{
    let js_args = match args {
        Some(args) => args
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| SyncError::Network(format!("serialization error: {}", e)))?,
        None => JsValue::NULL,
    };
    let result = invoke(cmd, js_args)
        .await
        .map_err(|e| SyncError::Network(format!("{} failed: {}", cmd, js_error(&e))))?;
    serde_wasm_bindgen::from_value(result)
        .map_err(|e| SyncError::Network(format!("{} response error: {}", cmd, e)))
}

/// Best-effort text for a rejected promise value
fn js_error(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| "unknown error".to_string())
}
