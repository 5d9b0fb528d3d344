//! Shared List Frontend Entry Point

mod app;
mod commands;
mod components;
mod context;
mod hub;
mod models;
mod store;

use app::App;
use leptos::prelude::*;
use rolling_logger::LogBuffer;
use tracing::Level;

/// Recent log lines kept in memory
const LOG_CAPACITY: usize = 500;

fn console_sink(level: Level, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&line),
        Level::WARN => web_sys::console::warn_1(&line),
        Level::INFO => web_sys::console::info_1(&line),
        _ => web_sys::console::debug_1(&line),
    }
}

fn main() {
    console_error_panic_hook::set_once();
    let logs = match rolling_logger::init(LOG_CAPACITY, Level::DEBUG, console_sink) {
        Ok(logs) => logs,
        Err(e) => {
            web_sys::console::warn_1(&format!("logger already installed: {}", e).into());
            LogBuffer::new(LOG_CAPACITY)
        }
    };
    mount_to_body(move || view! { <App logs=logs.clone() /> });
}
