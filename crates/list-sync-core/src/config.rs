//! Client Configuration
//!
//! Tunables provided by the host. Every field has a default so a partial
//! (or missing) document still yields a usable config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::item::DEFAULT_CATEGORIES;

/// Reconnect schedule; the last entry repeats forever
pub const DEFAULT_RECONNECT_DELAYS_MS: &[u64] = &[2_000, 5_000, 10_000, 30_000, 60_000];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the real-time hub (negotiation happens below it)
    pub hub_url: String,
    /// Quiet period after the last keystroke before a search is issued
    pub search_debounce_ms: u64,
    /// Minimum trimmed query length that opens the dropdown and searches
    pub min_query_len: usize,
    pub reconnect_delays_ms: Vec<u64>,
    pub dropdown_min_height: f64,
    pub dropdown_max_height: f64,
    /// Space kept free between the dropdown and the viewport bottom
    pub dropdown_margin: f64,
    /// Fixed display order of categories
    pub categories: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hub_url: "/hubs/items".to_string(),
            search_debounce_ms: 300,
            min_query_len: 2,
            reconnect_delays_ms: DEFAULT_RECONNECT_DELAYS_MS.to_vec(),
            dropdown_min_height: 150.0,
            dropdown_max_height: 400.0,
            dropdown_margin: 16.0,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ClientConfig {
    /// Replace values that would break the engine with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.reconnect_delays_ms.is_empty() {
            self.reconnect_delays_ms = defaults.reconnect_delays_ms;
        }
        if self.categories.is_empty() {
            self.categories = defaults.categories;
        }
        if self.min_query_len == 0 {
            self.min_query_len = 1;
        }
        if self.dropdown_min_height > self.dropdown_max_height {
            self.dropdown_min_height = defaults.dropdown_min_height;
            self.dropdown_max_height = defaults.dropdown_max_height;
        }
        self
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn reconnect_delays(&self) -> Vec<Duration> {
        self.reconnect_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"hubUrl": "https://lists.example.com/hub"}"#).unwrap();
        let config = config.sanitized();
        assert_eq!(config.hub_url, "https://lists.example.com/hub");
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.min_query_len, 2);
        assert_eq!(config.categories.last().map(String::as_str), Some("Other"));
    }

    #[test]
    fn test_empty_schedule_is_replaced() {
        let config: ClientConfig = serde_json::from_str(r#"{"reconnectDelaysMs": []}"#).unwrap();
        let config = config.sanitized();
        assert_eq!(config.reconnect_delays_ms, DEFAULT_RECONNECT_DELAYS_MS);
    }
}
