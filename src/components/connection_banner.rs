//! Connection Banner Component
//!
//! Shows the hub state whenever the list is not live.

use leptos::prelude::*;

use crate::models::ConnectionState;
use crate::store::{use_app_store, AppStateStoreFields};

fn banner_text(state: ConnectionState, failures: usize) -> Option<String> {
    match state {
        ConnectionState::Connected => None,
        ConnectionState::Connecting => Some("Connecting...".to_string()),
        ConnectionState::Reconnecting if failures > 1 => Some(format!(
            "Connection lost. Reconnecting (attempt {})...",
            failures
        )),
        ConnectionState::Reconnecting => Some("Connection lost. Reconnecting...".to_string()),
        ConnectionState::Disconnected => {
            Some("Offline. Changes from other devices will not appear.".to_string())
        }
    }
}

#[component]
pub fn ConnectionBanner() -> impl IntoView {
    let store = use_app_store();

    move || {
        let state = store.connection().get();
        banner_text(state, store.connection_failures().get()).map(|text| {
            let detail = store.connection_error().get();
            view! {
                <div class=format!("connection-banner {}", state.as_str()) role="status">
                    <span>{text}</span>
                    {detail.map(|d| view! { <span class="connection-detail">{d}</span> })}
                </div>
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_hidden_only_when_connected() {
        assert_eq!(banner_text(ConnectionState::Connected, 0), None);
        assert!(banner_text(ConnectionState::Reconnecting, 1).is_some());
        assert!(banner_text(ConnectionState::Disconnected, 0).is_some());
    }

    #[test]
    fn test_banner_counts_repeated_failures() {
        assert_eq!(
            banner_text(ConnectionState::Reconnecting, 3).as_deref(),
            Some("Connection lost. Reconnecting (attempt 3)...")
        );
        assert_eq!(
            banner_text(ConnectionState::Reconnecting, 1).as_deref(),
            Some("Connection lost. Reconnecting...")
        );
    }
}
