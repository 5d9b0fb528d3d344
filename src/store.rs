//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The cache field
//! holds the reconciler; [`StoreCache`] is the only path that writes it.
//! Every write tolerates a disposed store, since async work can settle
//! after the app has been unmounted.

use leptos::prelude::*;
use reactive_stores::Store;

use list_sync_core::{CacheAccess, CacheEvent, ConnectionState, Item, ItemId, Reconciler};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Item cache behind its reconciler
    pub cache: Reconciler,
    /// True while the full listing is being fetched
    pub loading: bool,
    /// Set when the last full listing failed; cleared by the next success
    pub load_failed: bool,
    /// Last failed operation, cleared by the next success
    pub error: Option<String>,
    /// Hub connection state
    pub connection: ConnectionState,
    pub connection_error: Option<String>,
    /// Failed attempts since the hub was last connected
    pub connection_failures: usize,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

/// Reconciler access for the mutation dispatcher and hub handler
#[derive(Clone, Copy)]
pub struct StoreCache(pub AppStore);

impl CacheAccess for StoreCache {
    fn get(&self, id: &ItemId) -> Option<Item> {
        self.0
            .cache()
            .try_read_untracked()
            .and_then(|cache| cache.get(id).cloned())
    }

    fn apply(&self, event: CacheEvent) {
        match self.0.cache().try_write() {
            Some(mut cache) => {
                cache.apply(event);
            }
            None => tracing::debug!("store disposed, cache event dropped"),
        }
    }

    fn contains(&self, id: &ItemId) -> bool {
        self.0
            .cache()
            .try_read_untracked()
            .is_some_and(|cache| cache.contains(id))
    }
}

// ========================
// Store Helper Functions
// ========================

/// Record (or clear) the error slot
pub fn store_set_error(store: &AppStore, error: Option<String>) {
    let current = store.error().try_get_untracked();
    if current.is_some_and(|current| current != error) {
        store.error().set(error);
    }
}

pub fn store_set_connection(store: &AppStore, state: ConnectionState, error: Option<String>, failures: usize) {
    store.connection().set(state);
    store.connection_error().set(error);
    store.connection_failures().set(failures);
}

#[cfg(test)]
mod tests {
    use super::*;
    use list_sync_core::ItemState;

    fn milk() -> Item {
        serde_json::from_str(
            r#"{"id":"m1","name":"Milk","category":"Dairy","state":"active","createdAt":"2024-05-01T08:00:00Z","updatedAt":"2024-05-01T08:00:00Z"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_cache_access_after_disposal_is_a_noop() {
        let owner = Owner::new();
        owner.set();
        let store = AppStore::new(AppState::default());
        let cache = StoreCache(store);
        let id = ItemId::new("m1");

        cache.apply(CacheEvent::Created(milk()));
        assert_eq!(cache.get(&id).map(|item| item.state), Some(ItemState::Active));

        owner.cleanup();
        cache.apply(CacheEvent::Deleted(id.clone()));
        store_set_error(&store, Some("late failure".into()));
        assert!(!cache.contains(&id));
        assert_eq!(cache.get(&id), None);
    }
}
