//! Application Context
//!
//! The operations exposed to the UI layer. Each resolves with the settled
//! item or rejects with an error, and records failures in the store's
//! error slot.

use leptos::prelude::*;

use list_sync_core::{
    CacheAccess, CacheEvent, ClientConfig, CommitAction, CreateItemRequest, HubEvent, Item, ItemId,
    ItemPatch, MutationDispatcher, SyncResult,
};

use crate::commands::InvokeItemStore;
use crate::store::{store_set_error, AppStateStoreFields, AppStore, StoreCache};

#[derive(Clone, Copy)]
pub struct AppContext {
    pub store: AppStore,
    config: StoredValue<ClientConfig>,
}

impl AppContext {
    pub fn new(store: AppStore, config: ClientConfig) -> Self {
        Self {
            store,
            config: StoredValue::new(config),
        }
    }

    pub fn config(&self) -> ClientConfig {
        self.config.get_value()
    }

    pub fn set_config(&self, config: ClientConfig) {
        self.config.set_value(config);
    }

    fn dispatcher(&self) -> MutationDispatcher<InvokeItemStore, StoreCache> {
        MutationDispatcher::new(InvokeItemStore, StoreCache(self.store))
    }

    fn settle<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        match &result {
            Ok(_) => store_set_error(&self.store, None),
            Err(e) => store_set_error(&self.store, Some(e.to_string())),
        }
        result
    }

    /// Push from the hub
    pub fn reconcile(&self, event: HubEvent) {
        StoreCache(self.store).apply(CacheEvent::from(event));
    }

    /// Fetch every item and replace the cache
    pub async fn load(self) -> SyncResult<usize> {
        self.store.loading().set(true);
        let result = self.dispatcher().load().await;
        self.store.loading().set(false);
        self.store.load_failed().set(result.is_err());
        self.settle(result)
    }

    pub async fn add(self, name: String) -> SyncResult<Item> {
        let result = self.dispatcher().create(CreateItemRequest::named(name)).await;
        self.settle(result)
    }

    pub async fn toggle_state(self, id: ItemId) -> SyncResult<Item> {
        let result = self.dispatcher().toggle_state(&id).await;
        self.settle(result)
    }

    pub async fn archive(self, id: ItemId) -> SyncResult<Item> {
        let result = self.dispatcher().archive(&id).await;
        self.settle(result)
    }

    pub async fn remove(self, id: ItemId) -> SyncResult<Item> {
        let result = self.dispatcher().remove(&id).await;
        self.settle(result)
    }

    pub async fn update(self, id: ItemId, patch: ItemPatch) -> SyncResult<Item> {
        let result = self.dispatcher().patch(&id, patch).await;
        self.settle(result)
    }

    /// Combobox selection: restore, duplicate or add
    pub async fn commit(self, action: CommitAction) -> SyncResult<Item> {
        let result = self.dispatcher().commit(&action).await;
        self.settle(result)
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
