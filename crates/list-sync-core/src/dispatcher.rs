//! Mutation Dispatcher
//!
//! Issues create/update/delete calls to the item store and folds the
//! settled results into the cache through the reconciler. Nothing is written
//! before the remote call resolves; a failed call leaves the cache as it was.

use std::cell::RefCell;

use tracing::{debug, warn};

use crate::cache::{CacheEvent, Reconciler};
use crate::combobox::CommitAction;
use crate::error::{SyncError, SyncResult};
use crate::item::{Item, ItemId, ItemState};
use crate::store::{CreateItemRequest, ItemPatch, ItemStore};

/// Read access to the cache plus the reconciler's apply entry point
pub trait CacheAccess {
    fn get(&self, id: &ItemId) -> Option<Item>;

    fn apply(&self, event: CacheEvent);

    fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }
}

impl CacheAccess for RefCell<Reconciler> {
    fn get(&self, id: &ItemId) -> Option<Item> {
        self.borrow().get(id).cloned()
    }

    fn apply(&self, event: CacheEvent) {
        self.borrow_mut().apply(event);
    }

    fn contains(&self, id: &ItemId) -> bool {
        self.borrow().contains(id)
    }
}

impl<C: CacheAccess + ?Sized> CacheAccess for &C {
    fn get(&self, id: &ItemId) -> Option<Item> {
        (**self).get(id)
    }

    fn apply(&self, event: CacheEvent) {
        (**self).apply(event)
    }

    fn contains(&self, id: &ItemId) -> bool {
        (**self).contains(id)
    }
}

pub struct MutationDispatcher<S, C> {
    store: S,
    cache: C,
}

impl<S: ItemStore, C: CacheAccess> MutationDispatcher<S, C> {
    pub fn new(store: S, cache: C) -> Self {
        Self { store, cache }
    }

    /// Fetch the full listing and replace the cache with it
    pub async fn load(&self) -> SyncResult<usize> {
        let items = self.store.list().await?;
        let count = items.len();
        self.cache.apply(CacheEvent::Reset(items));
        debug!(count, "item listing loaded");
        Ok(count)
    }

    pub async fn create(&self, request: CreateItemRequest) -> SyncResult<Item> {
        let request = request.validated()?;
        let item = self
            .store
            .create(&request)
            .await
            .inspect_err(|e| warn!(name = %request.name, error = %e, "create failed"))?;
        Ok(self.settle(item))
    }

    /// Used for toggle, archive and restore
    pub async fn set_state(&self, id: &ItemId, state: ItemState) -> SyncResult<Item> {
        self.ensure_cached(id)?;
        let item = self.store.update(id, &ItemPatch::state(state)).await?;
        Ok(self.settle(item))
    }

    /// Flip active/checked based on the cached state
    pub async fn toggle_state(&self, id: &ItemId) -> SyncResult<Item> {
        let current = self
            .cache
            .get(id)
            .ok_or_else(|| SyncError::StaleReference(id.clone()))?;
        self.set_state(id, current.state.toggled()).await
    }

    pub async fn archive(&self, id: &ItemId) -> SyncResult<Item> {
        self.set_state(id, ItemState::Archived).await
    }

    pub async fn restore(&self, id: &ItemId) -> SyncResult<Item> {
        self.set_state(id, ItemState::Active).await
    }

    /// Partial update of name, notes or category
    pub async fn patch(&self, id: &ItemId, patch: ItemPatch) -> SyncResult<Item> {
        let patch = patch.validated()?;
        self.ensure_cached(id)?;
        let item = self.store.update(id, &patch).await?;
        Ok(self.settle(item))
    }

    /// Delete remotely, then drop the entry. Resolves with the item as it
    /// was cached when the delete was issued.
    pub async fn remove(&self, id: &ItemId) -> SyncResult<Item> {
        let removed = self
            .cache
            .get(id)
            .ok_or_else(|| SyncError::StaleReference(id.clone()))?;
        self.store
            .delete(id)
            .await
            .inspect_err(|e| warn!(%id, error = %e, "delete failed"))?;
        self.cache.apply(CacheEvent::Deleted(id.clone()));
        Ok(removed)
    }

    /// Execute a combobox commit
    pub async fn commit(&self, action: &CommitAction) -> SyncResult<Item> {
        match action {
            CommitAction::Restore(item) => self.restore(&item.id).await,
            CommitAction::Duplicate(item) => self.create(CreateItemRequest::named(item.name.clone())).await,
            CommitAction::AddNew(name) => self.create(CreateItemRequest::named(name.clone())).await,
        }
    }

    fn ensure_cached(&self, id: &ItemId) -> SyncResult<()> {
        if self.cache.contains(id) {
            Ok(())
        } else {
            Err(SyncError::StaleReference(id.clone()))
        }
    }

    fn settle(&self, item: Item) -> Item {
        let item = item.normalized();
        self.cache.apply(CacheEvent::Updated(item.clone()));
        item
    }
}
