//! Local Item Cache & Reconciler
//!
//! The cache is the only source of truth for rendering. The reconciler is
//! its single writer: mutation results and hub pushes both arrive here as
//! [`CacheEvent`]s and are applied strictly in arrival order.

use std::collections::HashMap;

use tracing::debug;

use crate::item::{Item, ItemId};
use crate::projector::{project, Projection};

/// A change to fold into the cache
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    /// Insert unless the id is already cached (own-mutation echo)
    Created(Item),
    /// Overwrite unconditionally: last arrival wins
    Updated(Item),
    Deleted(ItemId),
    /// Replace the whole cache with a fresh listing
    Reset(Vec<Item>),
}

/// id -> item map. Every stored item has been normalized.
#[derive(Debug, Clone, Default, PartialEq)]
struct ItemCache {
    items: HashMap<ItemId, Item>,
}

impl ItemCache {
    fn upsert(&mut self, item: Item) {
        let item = item.normalized();
        self.items.insert(item.id.clone(), item);
    }

    fn remove(&mut self, id: &ItemId) -> bool {
        self.items.remove(id).is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciler {
    cache: ItemCache,
    /// Bumped on every effective change
    revision: u64,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns whether the cache changed.
    pub fn apply(&mut self, event: CacheEvent) -> bool {
        let changed = match event {
            CacheEvent::Created(item) => {
                if self.cache.items.contains_key(&item.id) {
                    debug!(id = %item.id, "created event for cached item ignored");
                    false
                } else {
                    self.cache.upsert(item);
                    true
                }
            }
            CacheEvent::Updated(item) => {
                self.cache.upsert(item);
                true
            }
            CacheEvent::Deleted(id) => self.cache.remove(&id),
            CacheEvent::Reset(items) => {
                self.cache.items.clear();
                for item in items {
                    self.cache.upsert(item);
                }
                true
            }
        };
        if changed {
            self.revision += 1;
        }
        changed
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.cache.items.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.cache.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cache.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.items.is_empty()
    }

    /// Unordered view of every cached item, archived ones included
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.cache.items.values()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Grouped view of the current revision
    pub fn project(&self, categories: &[String]) -> Projection {
        Projection {
            revision: self.revision,
            groups: project(self.items(), categories),
        }
    }
}
