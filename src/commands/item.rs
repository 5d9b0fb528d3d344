//! Item Commands
//!
//! [`ItemStore`] over the host's item commands.

use async_trait::async_trait;
use serde::Serialize;

use list_sync_core::{CreateItemRequest, Item, ItemId, ItemPatch, ItemStore, SyncResult};

use super::call;

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct IdArgs<'a> {
    id: &'a ItemId,
}

#[derive(Serialize)]
struct CreateItemArgs<'a> {
    request: &'a CreateItemRequest,
}

#[derive(Serialize)]
struct UpdateItemArgs<'a> {
    id: &'a ItemId,
    patch: &'a ItemPatch,
}

#[derive(Serialize)]
struct SearchArgs<'a> {
    query: &'a str,
}

// ========================
// Commands
// ========================

/// Item store reached through `invoke`
#[derive(Debug, Clone, Copy, Default)]
pub struct InvokeItemStore;

#[async_trait(?Send)]
impl ItemStore for InvokeItemStore {
    async fn list(&self) -> SyncResult<Vec<Item>> {
        call::<(), _>("list_items", None).await
    }

    async fn create(&self, request: &CreateItemRequest) -> SyncResult<Item> {
        call("create_item", Some(&CreateItemArgs { request })).await
    }

    async fn update(&self, id: &ItemId, patch: &ItemPatch) -> SyncResult<Item> {
        call("update_item", Some(&UpdateItemArgs { id, patch })).await
    }

    async fn delete(&self, id: &ItemId) -> SyncResult<()> {
        call("delete_item", Some(&IdArgs { id })).await
    }

    async fn search(&self, query: &str) -> SyncResult<Vec<Item>> {
        call("search_items", Some(&SearchArgs { query })).await
    }
}
