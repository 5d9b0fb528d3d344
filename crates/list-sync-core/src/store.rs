//! Item Store Interface
//!
//! The durable store is an external collaborator reached through a
//! request/response API. The app implements [`ItemStore`] over its command
//! transport; tests use an in-memory fake.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{SyncError, SyncResult};
use crate::item::{normalize_category, validate_name, validate_notes, Item, ItemId, ItemState};

/// Request/response operations of the item store
///
/// Single-threaded by design: futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait ItemStore {
    /// List every item, archived ones included
    async fn list(&self) -> SyncResult<Vec<Item>>;

    /// Create an item; the returned copy carries the server-assigned id
    async fn create(&self, request: &CreateItemRequest) -> SyncResult<Item>;

    /// Partially update an item
    async fn update(&self, id: &ItemId, patch: &ItemPatch) -> SyncResult<Item>;

    async fn delete(&self, id: &ItemId) -> SyncResult<()>;

    /// Free-text search over names
    async fn search(&self, query: &str) -> SyncResult<Vec<Item>>;
}

// ========================
// Request Types
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CreateItemRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Trim and check every field before it leaves the client
    pub fn validated(self) -> SyncResult<Self> {
        Ok(Self {
            name: validate_name(&self.name)?,
            notes: validate_notes(self.notes.as_deref())?,
            quantity: self.quantity,
            quantity_unit: self
                .quantity_unit
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            category: self.category.as_deref().map(|c| normalize_category(Some(c))),
        })
    }
}

/// Partial update. `None` fields are left untouched;
/// `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ItemState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ItemPatch {
    pub fn state(state: ItemState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.name.is_none() && self.notes.is_none() && self.category.is_none()
    }

    pub fn validated(self) -> SyncResult<Self> {
        if self.is_empty() {
            return Err(SyncError::Validation("nothing to update".into()));
        }
        Ok(Self {
            state: self.state,
            name: self.name.as_deref().map(validate_name).transpose()?,
            notes: self
                .notes
                .map(|notes| validate_notes(notes.as_deref()))
                .transpose()?,
            category: self.category.as_deref().map(|c| normalize_category(Some(c))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_trims() {
        let request = CreateItemRequest {
            name: "  Milk ".into(),
            notes: Some("   ".into()),
            quantity_unit: Some(" l ".into()),
            category: Some("".into()),
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(request.name, "Milk");
        assert_eq!(request.notes, None);
        assert_eq!(request.quantity_unit.as_deref(), Some("l"));
        assert_eq!(request.category.as_deref(), Some("Other"));
    }

    #[test]
    fn test_create_request_rejects_long_name() {
        let err = CreateItemRequest::named("y".repeat(60)).validated().unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let json = serde_json::to_value(ItemPatch::state(ItemState::Archived)).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "archived" }));

        let clear_notes = ItemPatch {
            notes: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(clear_notes).unwrap(), serde_json::json!({ "notes": null }));
    }

    #[test]
    fn test_empty_patch_rejected() {
        assert!(matches!(ItemPatch::default().validated(), Err(SyncError::Validation(_))));
    }
}
