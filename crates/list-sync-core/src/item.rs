//! Item Entity
//!
//! A single list entry plus the normalization and validation rules that
//! every cached copy must satisfy.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{SyncError, SyncResult};

/// Sentinel category for records with no (or a blank) category
pub const OTHER_CATEGORY: &str = "Other";

/// Fixed display order of categories. The sentinel stays last.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Produce",
    "Bakery",
    "Dairy",
    "Meat & Seafood",
    "Pantry",
    "Frozen",
    "Beverages",
    "Snacks",
    "Household",
    "Personal Care",
    OTHER_CATEGORY,
];

/// Upper bound (in characters) for names and notes
pub const MAX_TEXT_LEN: usize = 50;

/// Opaque server-assigned identifier.
///
/// Accepts either a JSON string or an integer on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => ItemId(id),
            RawId::Number(id) => ItemId(id.to_string()),
        })
    }
}

/// Lifecycle state of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    Active,
    Checked,
    Archived,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Active => "active",
            ItemState::Checked => "checked",
            ItemState::Archived => "archived",
        }
    }

    /// Position within a category: active rows before checked ones
    pub fn sort_rank(&self) -> u8 {
        match self {
            ItemState::Active => 0,
            ItemState::Checked => 1,
            ItemState::Archived => 2,
        }
    }

    /// Checkbox toggle target. Archived items come back as active.
    pub fn toggled(&self) -> Self {
        match self {
            ItemState::Active => ItemState::Checked,
            ItemState::Checked | ItemState::Archived => ItemState::Active,
        }
    }
}

/// A list entry as exchanged with the item store and the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub quantity_unit: Option<String>,
    /// Older records may carry no category at all
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default)]
    pub state: ItemState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Item {
    /// Backfill the category and force `updated_at > created_at`.
    ///
    /// Equal or inverted timestamps are bumped to `created_at + 1s`.
    pub fn normalized(mut self) -> Self {
        let category = self.category.trim();
        self.category = if category.is_empty() {
            OTHER_CATEGORY.to_string()
        } else {
            category.to_string()
        };
        if self.updated_at <= self.created_at {
            self.updated_at = self.created_at + TimeDelta::seconds(1);
        }
        self
    }

    /// True once the item changed after creation (beyond the normalization bump)
    pub fn is_edited(&self) -> bool {
        self.updated_at - self.created_at > TimeDelta::seconds(1)
    }

    pub fn is_archived(&self) -> bool {
        self.state == ItemState::Archived
    }

    /// "2 kg", "3", or None when no quantity is set
    pub fn quantity_label(&self) -> Option<String> {
        let quantity = self.quantity?;
        let amount = if quantity.fract() == 0.0 {
            format!("{}", quantity as i64)
        } else {
            format!("{}", quantity)
        };
        match self.quantity_unit.as_deref().map(str::trim) {
            Some(unit) if !unit.is_empty() => Some(format!("{} {}", amount, unit)),
            _ => Some(amount),
        }
    }
}

// ========================
// Validation
// ========================

/// Trim and check a name: non-empty, at most [`MAX_TEXT_LEN`] characters
pub fn validate_name(name: &str) -> SyncResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SyncError::Validation("name must not be empty".into()));
    }
    if name.chars().count() > MAX_TEXT_LEN {
        return Err(SyncError::Validation(format!(
            "name must be at most {} characters",
            MAX_TEXT_LEN
        )));
    }
    Ok(name.to_string())
}

/// Trim notes; blank notes become None
pub fn validate_notes(notes: Option<&str>) -> SyncResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if notes.chars().count() > MAX_TEXT_LEN {
        return Err(SyncError::Validation(format!(
            "notes must be at most {} characters",
            MAX_TEXT_LEN
        )));
    }
    Ok(Some(notes.to_string()))
}

/// Blank categories fall back to the sentinel
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => OTHER_CATEGORY.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    pub fn make_item(id: &str, name: &str, category: &str, state: ItemState, created: i64) -> Item {
        Item {
            id: ItemId::new(id),
            name: name.to_string(),
            notes: None,
            quantity: None,
            quantity_unit: None,
            category: category.to_string(),
            state,
            created_at: at(created),
            updated_at: at(created + 5),
        }
    }

    #[test]
    fn test_normalize_bumps_equal_timestamps() {
        let mut item = make_item("1", "Milk", "Dairy", ItemState::Active, 0);
        item.updated_at = item.created_at;
        let item = item.normalized();
        assert_eq!(item.updated_at, at(1));
        assert!(item.updated_at > item.created_at);
        assert!(!item.is_edited());
    }

    #[test]
    fn test_normalize_bumps_inverted_timestamps() {
        let mut item = make_item("1", "Milk", "Dairy", ItemState::Active, 10);
        item.updated_at = at(3);
        let item = item.normalized();
        assert_eq!(item.updated_at, at(11));
    }

    #[test]
    fn test_normalize_keeps_valid_timestamps() {
        let item = make_item("1", "Milk", "Dairy", ItemState::Active, 0).normalized();
        assert_eq!(item.updated_at, at(5));
        assert!(item.is_edited());
    }

    #[test]
    fn test_normalize_backfills_category() {
        let item = make_item("1", "Milk", "  ", ItemState::Active, 0).normalized();
        assert_eq!(item.category, OTHER_CATEGORY);
    }

    #[test]
    fn test_deserialize_legacy_record() {
        let json = r#"{
            "id": 42,
            "name": "Bread",
            "category": null,
            "state": "checked",
            "createdAt": "2024-01-01T10:00:00Z",
            "updatedAt": "2024-01-01T10:00:00Z"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ItemId::new("42"));
        assert_eq!(item.state, ItemState::Checked);
        let item = item.normalized();
        assert_eq!(item.category, OTHER_CATEGORY);
        assert!(item.updated_at > item.created_at);
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Milk ").unwrap(), "Milk");
        assert!(matches!(validate_name("   "), Err(SyncError::Validation(_))));
        assert!(validate_name(&"x".repeat(50)).is_ok());
        assert!(validate_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes(Some("  ")).unwrap(), None);
        assert_eq!(validate_notes(Some(" organic ")).unwrap(), Some("organic".into()));
        assert!(validate_notes(Some(&"n".repeat(51))).is_err());
    }

    #[test]
    fn test_quantity_label() {
        let mut item = make_item("1", "Rice", "Pantry", ItemState::Active, 0);
        assert_eq!(item.quantity_label(), None);
        item.quantity = Some(2.0);
        assert_eq!(item.quantity_label().as_deref(), Some("2"));
        item.quantity_unit = Some("kg".into());
        assert_eq!(item.quantity_label().as_deref(), Some("2 kg"));
        item.quantity = Some(1.5);
        assert_eq!(item.quantity_label().as_deref(), Some("1.5 kg"));
    }

    #[test]
    fn test_state_toggle() {
        assert_eq!(ItemState::Active.toggled(), ItemState::Checked);
        assert_eq!(ItemState::Checked.toggled(), ItemState::Active);
        assert_eq!(ItemState::Archived.toggled(), ItemState::Active);
    }
}
