//! Frontend Models
//!
//! Data structures shared with the sync engine.

pub use list_sync_core::{
    CategoryGroup, ComboOption, CommitAction, ConnectionState, Item, ItemPatch, ItemState,
    OptionKind,
};
