//! Shared List Sync Engine
//!
//! Client-side state synchronization for a shared, multi-device list:
//! the item cache and its reconciler, the mutation dispatcher, the
//! real-time hub state machine, the sorted/grouped view projection and the
//! add/search combobox controller.
//!
//! Nothing in here touches the DOM or a specific async runtime. The browser
//! app drives timers and sockets and feeds the results back in.

pub mod cache;
pub mod combobox;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod item;
pub mod projector;
pub mod search;
pub mod store;

pub use cache::{CacheEvent, Reconciler};
pub use combobox::{ComboKey, ComboOption, Combobox, CommitAction, KeyOutcome, OptionKind};
pub use config::ClientConfig;
pub use dispatcher::{CacheAccess, MutationDispatcher};
pub use error::{SyncError, SyncResult};
pub use hub::{ConnectionState, HubChannel, HubEvent, HubFrame, HubHandlers};
pub use item::{Item, ItemId, ItemState, OTHER_CATEGORY};
pub use projector::{project, CategoryGroup, Projection};
pub use search::{QueryAction, SearchToken, SuggestionSearch, Suggestions};
pub use store::{CreateItemRequest, ItemPatch, ItemStore};
