//! UI Components
//!
//! Leptos components for the list view and the add/search field.

mod add_item_combobox;
mod connection_banner;
mod delete_confirm_button;
mod item_list_view;
mod item_row;
mod log_panel;

pub use add_item_combobox::AddItemCombobox;
pub use connection_banner::ConnectionBanner;
pub use delete_confirm_button::DeleteConfirmButton;
pub use item_list_view::ItemListView;
pub use item_row::ItemRow;
pub use log_panel::LogPanel;
