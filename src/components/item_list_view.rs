//! Item List View Component
//!
//! Active and checked items grouped by category in display order.

use leptos::prelude::*;

use crate::components::ItemRow;
use crate::context::use_app_context;
use crate::models::{CategoryGroup, Item};
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ItemListView() -> impl IntoView {
    let store = use_app_store();
    let ctx = use_app_context();
    let categories = StoredValue::new(ctx.config().categories);

    // Notifies only when the cache revision moves
    let projection = Memo::new(move |_| {
        let cache = store.cache().read();
        categories.with_value(|categories| cache.project(categories))
    });
    let groups = move || projection.with(|p| p.groups.clone());

    let items_in = move |category: String| {
        move || {
            projection.with(|p| {
                p.groups
                    .iter()
                    .find(|g: &&CategoryGroup| g.category == category)
                    .map(|g| g.items.clone())
                    .unwrap_or_default()
            })
        }
    };

    view! {
        <div class="item-list">
            <Show when=move || projection.with(|p| p.groups.is_empty()) && !store.loading().get()>
                <p class="empty-list">"Nothing on the list yet."</p>
            </Show>
            <For
                each=groups
                key=|group| group.category.clone()
                children=move |group| {
                    let category = group.category.clone();
                    view! {
                        <section class="category-group">
                            <h2 class="category-title">{category.clone()}</h2>
                            <ul class="category-items">
                                <For
                                    each=items_in(category)
                                    key=|item: &Item| {
                                        (
                                            item.id.clone(),
                                            item.name.clone(),
                                            item.notes.clone(),
                                            item.quantity_label(),
                                            item.state,
                                            item.updated_at,
                                        )
                                    }
                                    children=move |item| view! { <ItemRow item=item /> }
                                />
                            </ul>
                        </section>
                    }
                }
            />
        </div>
    }
}
