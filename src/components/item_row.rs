//! Item Row Component
//!
//! A single list entry: check toggle, inline rename, archive and delete.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::DeleteConfirmButton;
use crate::context::use_app_context;
use crate::models::{Item, ItemPatch, ItemState};

#[component]
pub fn ItemRow(item: Item) -> impl IntoView {
    let ctx = use_app_context();

    let id = item.id.clone();
    let checked = item.state == ItemState::Checked;
    let name = item.name.clone();
    let edited = item.is_edited();
    let quantity = item.quantity_label();
    let notes = item.notes.clone();

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(name.clone());

    let toggle_id = id.clone();
    let on_toggle = move |_| {
        let id = toggle_id.clone();
        spawn_local(async move {
            let _ = ctx.toggle_state(id).await;
        });
    };

    let rename_id = id.clone();
    let original = name.clone();
    let save = move || {
        set_editing.set(false);
        let text = draft.get_untracked();
        if text.trim() == original.trim() {
            return;
        }
        let id = rename_id.clone();
        let patch = ItemPatch {
            name: Some(text),
            ..Default::default()
        };
        spawn_local(async move {
            let _ = ctx.update(id, patch).await;
        });
    };
    let save_on_key = save.clone();
    let reset_name = name.clone();

    let archive_id = id.clone();
    let on_archive = move |_| {
        let id = archive_id.clone();
        spawn_local(async move {
            let _ = ctx.archive(id).await;
        });
    };

    let delete_id = id.clone();
    let label = format!("Delete {}", name);

    view! {
        <li class=if checked { "item-row checked" } else { "item-row" } data-item-id=id.to_string()>
            <input
                type="checkbox"
                checked=checked
                aria-label=format!("Mark {} as {}", name, if checked { "needed" } else { "done" })
                on:change=on_toggle
            />

            <Show
                when=move || editing.get()
                fallback={
                    let name = name.clone();
                    move || view! {
                        <span class="item-name" on:dblclick=move |_| set_editing.set(true)>
                            {name.clone()}
                        </span>
                    }
                }
            >
                <input
                    class="item-name-input"
                    type="text"
                    maxlength="50"
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                    on:blur={
                        let save = save.clone();
                        move |_| save()
                    }
                    on:keydown={
                        let save = save_on_key.clone();
                        let reset_name = reset_name.clone();
                        move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                            "Enter" => save(),
                            "Escape" => {
                                set_draft.set(reset_name.clone());
                                set_editing.set(false);
                            }
                            _ => {}
                        }
                    }
                />
            </Show>

            {edited.then(|| view! { <span class="item-edited" title="Edited">"✎"</span> })}
            {quantity.map(|q| view! { <span class="item-quantity">{q}</span> })}
            {notes.map(|n| view! { <span class="item-notes">{n}</span> })}

            <button class="archive-btn" on:click=on_archive>"Archive"</button>
            <DeleteConfirmButton
                label=label
                on_confirm=move |_| {
                    let id = delete_id.clone();
                    spawn_local(async move {
                        let _ = ctx.remove(id).await;
                    });
                }
            />
        </li>
    }
}
