//! Add Item Combobox Component
//!
//! Search-as-you-type field that adds items, restores archived ones or
//! adds a duplicate of an active one. All decisions live in
//! [`Combobox`]; this component forwards DOM events, schedules the
//! debounced search and renders the resulting state.

use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use list_sync_core::combobox::dropdown_max_height;
use list_sync_core::{ComboKey, Combobox, ItemStore, QueryAction, SearchToken};

use crate::commands::InvokeItemStore;
use crate::context::use_app_context;
use crate::models::{ComboOption, CommitAction, OptionKind};

const LISTBOX_ID: &str = "add-item-listbox";

/// Header shown above the first option of each section
fn section_title(options: &[ComboOption], index: usize) -> Option<&'static str> {
    let kind = options.get(index)?.kind;
    if index > 0 && options[index - 1].kind == kind {
        return None;
    }
    match kind {
        OptionKind::Archived => Some("Recently Used"),
        OptionKind::Active => Some("Already in List"),
        OptionKind::AddNew => None,
    }
}

fn option_id(option: &ComboOption) -> String {
    format!("{}-{}", LISTBOX_ID, option.id)
}

#[component]
pub fn AddItemCombobox() -> impl IntoView {
    let ctx = use_app_context();
    let config = StoredValue::new(ctx.config());
    let combo = RwSignal::new(config.with_value(Combobox::new));
    let (max_height, set_max_height) = signal(config.with_value(|c| c.dropdown_max_height));
    let (busy, set_busy) = signal(false);

    let input_ref = NodeRef::<html::Input>::new();
    let root_ref = NodeRef::<html::Div>::new();

    // Clamp the dropdown to the room left below the input
    let measure = move || {
        let (Some(input), Some(window)) = (input_ref.get_untracked(), web_sys::window()) else {
            return;
        };
        let bottom = input.get_bounding_client_rect().bottom();
        let viewport = window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or_default();
        set_max_height.set(config.with_value(|c| dropdown_max_height(viewport, bottom, c)));
    };

    let run_search = move |token: SearchToken, delay: Duration| {
        spawn_local(async move {
            TimeoutFuture::new(delay.as_millis() as u32).await;
            let Some(query) = combo.try_update(|c| c.fire(token)).flatten() else {
                return;
            };
            match InvokeItemStore.search(&query).await {
                Ok(items) => {
                    let fresh = combo.try_update(|c| c.receive(token, items)).unwrap_or(false);
                    if !fresh {
                        tracing::debug!(%query, "dropped stale suggestions");
                    }
                }
                Err(e) => {
                    tracing::warn!(%query, error = %e, "suggestion search failed");
                    combo.try_update(|c| c.search_failed(token));
                }
            }
        });
    };

    let commit = move |action: CommitAction| {
        if busy.get_untracked() {
            return;
        }
        set_busy.set(true);
        spawn_local(async move {
            let result = match &action {
                CommitAction::AddNew(name) => ctx.add(name.clone()).await,
                other => ctx.commit(other.clone()).await,
            };
            match result {
                Ok(item) => {
                    combo.try_update(|c| c.commit_succeeded(&action, &item));
                    if let Some(input) = input_ref.get_untracked() {
                        let _ = input.focus();
                    }
                }
                Err(e) => {
                    combo.try_update(|c| c.commit_failed(&action, &e));
                }
            }
            set_busy.set(false);
        });
    };

    let on_input = move |ev: ev::Event| {
        let value = event_target_value(&ev);
        match combo.try_update(|c| c.set_query(&value)) {
            Some(QueryAction::Schedule { token, delay }) => {
                measure();
                run_search(token, delay);
            }
            Some(QueryAction::Clear) | None => {}
        }
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        let key = ComboKey::from_key(&ev.key());
        let outcome = combo.try_update(|c| c.key(key)).unwrap_or_default();
        if outcome.prevent_default {
            ev.prevent_default();
        }
        if let Some(action) = outcome.commit {
            commit(action);
        }
    };

    let outside = window_event_listener(ev::pointerdown, move |ev| {
        let Some(root) = root_ref.get_untracked() else {
            return;
        };
        let target = ev.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok());
        if !root.contains(target.as_ref()) {
            combo.update(|c| {
                c.pointer_down_outside();
            });
        }
    });
    let resize = window_event_listener(ev::resize, move |_| {
        if combo.with_untracked(|c| c.is_open()) {
            measure();
        }
    });
    on_cleanup(move || {
        outside.remove();
        resize.remove();
    });

    let is_open = move || combo.with(|c| c.is_open() && !c.options().is_empty());

    view! {
        <div class="add-item-combobox" node_ref=root_ref>
            <label class="sr-only" for="add-item-input">"Add an item"</label>
            <input
                id="add-item-input"
                node_ref=input_ref
                type="text"
                role="combobox"
                autocomplete="off"
                placeholder="Add an item..."
                maxlength="50"
                aria-autocomplete="list"
                aria-controls=LISTBOX_ID
                aria-expanded=move || if is_open() { "true" } else { "false" }
                aria-activedescendant=move || {
                    combo.with(|c| {
                        c.active_descendant()
                            .map(|id| format!("{}-{}", LISTBOX_ID, id))
                            .unwrap_or_default()
                    })
                }
                aria-busy=move || if busy.get() { "true" } else { "false" }
                prop:value=move || combo.with(|c| c.query().to_string())
                on:input=on_input
                on:keydown=on_keydown
            />
            <button
                class="add-btn"
                type="button"
                disabled=move || busy.get() || combo.with(|c| c.query().trim().is_empty())
                on:click=move |_| {
                    if let Some(action) = combo.try_update(|c| c.add_current()).flatten() {
                        commit(action);
                    }
                }
            >
                "Add"
            </button>

            <Show when=is_open>
                <ul
                    id=LISTBOX_ID
                    class="combobox-options"
                    role="listbox"
                    style=move || format!("max-height: {}px;", max_height.get())
                >
                    {move || {
                        let (options, highlighted) = combo.with(|c| (c.options().to_vec(), c.highlighted()));
                        options
                            .iter()
                            .enumerate()
                            .map(|(index, option)| {
                                let title = section_title(&options, index);
                                let selected = index == highlighted;
                                let class = match (option.kind, selected) {
                                    (OptionKind::AddNew, true) => "combobox-option add-new highlighted",
                                    (OptionKind::AddNew, false) => "combobox-option add-new",
                                    (_, true) => "combobox-option highlighted",
                                    (_, false) => "combobox-option",
                                };
                                view! {
                                    {title.map(|t| view! { <li class="combobox-section" role="presentation">{t}</li> })}
                                    <li
                                        id=option_id(option)
                                        class=class
                                        role="option"
                                        aria-selected=if selected { "true" } else { "false" }
                                        on:mousedown=|ev| ev.prevent_default()
                                        on:mouseenter=move |_| combo.update(|c| c.highlight(index))
                                        on:click=move |_| {
                                            if let Some(action) = combo.try_update(|c| c.select(index)).flatten() {
                                                commit(action);
                                            }
                                        }
                                    >
                                        <span class="option-label">{option.label.clone()}</span>
                                        {option.sublabel.clone().map(|s| view! { <span class="option-sublabel">{s}</span> })}
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </Show>

            <div class="sr-only" role="status" aria-live="polite" aria-atomic="true">
                {move || combo.with(|c| c.announcement().unwrap_or_default().to_string())}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, kind: OptionKind) -> ComboOption {
        ComboOption {
            id: id.to_string(),
            kind,
            item: None,
            label: id.to_string(),
            sublabel: None,
        }
    }

    #[test]
    fn test_section_titles_only_on_first_of_each_kind() {
        let options = vec![
            option("a", OptionKind::Archived),
            option("b", OptionKind::Archived),
            option("c", OptionKind::Active),
            option("add-new", OptionKind::AddNew),
        ];
        assert_eq!(section_title(&options, 0), Some("Recently Used"));
        assert_eq!(section_title(&options, 1), None);
        assert_eq!(section_title(&options, 2), Some("Already in List"));
        assert_eq!(section_title(&options, 3), None);
        assert_eq!(section_title(&options, 4), None);
    }

    #[test]
    fn test_option_ids_are_scoped_to_the_listbox() {
        assert_eq!(option_id(&option("add-new", OptionKind::AddNew)), "add-item-listbox-add-new");
    }
}
