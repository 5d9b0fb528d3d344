//! Delete Confirm Button Component
//!
//! Two-step delete: the first press asks, the second deletes. Escape or
//! "Keep" backs out.

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Confirming,
}

/// `label` names the thing being deleted for assistive tech, e.g. "Delete Milk"
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] label: String,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let stage = RwSignal::new(Stage::Idle);
    let cancel = move || stage.set(Stage::Idle);

    move || match stage.get() {
        Stage::Idle => view! {
            <button
                class="delete-btn"
                aria-label=label.clone()
                on:click=move |_| stage.set(Stage::Confirming)
            >
                "×"
            </button>
        }
        .into_any(),
        Stage::Confirming => view! {
            <span
                class="delete-confirm"
                role="group"
                aria-label=format!("{}?", label)
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Escape" {
                        cancel();
                    }
                }
            >
                <button
                    class="confirm-btn"
                    on:click=move |_| {
                        cancel();
                        on_confirm.run(());
                    }
                >
                    "Delete"
                </button>
                <button class="cancel-btn" on:click=move |_| cancel()>"Keep"</button>
            </span>
        }
        .into_any(),
    }
}
