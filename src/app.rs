//! Shared List Frontend App
//!
//! Loads the client config, then the list, and keeps it live through the
//! hub. A reconnection triggers a full reload since pushes may have been
//! missed while offline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use rolling_logger::LogBuffer;

use crate::commands;
use crate::components::{AddItemCombobox, ConnectionBanner, ItemListView, LogPanel};
use crate::context::AppContext;
use crate::hub::HubClient;
use crate::store::{store_set_connection, AppState, AppStateStoreFields, AppStore};

#[component]
pub fn App(logs: LogBuffer) -> impl IntoView {
    let store = AppStore::new(AppState::default());
    provide_context(store);
    provide_context(logs);

    let ctx = AppContext::new(store, Default::default());
    provide_context(ctx);

    let (ready, set_ready) = signal(false);
    let hub: StoredValue<Option<HubClient>, LocalStorage> = StoredValue::new_local(None);
    let disposed = Arc::new(AtomicBool::new(false));

    on_cleanup({
        let disposed = disposed.clone();
        move || {
            disposed.store(true, Ordering::Relaxed);
            if let Some(client) = hub.try_get_value().flatten() {
                client.stop();
            }
        }
    });

    spawn_local(async move {
        let config = commands::get_client_config().await;
        if disposed.load(Ordering::Relaxed) {
            return;
        }
        ctx.set_config(config.clone());
        set_ready.set(true);

        // Owned by the component from here on, so cleanup always stops it
        let client = HubClient::new(config);
        client.set_handler(move |event| ctx.reconcile(event));
        client.on_status(move |status| {
            store_set_connection(&store, status.state, status.error, status.failures);
            if status.resync {
                tracing::info!("reconnected, reloading list");
                spawn_local(async move {
                    let _ = ctx.load().await;
                });
            }
        });
        hub.set_value(Some(client.clone()));

        if let Err(e) = ctx.load().await {
            tracing::warn!(error = %e, "initial load failed");
        }
        if disposed.load(Ordering::Relaxed) {
            return;
        }
        client.start();
    });

    let retry_load = move |_| {
        spawn_local(async move {
            let _ = ctx.load().await;
        });
    };

    view! {
        <main class="app-layout">
            <h1>"Shopping List"</h1>
            <ConnectionBanner />
            <Show
                when=move || ready.get()
                fallback=|| view! { <p class="loading">"Loading..."</p> }
            >
                <AddItemCombobox />
                {move || store.error().get().map(|e| view! {
                    <p class="error-banner" role="alert">
                        <span>{e}</span>
                        <Show when=move || store.load_failed().get() && !store.loading().get()>
                            <button class="retry-btn" on:click=retry_load>"Retry"</button>
                        </Show>
                    </p>
                })}
                <Show when=move || store.loading().get()>
                    <p class="loading">"Loading items..."</p>
                </Show>
                <ItemListView />
            </Show>
            <LogPanel />
        </main>
    }
}
