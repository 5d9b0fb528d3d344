//! Log Panel Component
//!
//! Collapsible view of the in-memory log buffer, refreshed on demand.

use leptos::prelude::*;
use rolling_logger::LogBuffer;

#[component]
pub fn LogPanel() -> impl IntoView {
    let logs = expect_context::<LogBuffer>();
    let (lines, set_lines) = signal(Vec::<String>::new());

    let refresh = move || {
        set_lines.set(logs.snapshot().iter().map(ToString::to_string).collect());
    };
    let refresh_on_toggle = refresh.clone();

    view! {
        <details class="log-panel">
            <summary on:click=move |_| refresh_on_toggle()>"Recent activity"</summary>
            <button class="log-refresh-btn" on:click=move |_| refresh()>"Refresh"</button>
            <pre class="log-lines">
                {move || lines.get().join("\n")}
            </pre>
        </details>
    }
}
