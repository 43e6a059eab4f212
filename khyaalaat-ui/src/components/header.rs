use crate::api::sign_out;
use crate::state::{AuthState, Notifier};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn Header() -> impl IntoView {
    let auth = expect_context::<AuthState>();

    view! {
        <header class="header">
            <div class="header__inner">
                <a href="/" class="header__brand">"Khyaalaat"</a>
                <nav class="header__nav">
                    <a href="/">"Home"</a>
                    <a href="/request">"Request a Poem"</a>
                    <a href="/requests">"View Requests"</a>
                    <Show when=move || auth.is_admin()>
                        <a href="/admin/upload">"Upload"</a>
                    </Show>
                </nav>
                <AuthButton/>
            </div>
        </header>
    }
}

#[component]
fn AuthButton() -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let notifier = expect_context::<Notifier>();
    let busy = RwSignal::new(false);

    let logout = move || {
        busy.set(true);
        spawn_local(async move {
            if let Err(e) = sign_out().await {
                tracing::warn!("Sign-out failed: {}", e);
            }
            auth.set_viewer(None);
            notifier.invalidate();
            busy.set(false);
        });
    };

    move || {
        if !auth.is_loaded() {
            view! { <div class="auth-button auth-button--loading"></div> }.into_any()
        } else if let Some(viewer) = auth.viewer() {
            view! {
                <div class="auth-button">
                    <span class="auth-button__name">{viewer.identity.display_name().to_string()}</span>
                    <button
                        class="button button--ghost"
                        prop:disabled=move || busy.get()
                        on:click=move |_| logout()
                    >
                        "Logout"
                    </button>
                </div>
            }
            .into_any()
        } else {
            view! { <a href="/login" class="button">"Login"</a> }.into_any()
        }
    }
}
