use crate::state::Notifier;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

/// Renders queued notices and follows up on login redirects.
#[component]
pub fn ToastHost() -> impl IntoView {
    let notifier = expect_context::<Notifier>();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if notifier.take_login_redirect() {
            navigate("/login", Default::default());
        }
    });

    view! {
        <div class="toasts">
            <For
                each=move || notifier.toasts()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    let class = if toast.notice.destructive { "toast toast--error" } else { "toast" };
                    view! {
                        <div class=class role="status">
                            <p class="toast__title">{toast.notice.title}</p>
                            <p class="toast__description">{toast.notice.description}</p>
                            <button class="toast__close" on:click=move |_| notifier.dismiss(id)>"×"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}
