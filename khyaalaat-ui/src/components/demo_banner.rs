use crate::state::SiteMode;
use leptos::prelude::*;

#[component]
pub fn DemoBanner() -> impl IntoView {
    let mode = expect_context::<SiteMode>();

    view! {
        <Suspense fallback=|| ()>
            <Show when=move || mode.is_demo()>
                <div class="demo-banner">
                    <strong>"Demo Mode: "</strong>
                    "This site is running with sample data. Set the Supabase credentials to enable full functionality."
                </div>
            </Show>
        </Suspense>
    }
}
