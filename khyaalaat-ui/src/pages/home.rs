use crate::api::{into_app_error, list_poems};
use crate::components::{ErrorDisplay, LoadingSpinner, PoemCard, PoemCell};
use crate::state::{AuthState, CellCache, Notifier};
use leptos::prelude::*;
use uuid::Uuid;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let notifier = expect_context::<Notifier>();
    let poems = Resource::new(
        move || (auth.viewer_id(), notifier.version()),
        |_| list_poems(),
    );
    let cells = CellCache::<Uuid, PoemCell>::new();

    view! {
        <div class="hero">
            <h1 class="hero__title">"Khyaalaat"</h1>
            <p class="hero__subtitle">"Thoughts rendered in verse and color."</p>
        </div>

        <Suspense fallback=|| view! { <LoadingSpinner message="Gathering poems..."/> }>
            {move || {
                poems.get().map(|result| match result {
                    Ok(listings) if listings.is_empty() => view! {
                        <div class="poems__empty">
                            <p>"No poems have been uploaded yet."</p>
                            <p>"Uploaded poems will appear here."</p>
                        </div>
                    }
                    .into_any(),
                    Ok(listings) => view! {
                        <div class="poems">
                            {listings
                                .into_iter()
                                .map(|listing| {
                                    let cell = PoemCell::for_listing(&cells, &listing);
                                    view! { <PoemCard listing cell/> }
                                })
                                .collect::<Vec<_>>()}
                        </div>
                    }
                    .into_any(),
                    Err(e) => view! {
                        <ErrorDisplay
                            message=into_app_error(e).user_message().to_string()
                            on_retry=Callback::new(move |_| poems.refetch())
                        />
                    }
                    .into_any(),
                })
            }}
        </Suspense>
    }
}
