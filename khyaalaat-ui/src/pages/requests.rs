use crate::api::{into_app_error, list_requests};
use crate::components::{ErrorDisplay, LoadingSpinner, RequestCell, RequestTable};
use crate::state::{CellCache, Notifier};
use leptos::prelude::*;
use uuid::Uuid;

#[component]
pub fn RequestsPage() -> impl IntoView {
    let notifier = expect_context::<Notifier>();
    let listing = Resource::new(move || notifier.version(), |_| list_requests());
    let cells = CellCache::<Uuid, RequestCell>::new();

    view! {
        <div class="hero">
            <h1 class="hero__title">"Poem Requests"</h1>
            <p class="hero__subtitle">"Here are all the wonderful ideas submitted by visitors."</p>
        </div>

        <Suspense fallback=|| view! { <LoadingSpinner message="Loading requests..."/> }>
            {move || {
                listing.get().map(|result| match result {
                    Ok(requests) => view! { <RequestTable requests cells=cells.clone()/> }.into_any(),
                    Err(e) => view! {
                        <ErrorDisplay
                            message=into_app_error(e).user_message().to_string()
                            on_retry=Callback::new(move |_| listing.refetch())
                        />
                    }
                    .into_any(),
                })
            }}
        </Suspense>
    }
}
