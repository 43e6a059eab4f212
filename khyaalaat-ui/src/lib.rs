pub mod api;
pub mod components;
pub mod pages;
pub mod state;

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use components::{DemoBanner, Header, ToastHost};
use pages::{AdminUploadPage, HomePage, LoginPage, RequestPage, RequestsPage};
use state::{AuthState, Notifier, SiteMode};

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_context(AuthState::new());
    provide_context(Notifier::new());
    provide_context(SiteMode::new());

    view! {
        <Title text="Khyaalaat"/>
        <Meta name="description" content="Thoughts rendered in verse and color."/>

        <Router>
            <Header/>
            <main class="container">
                <DemoBanner/>
                <Routes fallback=|| view! { <p class="not-found">"Page not found."</p> }>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/request") view=RequestPage/>
                    <Route path=path!("/requests") view=RequestsPage/>
                    <Route path=path!("/admin/upload") view=AdminUploadPage/>
                    <Route path=path!("/login") view=LoginPage/>
                </Routes>
            </main>
            <ToastHost/>
        </Router>
    }
}

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
