use khyaalaat_errors::FieldErrors;
use leptos::prelude::*;

/// Inline message for one form field.
#[component]
pub fn FieldMessage(errors: RwSignal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors.with(|e| e.get(field).map(str::to_string)).map(|message| {
            view! { <p class="field-error">{message}</p> }
        })
    }
}
