use crate::components::FieldMessage;
use crate::state::AuthState;
use khyaalaat_app::domain::{Genre, PoemUploadForm, MAX_IMAGE_BYTES};
use khyaalaat_errors::FieldErrors;
use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_query_map};

/// Outcome the upload route reports back through the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UploadStatus {
    Uploaded,
    Demo,
    Failed(String),
}

impl UploadStatus {
    fn from_query(status: Option<String>, error: Option<String>) -> Option<Self> {
        match (status.as_deref(), error) {
            (_, Some(error)) => Some(Self::Failed(error)),
            (Some("uploaded"), None) => Some(Self::Uploaded),
            (Some("demo"), None) => Some(Self::Demo),
            _ => None,
        }
    }
}

#[component]
pub fn AdminUploadPage() -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if auth.is_loaded() && !auth.is_admin() {
            navigate("/login", Default::default());
        }
    });

    view! {
        <div class="hero">
            <h1 class="hero__title">"Upload Poetry"</h1>
            <p class="hero__subtitle">"Add a new poem with its image to the collection."</p>
        </div>
        <Show
            when=move || auth.is_admin()
            fallback=|| view! { <p class="notice">"Checking your access..."</p> }
        >
            <UploadStatusBanner/>
            <UploadForm/>
        </Show>
    }
}

#[component]
fn UploadStatusBanner() -> impl IntoView {
    let query = use_query_map();
    let status = move || {
        query.with(|q| UploadStatus::from_query(q.get("status"), q.get("error")))
    };

    move || {
        status().map(|status| match status {
            UploadStatus::Uploaded => view! {
                <div class="card card--success">
                    <p class="card__title">"Upload Successful"</p>
                    <p>"Poetry saved. "<a href="/">"See it on the home page."</a></p>
                </div>
            }
            .into_any(),
            UploadStatus::Demo => view! {
                <div class="card">
                    <p class="card__title">"Demo mode"</p>
                    <p>"Uploads are not saved while the site shows sample data."</p>
                </div>
            }
            .into_any(),
            UploadStatus::Failed(message) => view! {
                <div class="error">
                    <p class="error__title">"Upload Failed"</p>
                    <p class="error__message">{message}</p>
                </div>
            }
            .into_any(),
        })
    }
}

/// Posted as multipart to `/admin/upload`; text fields are checked here
/// first so obvious mistakes never leave the browser.
#[component]
fn UploadForm() -> impl IntoView {
    let form = RwSignal::new(PoemUploadForm::default());
    let errors = RwSignal::new(FieldErrors::new());
    let submitting = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        match form.with_untracked(PoemUploadForm::validate) {
            Ok(_) => {
                errors.set(FieldErrors::new());
                submitting.set(true);
            }
            Err(e) => {
                ev.prevent_default();
                errors.set(e);
            }
        }
    };

    view! {
        <form
            class="card form"
            method="post"
            action="/admin/upload"
            enctype="multipart/form-data"
            on:submit=on_submit
        >
            <label class="form__field">
                <span>"Title"</span>
                <input
                    class="input"
                    name="title"
                    placeholder="The Whispering Wind"
                    required
                    prop:value=move || form.with(|f| f.title.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        form.update(|f| f.title = v)
                    }
                />
                <FieldMessage errors field="title"/>
            </label>

            <label class="form__field">
                <span>"Image"</span>
                <input class="input" type="file" name="image" accept="image/*" required/>
                <small>{format!("Up to {} MB.", MAX_IMAGE_BYTES / (1024 * 1024))}</small>
                <FieldMessage errors field="image"/>
            </label>

            <label class="form__field">
                <span>"Caption"</span>
                <textarea
                    class="input"
                    name="caption"
                    placeholder="A short caption or excerpt for the card..."
                    prop:value=move || form.with(|f| f.caption.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        form.update(|f| f.caption = v)
                    }
                ></textarea>
            </label>

            <label class="form__field">
                <span>"Full Poem"</span>
                <textarea
                    class="input input--tall"
                    name="poem"
                    placeholder="Enter the full poem text here."
                    required
                    prop:value=move || form.with(|f| f.poem.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        form.update(|f| f.poem = v)
                    }
                ></textarea>
                <FieldMessage errors field="poem"/>
            </label>

            <label class="form__field">
                <span>"Genre"</span>
                <select
                    class="input"
                    name="genre"
                    prop:value=move || form.with(|f| f.genre.clone())
                    on:change=move |ev| {
                        let v = event_target_value(&ev);
                        form.update(|f| f.genre = v)
                    }
                >
                    <option value="" disabled=true>"Select a genre"</option>
                    {Genre::ALL
                        .into_iter()
                        .map(|g| view! { <option value=g.as_str()>{g.as_str()}</option> })
                        .collect::<Vec<_>>()}
                </select>
                <FieldMessage errors field="genre"/>
            </label>

            <button type="submit" class="button" prop:disabled=move || submitting.get()>
                {move || if submitting.get() { "Uploading..." } else { "Upload Poetry" }}
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_in_query_wins_over_status() {
        assert_eq!(
            UploadStatus::from_query(Some("uploaded".into()), Some("Storage failed".into())),
            Some(UploadStatus::Failed("Storage failed".into()))
        );
        assert_eq!(
            UploadStatus::from_query(Some("uploaded".into()), None),
            Some(UploadStatus::Uploaded)
        );
        assert_eq!(UploadStatus::from_query(Some("other".into()), None), None);
    }
}
