use crate::api::{into_app_error, submit_request, suggest_topics};
use crate::components::FieldMessage;
use crate::state::{Notifier, SiteMode};
use khyaalaat_app::domain::{PoemRequestForm, RequestGenre, TopicIdea, WriteOutcome};
use khyaalaat_app::reconcile::{MutationKind, Notice};
use khyaalaat_errors::{AppError, FieldErrors};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn RequestPage() -> impl IntoView {
    let submitted = RwSignal::new(false);

    view! {
        <div class="hero">
            <h1 class="hero__title">"Request a Poem"</h1>
            <p class="hero__subtitle">
                "Have a specific idea for a poem? Fill out the form below to send your request."
            </p>
        </div>
        <Show when=move || !submitted.get() fallback=move || view! { <RequestSent submitted/> }>
            <RequestForm submitted/>
        </Show>
    }
}

#[component]
fn RequestSent(submitted: RwSignal<bool>) -> impl IntoView {
    view! {
        <div class="card card--success">
            <h2 class="card__title">"Request Sent!"</h2>
            <p>"Thank you for your submission. I will get back to you shortly."</p>
            <button class="button" on:click=move |_| submitted.set(false)>
                "Submit another request"
            </button>
        </div>
    }
}

#[component]
fn RequestForm(submitted: RwSignal<bool>) -> impl IntoView {
    let notifier = expect_context::<Notifier>();
    let form = RwSignal::new(PoemRequestForm::default());
    let errors = RwSignal::new(FieldErrors::new());
    let sending = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let values = form.get_untracked();
        if let Err(e) = values.validate() {
            errors.set(e);
            return;
        }
        errors.set(FieldErrors::new());
        sending.set(true);

        spawn_local(async move {
            match submit_request(values).await.map_err(into_app_error) {
                Ok(WriteOutcome::Stored(_)) => {
                    notifier.invalidate();
                    submitted.set(true);
                }
                Ok(WriteOutcome::Skipped) => {
                    notifier.demo_skipped();
                    submitted.set(true);
                }
                Err(AppError::Validation(fields)) => errors.set(fields),
                Err(e) => notifier.failure(MutationKind::SubmitRequest, &e),
            }
            sending.set(false);
        });
    };

    view! {
        <form class="card form" on:submit=on_submit>
            <h2 class="card__title">"Your Poem Idea"</h2>

            <label class="form__field">
                <span>"Your Name"</span>
                <input
                    class="input"
                    placeholder="e.g., Jane Doe"
                    prop:value=move || form.with(|f| f.name.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        form.update(|f| f.name = v)
                    }
                />
                <FieldMessage errors field="name"/>
            </label>

            <label class="form__field">
                <span>"Main Topic"</span>
                <input
                    class="input"
                    placeholder="e.g., Autumn Rain"
                    prop:value=move || form.with(|f| f.topic.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        form.update(|f| f.topic = v)
                    }
                />
                <FieldMessage errors field="topic"/>
            </label>

            <div class="form__row">
                <label class="form__field">
                    <span>"Genre"</span>
                    <select
                        class="input"
                        prop:value=move || form.with(|f| f.genre.clone())
                        on:change=move |ev| {
                            let v = event_target_value(&ev);
                            form.update(|f| f.genre = v)
                        }
                    >
                        <option value="" disabled=true>"Select a genre"</option>
                        {RequestGenre::ALL
                            .into_iter()
                            .map(|g| view! { <option value=g.as_str()>{g.as_str()}</option> })
                            .collect::<Vec<_>>()}
                    </select>
                    <FieldMessage errors field="genre"/>
                </label>

                <label class="form__field">
                    <span>"Mood"</span>
                    <input
                        class="input"
                        placeholder="e.g., Hopeful"
                        prop:value=move || form.with(|f| f.mood.clone())
                        on:input=move |ev| {
                            let v = event_target_value(&ev);
                            form.update(|f| f.mood = v)
                        }
                    />
                    <FieldMessage errors field="mood"/>
                </label>
            </div>

            <label class="form__field">
                <span>"Description"</span>
                <textarea
                    class="input"
                    rows="5"
                    placeholder="Describe the feelings, images or story you have in mind."
                    prop:value=move || form.with(|f| f.description.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        form.update(|f| f.description = v)
                    }
                ></textarea>
                <FieldMessage errors field="description"/>
            </label>

            <TopicSuggestions form/>

            <button type="submit" class="button" prop:disabled=move || sending.get()>
                {move || if sending.get() { "Sending..." } else { "Send Request" }}
            </button>
        </form>
    }
}

/// Offers model-generated topics for what has been typed so far.
#[component]
fn TopicSuggestions(form: RwSignal<PoemRequestForm>) -> impl IntoView {
    let mode = expect_context::<SiteMode>();
    let notifier = expect_context::<Notifier>();
    let suggestions = RwSignal::new(Vec::<String>::new());
    let loading = RwSignal::new(false);

    let fetch = move |_| {
        let idea = form.with_untracked(|f| TopicIdea {
            topic: f.topic.clone(),
            genre: f.genre.clone(),
            mood: f.mood.clone(),
            description: f.description.clone(),
        });
        loading.set(true);
        spawn_local(async move {
            match suggest_topics(idea).await.map_err(into_app_error) {
                Ok(topics) => suggestions.set(topics),
                Err(e) => notifier.push(Notice::error("Suggestions", e.user_message())),
            }
            loading.set(false);
        });
    };

    view! {
        <Suspense fallback=|| ()>
            <Show when=move || mode.suggestions_enabled()>
                <div class="suggestions">
                    <button
                        type="button"
                        class="button button--ghost"
                        prop:disabled=move || loading.get()
                        on:click=fetch
                    >
                        {move || if loading.get() { "Thinking..." } else { "Suggest topics" }}
                    </button>
                    <ul class="suggestions__list">
                        {move || {
                            suggestions
                                .get()
                                .into_iter()
                                .map(|topic| {
                                    let chosen = topic.clone();
                                    view! {
                                        <li>
                                            <button
                                                type="button"
                                                class="suggestions__item"
                                                on:click=move |_| form.update(|f| f.topic = chosen.clone())
                                            >
                                                {topic}
                                            </button>
                                        </li>
                                    }
                                })
                                .collect::<Vec<_>>()
                        }}
                    </ul>
                </div>
            </Show>
        </Suspense>
    }
}
