use crate::api::{into_app_error, sign_in, sign_in_as_guest, sign_up};
use crate::components::FieldMessage;
use crate::state::{AuthState, Notifier};
use khyaalaat_app::domain::{AuthOutcome, Credentials};
use khyaalaat_errors::{AppError, FieldErrors};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SignIn,
    SignUp,
    Guest,
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let notifier = expect_context::<Notifier>();
    let navigate = use_navigate();

    let credentials = RwSignal::new(Credentials::default());
    let errors = RwSignal::new(FieldErrors::new());
    let auth_error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);
    let target = RwSignal::new(None::<&'static str>);

    // Navigation has to happen from the component's owner, not the task.
    Effect::new(move |_| {
        if let Some(path) = target.get() {
            navigate(path, Default::default());
        }
    });

    let run = move |action: Action| {
        let values = credentials.get_untracked();
        if action != Action::Guest {
            if let Err(e) = values.validate() {
                errors.set(e);
                return;
            }
        }
        errors.set(FieldErrors::new());
        auth_error.set(None);
        busy.set(true);

        spawn_local(async move {
            let result = match action {
                Action::SignIn => sign_in(values).await,
                Action::SignUp => sign_up(values).await,
                Action::Guest => sign_in_as_guest().await,
            };
            match result.map_err(into_app_error) {
                Ok(AuthOutcome::SignedIn(viewer)) => {
                    let home = if viewer.is_admin { "/admin/upload" } else { "/" };
                    if action == Action::SignUp {
                        notifier.success("Account Created", "You have successfully signed up.");
                    }
                    auth.set_viewer(Some(viewer));
                    notifier.invalidate();
                    target.set(Some(home));
                }
                Ok(AuthOutcome::ConfirmationSent) => notifier.success(
                    "Check your email",
                    "Confirm your address with the link we sent, then sign in.",
                ),
                Ok(AuthOutcome::DemoMode) => notifier.success(
                    "Demo mode",
                    "Signing in is disabled while the site shows sample data.",
                ),
                Err(AppError::Validation(fields)) => {
                    auth_error.set(fields.first_message().map(str::to_string));
                    errors.set(fields);
                }
                Err(e) => auth_error.set(Some(e.user_message().to_string())),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="card form form--narrow">
            <h1 class="card__title">"Welcome"</h1>
            <p class="card__subtitle">"Sign in to manage poems, or continue as a guest to like and comment."</p>

            <form on:submit=move |ev: leptos::ev::SubmitEvent| {
                ev.prevent_default();
                run(Action::SignIn);
            }>
                <label class="form__field">
                    <span>"Email"</span>
                    <input
                        class="input"
                        type="email"
                        placeholder="name@example.com"
                        autocomplete="email"
                        prop:value=move || credentials.with(|c| c.email.clone())
                        on:input=move |ev| {
                            let v = event_target_value(&ev);
                            credentials.update(|c| c.email = v)
                        }
                    />
                    <FieldMessage errors field="email"/>
                </label>
                <label class="form__field">
                    <span>"Password"</span>
                    <input
                        class="input"
                        type="password"
                        placeholder="••••••••"
                        autocomplete="current-password"
                        prop:value=move || credentials.with(|c| c.password.clone())
                        on:input=move |ev| {
                            let v = event_target_value(&ev);
                            credentials.update(|c| c.password = v)
                        }
                    />
                    <FieldMessage errors field="password"/>
                </label>
                <button type="submit" class="button button--wide" prop:disabled=move || busy.get()>
                    {move || if busy.get() { "Please wait..." } else { "Sign In" }}
                </button>
                <button
                    type="button"
                    class="button button--ghost button--wide"
                    prop:disabled=move || busy.get()
                    on:click=move |_| run(Action::SignUp)
                >
                    "Don't have an account? Sign Up"
                </button>
            </form>

            {move || auth_error.get().map(|message| view! { <p class="field-error">{message}</p> })}

            <div class="divider">"or"</div>
            <button
                class="button button--ghost button--wide"
                prop:disabled=move || busy.get()
                on:click=move |_| run(Action::Guest)
            >
                "Continue as guest"
            </button>
        </div>
    }
}
