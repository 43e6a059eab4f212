use crate::api::{into_app_error, toggle_like};
use crate::state::{AuthState, Notifier};
use khyaalaat_app::domain::WriteOutcome;
use khyaalaat_app::reconcile::{LikeState, MutationKind, Notice, Optimistic};
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

#[component]
pub fn LikeButton(poem_id: Uuid, like: RwSignal<Optimistic<LikeState>>) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let notifier = expect_context::<Notifier>();

    let on_click = move |_| {
        if !auth.is_signed_in() {
            notifier.push(Notice::sign_in_required());
            return;
        }
        let started = like
            .try_update(|cell| cell.begin(LikeState::toggle).is_ok())
            .unwrap_or(false);
        if !started {
            return;
        }

        spawn_local(async move {
            let result = toggle_like(poem_id).await.map_err(into_app_error);
            let settled = like.try_update(|cell| match result {
                Ok(WriteOutcome::Stored(summary)) => cell.settle(Ok(LikeState::from_summary(&summary))),
                Ok(WriteOutcome::Skipped) => {
                    let local = *cell.current();
                    cell.settle(Ok(local))
                }
                Err(e) => cell.settle(Err(e)),
            });
            if let Some(Err(e)) = settled {
                notifier.failure(MutationKind::Like, &e);
            }
        });
    };

    let state = move || like.with(|cell| *cell.current());

    view! {
        <button
            class="like-button"
            class:like-button--liked=move || state().liked
            prop:disabled=move || like.with(|cell| cell.is_pending())
            aria-label="Like"
            on:click=on_click
        >
            <span class="like-button__heart">{move || if state().liked { "♥" } else { "♡" }}</span>
            <span class="like-button__count">{move || state().count}</span>
        </button>
    }
}
