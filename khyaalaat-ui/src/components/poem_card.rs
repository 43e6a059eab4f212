use crate::api::{delete_poem, into_app_error};
use crate::components::{CommentSection, LikeButton};
use crate::state::{AuthState, CellCache, Notifier};
use khyaalaat_app::domain::{PoemListing, WriteOutcome};
use khyaalaat_app::reconcile::{CommentThread, LikeState, MutationKind, Optimistic};
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

/// Optimistic state of one card.
#[derive(Clone, Copy)]
pub struct PoemCell {
    pub like: RwSignal<Optimistic<LikeState>>,
    pub thread: RwSignal<CommentThread>,
}

impl PoemCell {
    /// The card's cell, reconciled with freshly listed data when it already
    /// exists.
    pub fn for_listing(cache: &CellCache<Uuid, PoemCell>, listing: &PoemListing) -> Self {
        let like = LikeState::from_summary(&listing.like);
        let comments = &listing.poem.comments;
        cache.get_or_create(
            listing.poem.id,
            || PoemCell {
                like: RwSignal::new(Optimistic::new(like)),
                thread: RwSignal::new(CommentThread::new(comments.clone())),
            },
            |cell| {
                cell.like.update(|c| {
                    c.refresh(like);
                });
                cell.thread.update(|t| t.reconcile(comments.clone()));
            },
        )
    }
}

#[component]
pub fn PoemCard(listing: PoemListing, cell: PoemCell) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let notifier = expect_context::<Notifier>();
    let PoemListing { poem, .. } = listing;
    let poem_id = poem.id;
    let title = poem.title.clone();
    let body = poem.body;
    let image = poem.image;

    let expanded = RwSignal::new(false);
    let deleting = RwSignal::new(false);

    let on_delete = move |_| {
        let title = title.clone();
        deleting.set(true);
        spawn_local(async move {
            let result = delete_poem(poem_id).await.map_err(into_app_error);
            deleting.try_set(false);
            match result {
                Ok(WriteOutcome::Stored(())) => {
                    notifier.success("Poem Deleted", format!("\"{title}\" has been successfully deleted."));
                    notifier.invalidate();
                }
                Ok(WriteOutcome::Skipped) => notifier.demo_skipped(),
                Err(e) => notifier.failure(MutationKind::DeletePoem, &e),
            }
        });
    };

    view! {
        <article class="poem-card">
            <figure class="poem-card__image">
                <img src=image.url alt=image.description title=image.hint loading="lazy"/>
                <span class="poem-card__genre">{poem.genre.as_str()}</span>
            </figure>
            <div class="poem-card__body">
                <h2 class="poem-card__title">{poem.title}</h2>
                {poem.caption.map(|caption| view! { <p class="poem-card__caption">{caption}</p> })}
                <Show when=move || expanded.get()>
                    <p class="poem-card__text">{body.clone()}</p>
                </Show>
                <div class="poem-card__actions">
                    <LikeButton poem_id like=cell.like/>
                    <button class="button button--ghost" on:click=move |_| expanded.update(|e| *e = !*e)>
                        {move || if expanded.get() { "Hide poem" } else { "Read poem" }}
                    </button>
                    <Show when=move || auth.is_admin()>
                        <button
                            class="button button--danger"
                            prop:disabled=move || deleting.get()
                            on:click=on_delete.clone()
                        >
                            "Delete"
                        </button>
                    </Show>
                </div>
                <CommentSection poem_id thread=cell.thread/>
            </div>
        </article>
    }
}
