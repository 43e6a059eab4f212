use crate::api::{add_comment, delete_comment, into_app_error};
use crate::components::FieldMessage;
use crate::state::{AuthState, Notifier};
use khyaalaat_app::domain::{validate_comment, Comment, WriteOutcome, MAX_COMMENT_CHARS};
use khyaalaat_app::reconcile::{
    AddOutcome, CommentKey, CommentThread, DeleteIntent, MutationKind, Notice, TempId,
};
use khyaalaat_errors::FieldErrors;
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

/// Puts a failed comment back into the input unless the user already typed
/// something new. The section may be gone by the time the server answers.
fn restore_draft(draft: RwSignal<String>, text: String) -> bool {
    draft
        .try_update(|d| {
            if d.is_empty() {
                *d = text;
            }
        })
        .is_some()
}

#[component]
pub fn CommentSection(poem_id: Uuid, thread: RwSignal<CommentThread>) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let notifier = expect_context::<Notifier>();
    let draft = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());

    let finish_add = move |temp: TempId, text: String| {
        spawn_local(async move {
            match add_comment(poem_id, text.clone()).await.map_err(into_app_error) {
                Ok(WriteOutcome::Stored(comment)) => {
                    let outcome = thread
                        .try_update(|t| t.confirm_add(temp, comment))
                        .unwrap_or(AddOutcome::Confirmed);
                    if let AddOutcome::Orphaned(id) = outcome {
                        // Deleted while still saving; remove the row that just landed.
                        if let Err(e) = delete_comment(poem_id, id).await {
                            tracing::warn!("Could not remove cancelled comment {}: {}", id, e);
                        }
                    }
                }
                Ok(WriteOutcome::Skipped) => {
                    let author = auth.user_info();
                    thread.try_update(|t| match author {
                        Some(author) => {
                            t.confirm_add(
                                temp,
                                Comment {
                                    id: Uuid::new_v4(),
                                    text,
                                    author,
                                    created_at: None,
                                },
                            );
                        }
                        None => t.fail_add(temp),
                    });
                }
                Err(e) => {
                    thread.try_update(|t| t.fail_add(temp));
                    restore_draft(draft, text);
                    notifier.failure(MutationKind::AddComment, &e);
                }
            }
        });
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Some(author) = auth.user_info() else {
            notifier.push(Notice::sign_in_required());
            return;
        };
        let text = match validate_comment(&draft.get_untracked()) {
            Ok(text) => text,
            Err(e) => {
                errors.set(e);
                return;
            }
        };
        errors.set(FieldErrors::new());
        draft.set(String::new());

        if let Some(temp) = thread.try_update(|t| t.begin_add(text.clone(), author)) {
            finish_add(temp, text);
        }
    };

    let remove = move |key: CommentKey| {
        let Some(DeleteIntent::Remote(pending)) = thread.try_update(|t| t.begin_delete(key)) else {
            return;
        };
        spawn_local(async move {
            match delete_comment(poem_id, pending.comment_id()).await.map_err(into_app_error) {
                Ok(_) => {
                    thread.try_update(|t| t.finish_delete(pending));
                }
                Err(e) => {
                    thread.try_update(|t| t.fail_delete(pending));
                    notifier.failure(MutationKind::DeleteComment, &e);
                }
            }
        });
    };

    let entries = move || {
        thread.with(|t| {
            t.visible()
                .map(|entry| {
                    let key = entry.key();
                    let author = entry.author().clone();
                    let can_delete = auth.can_delete_comment(author.id);
                    view! {
                        <li class="comment" class:comment--pending=entry.is_pending()>
                            <span class="comment__author">{author.display_name().to_string()}</span>
                            <p class="comment__text">{entry.text().to_string()}</p>
                            {can_delete.then(|| view! {
                                <button
                                    class="comment__delete"
                                    aria-label="Delete comment"
                                    on:click=move |_| remove(key)
                                >
                                    "Delete"
                                </button>
                            })}
                        </li>
                    }
                })
                .collect::<Vec<_>>()
        })
    };

    view! {
        <section class="comments">
            <h3 class="comments__title">
                "Comments (" {move || thread.with(CommentThread::len)} ")"
            </h3>
            <Show
                when=move || !thread.with(CommentThread::is_empty)
                fallback=|| view! { <p class="comments__empty">"No comments yet."</p> }
            >
                <ul class="comments__list">{entries}</ul>
            </Show>
            <form class="comments__form" on:submit=on_submit>
                <input
                    type="text"
                    class="input"
                    placeholder="Add a comment..."
                    maxlength=MAX_COMMENT_CHARS.to_string()
                    prop:value=move || draft.get()
                    on:input=move |ev| draft.set(event_target_value(&ev))
                />
                <button type="submit" class="button">"Post"</button>
            </form>
            <FieldMessage errors field="comment"/>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::reactive::owner::Owner;

    #[test]
    fn failed_comment_returns_to_an_empty_draft_only() {
        Owner::new().with(|| {
            let draft = RwSignal::new(String::new());
            assert!(restore_draft(draft, "So moving".into()));
            assert_eq!(draft.get_untracked(), "So moving");

            draft.set("Second thought".into());
            restore_draft(draft, "So moving".into());
            assert_eq!(draft.get_untracked(), "Second thought");
        });
    }

    #[test]
    fn restoring_into_an_unmounted_section_is_dropped() {
        let owner = Owner::new();
        let draft = owner.with(|| RwSignal::new(String::new()));
        owner.cleanup();
        assert!(!restore_draft(draft, "So moving".into()));
    }
}
