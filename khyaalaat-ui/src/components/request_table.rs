use crate::api::{delete_request, into_app_error, set_request_completed};
use crate::state::{AuthState, CellCache, Notifier};
use khyaalaat_app::domain::{PoemRequest, WriteOutcome};
use khyaalaat_app::reconcile::{MutationKind, Optimistic};
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

/// Optimistic state of one request row.
#[derive(Clone, Copy)]
pub struct RequestCell {
    row: RwSignal<Optimistic<PoemRequest>>,
    removed: RwSignal<bool>,
}

impl RequestCell {
    fn for_request(cache: &CellCache<Uuid, RequestCell>, request: &PoemRequest) -> Self {
        cache.get_or_create(
            request.id,
            || RequestCell {
                row: RwSignal::new(Optimistic::new(request.clone())),
                removed: RwSignal::new(false),
            },
            |cell| {
                cell.row.update(|c| {
                    c.refresh(request.clone());
                });
            },
        )
    }
}

#[component]
pub fn RequestTable(requests: Vec<PoemRequest>, cells: CellCache<Uuid, RequestCell>) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let empty = requests.is_empty();

    view! {
        <table class="requests">
            <thead>
                <tr>
                    <Show when=move || auth.is_admin()>
                        <th class="requests__done">"Done"</th>
                    </Show>
                    <th>"Requester"</th>
                    <th>"Topic"</th>
                    <th>"Genre"</th>
                    <th>"Mood"</th>
                    <th class="requests__date">"Date"</th>
                    <Show when=move || auth.is_admin()>
                        <th class="requests__delete">"Delete"</th>
                    </Show>
                </tr>
            </thead>
            <tbody>
                {requests
                    .into_iter()
                    .map(|request| {
                        let cell = RequestCell::for_request(&cells, &request);
                        view! { <RequestRow request cell/> }
                    })
                    .collect::<Vec<_>>()}
                {empty.then(|| view! {
                    <tr>
                        <td class="requests__empty" colspan="7">"No requests yet."</td>
                    </tr>
                })}
            </tbody>
        </table>
    }
}

#[component]
fn RequestRow(request: PoemRequest, cell: RequestCell) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let notifier = expect_context::<Notifier>();
    let id = request.id;
    let date = request.created_at.format("%b %-d, %Y").to_string();
    let name = request.name.clone();
    let topic = request.topic.clone();
    let genre = request.genre.as_str();
    let mood = request.mood.clone();
    let RequestCell { row, removed } = cell;

    let toggle_completed = move |_| {
        let Some(Ok(())) = row.try_update(|cell| cell.begin(|r| r.completed = !r.completed)) else {
            return;
        };
        let completed = row.with_untracked(|cell| cell.current().completed);

        spawn_local(async move {
            let result = set_request_completed(id, completed).await.map_err(into_app_error);
            let settled = row.try_update(|cell| match result {
                Ok(WriteOutcome::Stored(canonical)) => cell.settle(Ok(canonical)),
                Ok(WriteOutcome::Skipped) => {
                    let local = cell.current().clone();
                    cell.settle(Ok(local))
                }
                Err(e) => cell.settle(Err(e)),
            });
            if let Some(Err(e)) = settled {
                notifier.failure(MutationKind::ToggleCompleted, &e);
            }
        });
    };

    let remove = move |_| {
        removed.set(true);
        spawn_local(async move {
            match delete_request(id).await.map_err(into_app_error) {
                Ok(WriteOutcome::Stored(())) => notifier.success("Request deleted", "The request has been removed."),
                Ok(WriteOutcome::Skipped) => {
                    removed.try_set(false);
                    notifier.demo_skipped();
                }
                Err(e) => {
                    removed.try_set(false);
                    notifier.failure(MutationKind::DeleteRequest, &e);
                }
            }
        });
    };

    let completed = move || row.with(|cell| cell.current().completed);

    view! {
        <Show when=move || !removed.get()>
            <tr class="requests__row" class:requests__row--completed=completed>
                <Show when=move || auth.is_admin()>
                    <td>
                        <input
                            type="checkbox"
                            aria-label="Mark as completed"
                            prop:checked=completed
                            prop:disabled=move || row.with(|cell| cell.is_pending())
                            on:change=toggle_completed
                        />
                    </td>
                </Show>
                <td class="requests__name">{name.clone()}</td>
                <td>{topic.clone()}</td>
                <td><span class="badge">{genre}</span></td>
                <td>{mood.clone()}</td>
                <td class="requests__date">{date.clone()}</td>
                <Show when=move || auth.is_admin()>
                    <td>
                        <button class="button button--danger" aria-label="Delete request" on:click=remove>
                            "Delete"
                        </button>
                    </td>
                </Show>
            </tr>
        </Show>
    }
}
