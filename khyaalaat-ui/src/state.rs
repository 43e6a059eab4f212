use crate::api::{current_viewer, get_app_mode};
use khyaalaat_app::domain::{AppMode, UserInfo, Viewer};
use khyaalaat_app::reconcile::{MutationKind, Notice};
use khyaalaat_errors::AppError;
use leptos::prelude::*;
use leptos::reactive::owner::Owner;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use uuid::Uuid;

const TOAST_LIFETIME: Duration = Duration::from_secs(5);

/// Who is looking at the page. Built once in `App` and provided as context;
/// the session is checked from the browser after hydration.
#[derive(Clone, Copy)]
pub struct AuthState {
    viewer: RwSignal<Option<Viewer>>,
    loaded: RwSignal<bool>,
}

impl AuthState {
    pub fn new() -> Self {
        let state = Self {
            viewer: RwSignal::new(None),
            loaded: RwSignal::new(false),
        };

        let session = LocalResource::new(current_viewer);
        Effect::new(move |_| {
            if let Some(result) = session.get() {
                match result {
                    Ok(viewer) => state.viewer.set(viewer),
                    Err(e) => tracing::warn!("Session check failed: {}", e),
                }
                state.loaded.set(true);
            }
        });

        state
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.viewer.get()
    }

    pub fn set_viewer(&self, viewer: Option<Viewer>) {
        self.viewer.set(viewer);
        self.loaded.set(true);
    }

    /// True once the session check has answered.
    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    pub fn is_signed_in(&self) -> bool {
        self.viewer.with(Option::is_some)
    }

    pub fn is_admin(&self) -> bool {
        self.viewer.with(|v| v.as_ref().is_some_and(|v| v.is_admin))
    }

    pub fn viewer_id(&self) -> Option<Uuid> {
        self.viewer.with(|v| v.as_ref().map(|v| v.identity.id))
    }

    pub fn user_info(&self) -> Option<UserInfo> {
        self.viewer
            .with(|v| v.as_ref().map(|v| v.identity.to_user_info()))
    }

    pub fn can_delete_comment(&self, author: Uuid) -> bool {
        self.viewer
            .with(|v| v.as_ref().is_some_and(|v| v.is_admin || v.identity.id == author))
    }
}

/// Site-wide switches fetched from the server.
#[derive(Clone, Copy)]
pub struct SiteMode(pub Resource<AppMode>);

impl SiteMode {
    pub fn new() -> Self {
        Self(Resource::new(
            || (),
            |_| async {
                get_app_mode().await.unwrap_or(AppMode {
                    demo: false,
                    suggestions_enabled: false,
                })
            },
        ))
    }

    pub fn is_demo(&self) -> bool {
        self.0.get().is_some_and(|mode| mode.demo)
    }

    pub fn suggestions_enabled(&self) -> bool {
        self.0.get().is_some_and(|mode| mode.suggestions_enabled)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

/// Toast queue plus the two follow-ups a failure can ask for: going to the
/// login page and refetching stale listings.
#[derive(Clone, Copy)]
pub struct Notifier {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
    login_redirect: RwSignal<bool>,
    version: RwSignal<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
            login_redirect: RwSignal::new(false),
            version: RwSignal::new(0),
        }
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.get()
    }

    pub fn push(&self, notice: Notice) {
        if notice.redirect_to_login {
            self.login_redirect.set(true);
        }
        if notice.refetch {
            self.invalidate();
        }

        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.toasts.update(|t| t.push(Toast { id, notice }));

        let toasts = self.toasts;
        set_timeout(
            move || toasts.update(|t| t.retain(|toast| toast.id != id)),
            TOAST_LIFETIME,
        );
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|t| t.retain(|toast| toast.id != id));
    }

    pub fn success(&self, title: &str, description: impl Into<String>) {
        self.push(Notice::success(title, description));
    }

    pub fn failure(&self, kind: MutationKind, error: &AppError) {
        self.push(Notice::for_failure(kind, error));
    }

    pub fn demo_skipped(&self) {
        self.success("Demo mode", "Changes are not saved while the site shows sample data.");
    }

    /// Consumes a pending redirect to the login page.
    pub fn take_login_redirect(&self) -> bool {
        if self.login_redirect.get() {
            self.login_redirect.set(false);
            true
        } else {
            false
        }
    }

    /// Bumped whenever listings are known to be stale.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    pub fn invalidate(&self) {
        self.version.update(|v| *v += 1);
    }
}

/// Reactive cells that outlive the rows showing them. A listing refetch
/// rebuilds its rows and each row picks its cell up again by key, so a
/// mutation still in flight lands in the cell the new row displays.
pub struct CellCache<K, C> {
    owner: Owner,
    cells: StoredValue<HashMap<K, C>>,
}

impl<K, C> Clone for CellCache<K, C> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            cells: self.cells,
        }
    }
}

impl<K, C> CellCache<K, C>
where
    K: Eq + Hash + Send + Sync + 'static,
    C: Copy + Send + Sync + 'static,
{
    /// Cells are owned by the current reactive owner (the page).
    pub fn new() -> Self {
        Self {
            owner: Owner::current().unwrap_or_else(Owner::new),
            cells: StoredValue::new(HashMap::new()),
        }
    }

    /// Hands an existing cell to `refresh`, or builds one with `create`.
    pub fn get_or_create(&self, key: K, create: impl FnOnce() -> C, refresh: impl FnOnce(&C)) -> C {
        if let Some(cell) = self.cells.with_value(|cells| cells.get(&key).copied()) {
            refresh(&cell);
            return cell;
        }
        let cell = self.owner.with(create);
        self.cells.update_value(|cells| {
            cells.insert(key, cell);
        });
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_found_again_by_key() {
        Owner::new().with(|| {
            let cache = CellCache::<u32, RwSignal<i32>>::new();
            let first = cache.get_or_create(1, || RwSignal::new(0), |_| panic!("nothing cached yet"));
            first.set(5);

            let again = cache.get_or_create(
                1,
                || RwSignal::new(0),
                |cell| cell.update(|n| *n += 1),
            );
            assert_eq!(again.get_untracked(), 6);
            assert_eq!(first.get_untracked(), 6);

            let other = cache.get_or_create(2, || RwSignal::new(10), |_| panic!("new key"));
            assert_eq!(other.get_untracked(), 10);
        });
    }
}
