//! Server functions. Each one runs on the server with the `AppContext`, the
//! visitor's `Session` and their `ClientAddr` provided as Leptos context.

use khyaalaat_app::domain::{
    AppMode, AuthOutcome, Comment, Credentials, LikeSummary, PoemListing, PoemRequest,
    PoemRequestForm, TopicIdea, Viewer, WriteOutcome,
};
use khyaalaat_errors::AppError;
use leptos::prelude::*;
use server_fn::ServerFnError;
use uuid::Uuid;

/// Recovers the typed error from a failed server function call.
pub fn into_app_error(error: ServerFnError) -> AppError {
    match error {
        ServerFnError::ServerError(message) => match message.parse::<AppError>() {
            Ok(error) => error,
            Err(never) => match never {},
        },
        other => AppError::Backend(other.to_string()),
    }
}

#[cfg(feature = "ssr")]
mod backend {
    use khyaalaat_app::application::AuthResult;
    use khyaalaat_app::domain::{AuthOutcome, UserIdentity};
    use khyaalaat_app::infrastructure::session::{load_user, store_user, SessionUser};
    use khyaalaat_app::{AppContext, ClientAddr};
    use khyaalaat_errors::AppError;
    use leptos::prelude::*;
    use server_fn::ServerFnError;
    use std::net::{IpAddr, Ipv4Addr};
    use tower_sessions::Session;

    pub fn fail(error: AppError) -> ServerFnError {
        match error.kind() {
            khyaalaat_errors::ErrorKind::Internal => tracing::error!("Server function failed: {}", error),
            _ => tracing::warn!("Server function refused: {}", error),
        }
        ServerFnError::new(error)
    }

    pub fn app() -> Result<AppContext, ServerFnError> {
        use_context::<AppContext>()
            .ok_or_else(|| fail(AppError::Internal("application context missing".to_string())))
    }

    pub fn session() -> Result<Session, ServerFnError> {
        use_context::<Session>()
            .ok_or_else(|| fail(AppError::Internal("session missing".to_string())))
    }

    pub fn client_addr() -> IpAddr {
        use_context::<ClientAddr>()
            .map(|ClientAddr(ip)| ip)
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    /// The signed-in user, if the session holds one.
    pub async fn identity() -> Result<Option<UserIdentity>, ServerFnError> {
        let Some(session) = use_context::<Session>() else {
            return Ok(None);
        };
        let user = load_user(&session).await.map_err(fail)?;
        Ok(user.map(|u| u.identity))
    }

    /// Stores a fresh provider session and tells the browser who signed in.
    pub async fn finish_sign_in(
        ctx: &AppContext,
        result: AuthResult,
    ) -> Result<AuthOutcome, ServerFnError> {
        match result {
            AuthResult::Session(auth) => {
                let identity = auth.user.clone();
                store_user(&session()?, &SessionUser::from(auth))
                    .await
                    .map_err(fail)?;
                Ok(AuthOutcome::SignedIn(ctx.auth.viewer(identity)))
            }
            AuthResult::ConfirmationSent => Ok(AuthOutcome::ConfirmationSent),
            AuthResult::Demo => Ok(AuthOutcome::DemoMode),
        }
    }
}

#[server(GetAppModeFn, "/api", endpoint = "app_mode")]
pub async fn get_app_mode() -> Result<AppMode, ServerFnError> {
    Ok(backend::app()?.mode())
}

#[server(CurrentViewerFn, "/api", endpoint = "current_viewer")]
pub async fn current_viewer() -> Result<Option<Viewer>, ServerFnError> {
    use khyaalaat_app::infrastructure::session::{clear_user, load_user, update_user};
    use backend::fail;

    let ctx = backend::app()?;
    let Some(session) = use_context::<tower_sessions::Session>() else {
        return Ok(None);
    };
    let Some(stored) = load_user(&session).await.map_err(fail)? else {
        return Ok(None);
    };

    match ctx.auth.restore(stored.clone()).await.map_err(fail)? {
        Some(user) => {
            if user != stored {
                update_user(&session, &user).await.map_err(fail)?;
            }
            Ok(Some(ctx.auth.viewer(user.identity)))
        }
        None => {
            clear_user(&session).await.map_err(fail)?;
            Ok(None)
        }
    }
}

#[server(SignInFn, "/api", endpoint = "sign_in")]
pub async fn sign_in(credentials: Credentials) -> Result<AuthOutcome, ServerFnError> {
    let ctx = backend::app()?;
    let result = ctx.auth.sign_in(&credentials).await.map_err(backend::fail)?;
    backend::finish_sign_in(&ctx, result).await
}

#[server(SignUpFn, "/api", endpoint = "sign_up")]
pub async fn sign_up(credentials: Credentials) -> Result<AuthOutcome, ServerFnError> {
    let ctx = backend::app()?;
    let result = ctx.auth.sign_up(&credentials).await.map_err(backend::fail)?;
    backend::finish_sign_in(&ctx, result).await
}

#[server(SignInAsGuestFn, "/api", endpoint = "sign_in_guest")]
pub async fn sign_in_as_guest() -> Result<AuthOutcome, ServerFnError> {
    let ctx = backend::app()?;
    let result = ctx.auth.sign_in_as_guest().await.map_err(backend::fail)?;
    backend::finish_sign_in(&ctx, result).await
}

#[server(SignOutFn, "/api", endpoint = "sign_out")]
pub async fn sign_out() -> Result<(), ServerFnError> {
    use khyaalaat_app::infrastructure::session::{clear_user, load_user};
    use backend::fail;

    let ctx = backend::app()?;
    let session = backend::session()?;
    if let Some(stored) = load_user(&session).await.map_err(fail)? {
        ctx.auth.sign_out(&stored.access_token).await;
        tracing::info!(user = %stored.identity.id, "Signed out");
    }
    clear_user(&session).await.map_err(fail)
}

#[server(ListPoemsFn, "/api", endpoint = "list_poems")]
pub async fn list_poems() -> Result<Vec<PoemListing>, ServerFnError> {
    let ctx = backend::app()?;
    let identity = backend::identity().await?;
    ctx.poetry
        .list_poems(identity.as_ref())
        .await
        .map_err(backend::fail)
}

#[server(ToggleLikeFn, "/api", endpoint = "toggle_like")]
pub async fn toggle_like(poem_id: Uuid) -> Result<WriteOutcome<LikeSummary>, ServerFnError> {
    let ctx = backend::app()?;
    let identity = backend::identity().await?;
    ctx.poetry
        .toggle_like(identity.as_ref(), poem_id)
        .await
        .map_err(backend::fail)
}

#[server(AddCommentFn, "/api", endpoint = "add_comment")]
pub async fn add_comment(poem_id: Uuid, text: String) -> Result<WriteOutcome<Comment>, ServerFnError> {
    let ctx = backend::app()?;
    let identity = backend::identity().await?;
    ctx.poetry
        .add_comment(identity.as_ref(), poem_id, &text)
        .await
        .map_err(backend::fail)
}

#[server(DeleteCommentFn, "/api", endpoint = "delete_comment")]
pub async fn delete_comment(poem_id: Uuid, comment_id: Uuid) -> Result<WriteOutcome<()>, ServerFnError> {
    let ctx = backend::app()?;
    let identity = backend::identity().await?;
    ctx.poetry
        .delete_comment(identity.as_ref(), poem_id, comment_id)
        .await
        .map_err(backend::fail)
}

#[server(DeletePoemFn, "/api", endpoint = "delete_poem")]
pub async fn delete_poem(poem_id: Uuid) -> Result<WriteOutcome<()>, ServerFnError> {
    let ctx = backend::app()?;
    let identity = backend::identity().await?;
    ctx.poetry
        .delete_poem(identity.as_ref(), poem_id)
        .await
        .map_err(backend::fail)
}

#[server(SubmitRequestFn, "/api", endpoint = "submit_request")]
pub async fn submit_request(form: PoemRequestForm) -> Result<WriteOutcome<PoemRequest>, ServerFnError> {
    let ctx = backend::app()?;
    ctx.requests
        .submit_request(&form, backend::client_addr())
        .await
        .map_err(backend::fail)
}

#[server(ListRequestsFn, "/api", endpoint = "list_requests")]
pub async fn list_requests() -> Result<Vec<PoemRequest>, ServerFnError> {
    let ctx = backend::app()?;
    ctx.requests.list_requests().await.map_err(backend::fail)
}

#[server(SetRequestCompletedFn, "/api", endpoint = "set_request_completed")]
pub async fn set_request_completed(
    id: Uuid,
    completed: bool,
) -> Result<WriteOutcome<PoemRequest>, ServerFnError> {
    let ctx = backend::app()?;
    let identity = backend::identity().await?;
    ctx.requests
        .set_request_completed(identity.as_ref(), id, completed)
        .await
        .map_err(backend::fail)
}

#[server(DeleteRequestFn, "/api", endpoint = "delete_request")]
pub async fn delete_request(id: Uuid) -> Result<WriteOutcome<()>, ServerFnError> {
    let ctx = backend::app()?;
    let identity = backend::identity().await?;
    ctx.requests
        .delete_request(identity.as_ref(), id)
        .await
        .map_err(backend::fail)
}

#[server(SuggestTopicsFn, "/api", endpoint = "suggest_topics")]
pub async fn suggest_topics(idea: TopicIdea) -> Result<Vec<String>, ServerFnError> {
    let ctx = backend::app()?;
    ctx.suggest_topics
        .execute(&idea, backend::client_addr())
        .await
        .map_err(backend::fail)
}
