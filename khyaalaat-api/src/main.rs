use axum::{
    extract::{multipart::MultipartError, ConnectInfo, DefaultBodyLimit, Multipart, Request},
    response::Redirect,
    routing::{get, post},
    Router,
};
use khyaalaat_app::config::AppConfig;
use khyaalaat_app::domain::{ImageUpload, Poem, PoemUploadForm, WriteOutcome, MAX_IMAGE_BYTES};
use khyaalaat_app::infrastructure::session::load_user;
use khyaalaat_app::{AppContext, ClientAddr};
use khyaalaat_errors::{AppError, FieldErrors};
use khyaalaat_ui::api::{
    AddCommentFn, CurrentViewerFn, DeleteCommentFn, DeletePoemFn, DeleteRequestFn, GetAppModeFn,
    ListPoemsFn, ListRequestsFn, SetRequestCompletedFn, SignInAsGuestFn, SignInFn, SignOutFn,
    SignUpFn, SubmitRequestFn, SuggestTopicsFn, ToggleLikeFn,
};
use khyaalaat_ui::App;
use leptos::prelude::*;
use leptos_axum::{generate_route_list, handle_server_fns_with_context, LeptosRoutes};
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

/// Room for the image plus the text fields of the upload form.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;
const UPLOAD_PAGE: &str = "/admin/upload";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let conf = get_configuration(Some("Cargo.toml")).expect("Failed to load Leptos config");
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;

    let app_context = match AppContext::from_config(AppConfig::from_env()).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let routes = generate_route_list(App);

    server_fn::axum::register_explicit::<GetAppModeFn>();
    server_fn::axum::register_explicit::<CurrentViewerFn>();
    server_fn::axum::register_explicit::<SignInFn>();
    server_fn::axum::register_explicit::<SignUpFn>();
    server_fn::axum::register_explicit::<SignInAsGuestFn>();
    server_fn::axum::register_explicit::<SignOutFn>();
    server_fn::axum::register_explicit::<ListPoemsFn>();
    server_fn::axum::register_explicit::<ToggleLikeFn>();
    server_fn::axum::register_explicit::<AddCommentFn>();
    server_fn::axum::register_explicit::<DeleteCommentFn>();
    server_fn::axum::register_explicit::<DeletePoemFn>();
    server_fn::axum::register_explicit::<SubmitRequestFn>();
    server_fn::axum::register_explicit::<ListRequestsFn>();
    server_fn::axum::register_explicit::<SetRequestCompletedFn>();
    server_fn::axum::register_explicit::<DeleteRequestFn>();
    server_fn::axum::register_explicit::<SuggestTopicsFn>();
    tracing::info!("Registered server functions");

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(7)));

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            UPLOAD_PAGE,
            post({
                let ctx = app_context.clone();
                move |session: Session, multipart: Multipart| {
                    let ctx = ctx.clone();
                    async move { handle_upload(ctx, session, multipart).await }
                }
            })
            .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/{*fn_name}", post({
            let ctx = app_context.clone();
            move |session: Session, ConnectInfo(client): ConnectInfo<SocketAddr>, req: Request| {
                let ctx = ctx.clone();
                async move {
                    handle_server_fns_with_context(
                        move || {
                            provide_context(ctx.clone());
                            provide_context(session.clone());
                            provide_context(ClientAddr(client.ip()));
                        },
                        req,
                    )
                    .await
                }
            }
        }))
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            {
                let ctx = app_context.clone();
                move || provide_context(ctx.clone())
            },
            {
                let leptos_options = leptos_options.clone();
                move || shell(leptos_options.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .layer(session_layer)
        .layer(CompressionLayer::new())
        .with_state(leptos_options);

    let mode = app_context.mode();
    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        demo = mode.demo,
        suggestions = mode.suggestions_enabled,
        "Request submissions limited to 3/min and 10/hour per client"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}

/// Multipart upload from the admin form. Answers with a redirect back to the
/// form carrying the outcome in the query string.
async fn handle_upload(ctx: AppContext, session: Session, multipart: Multipart) -> Redirect {
    let result = upload(&ctx, &session, multipart).await;
    match &result {
        Ok(WriteOutcome::Stored(poem)) => tracing::info!(poem = %poem.id, "Poem uploaded"),
        Ok(WriteOutcome::Skipped) => {}
        Err(e) => tracing::warn!("Upload failed: {}", e),
    }
    Redirect::to(&upload_redirect(&result))
}

async fn upload(
    ctx: &AppContext,
    session: &Session,
    multipart: Multipart,
) -> Result<WriteOutcome<Poem>, AppError> {
    let identity = load_user(session).await?.map(|user| user.identity);
    ctx.poetry.authorize_upload(identity.as_ref())?;
    let (form, image) = read_upload_form(multipart).await?;
    ctx.poetry.upload_poem(identity.as_ref(), &form, image).await
}

async fn read_upload_form(
    mut multipart: Multipart,
) -> Result<(PoemUploadForm, Option<ImageUpload>), AppError> {
    let mut form = PoemUploadForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(unreadable)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(unreadable)?;
                if !bytes.is_empty() {
                    image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" => form.title = field.text().await.map_err(unreadable)?,
            "caption" => form.caption = field.text().await.map_err(unreadable)?,
            "poem" => form.poem = field.text().await.map_err(unreadable)?,
            "genre" => form.genre = field.text().await.map_err(unreadable)?,
            _ => {}
        }
    }

    Ok((form, image))
}

fn unreadable(e: MultipartError) -> AppError {
    tracing::warn!("Malformed upload: {}", e.body_text());
    FieldErrors::single(
        "image",
        "The upload could not be read. Images must be 5 MB or smaller.",
    )
    .into()
}

fn upload_redirect(result: &Result<WriteOutcome<Poem>, AppError>) -> String {
    match result {
        Ok(WriteOutcome::Stored(_)) => format!("{UPLOAD_PAGE}?status=uploaded"),
        Ok(WriteOutcome::Skipped) => format!("{UPLOAD_PAGE}?status=demo"),
        Err(AppError::Unauthorized(_)) => "/login".to_string(),
        Err(e) => format!(
            "{UPLOAD_PAGE}?error={}",
            urlencoding::encode(e.user_message())
        ),
    }
}

const CSS: &str = r#"
:root {
    --base: #faf4ed;
    --surface: #fffaf3;
    --overlay: #f2e9e1;
    --muted: #9893a5;
    --subtle: #797593;
    --text: #575279;
    --love: #b4637a;
    --gold: #ea9d34;
    --pine: #286983;
    --foam: #56949f;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: 'Inter', -apple-system, sans-serif;
    background: var(--base);
    color: var(--text);
    min-height: 100vh;
}
.container { max-width: 1100px; margin: 0 auto; padding: 5.5rem 1.5rem 2rem; }
.header { position: fixed; top: 0; left: 0; right: 0; z-index: 50; background: var(--surface); border-bottom: 1px solid var(--overlay); }
.header__inner { max-width: 1100px; margin: 0 auto; display: flex; align-items: center; justify-content: space-between; height: 4rem; padding: 0 1.5rem; gap: 1rem; }
.header__brand { font-size: 1.25rem; font-weight: 800; color: var(--love); text-decoration: none; }
.header__nav { display: flex; gap: 1rem; }
.header__nav a { color: var(--subtle); text-decoration: none; }
.header__nav a[aria-current] { color: var(--pine); font-weight: 600; }
.auth-button { display: flex; align-items: center; gap: 0.5rem; }
.auth-button--loading { width: 6rem; height: 2.25rem; border-radius: 8px; background: var(--overlay); }
.hero { text-align: center; padding: 1.5rem 0 2rem; }
.hero__title { font-size: clamp(2rem, 5vw, 3.5rem); color: var(--love); font-weight: 800; margin-bottom: 0.75rem; }
.hero__subtitle { color: var(--subtle); font-size: 1.1rem; max-width: 560px; margin: 0 auto; }
.demo-banner { background: #e8f1fb; border: 1px solid #b9d3ee; color: #1f4e79; border-radius: 8px; padding: 0.75rem 1rem; margin-bottom: 1.5rem; }
.button { display: inline-block; padding: 0.6rem 1.2rem; background: var(--pine); color: var(--base); border: none; border-radius: 8px; font-size: 0.95rem; font-weight: 600; cursor: pointer; text-decoration: none; }
.button:disabled { background: var(--muted); cursor: not-allowed; }
.button--ghost { background: transparent; color: var(--pine); }
.button--danger { background: var(--love); }
.button--wide { width: 100%; margin-top: 0.75rem; }
.input { width: 100%; padding: 0.7rem 0.9rem; border: 2px solid var(--overlay); border-radius: 8px; background: var(--surface); color: var(--text); font: inherit; }
.input:focus { outline: none; border-color: var(--pine); }
.input--tall { min-height: 10rem; }
.card { background: var(--surface); border: 2px solid var(--overlay); border-radius: 12px; padding: 1.5rem; margin: 0 auto 1.5rem; max-width: 720px; }
.card--success { border-color: var(--foam); text-align: center; }
.card__title { font-size: 1.3rem; color: var(--love); margin-bottom: 1rem; }
.card__subtitle { color: var(--subtle); margin-bottom: 1rem; }
.form { display: flex; flex-direction: column; gap: 1.1rem; }
.form--narrow { max-width: 420px; }
.form__field { display: flex; flex-direction: column; gap: 0.35rem; font-weight: 600; }
.form__row { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 1.1rem; }
.field-error { color: var(--love); font-size: 0.85rem; font-weight: 400; }
.divider { text-align: center; color: var(--muted); margin: 1rem 0 0.25rem; }
.poems { columns: 1; column-gap: 1.5rem; }
@media (min-width: 720px) { .poems { columns: 2; } }
@media (min-width: 1024px) { .poems { columns: 3; } }
.poems__empty { text-align: center; color: var(--muted); }
.poem-card { break-inside: avoid; background: var(--surface); border: 2px solid var(--overlay); border-radius: 12px; overflow: hidden; margin-bottom: 1.5rem; }
.poem-card__image { position: relative; }
.poem-card__image img { display: block; width: 100%; height: auto; }
.poem-card__genre { position: absolute; top: 0.75rem; right: 0.75rem; background: var(--pine); color: var(--base); padding: 0.2rem 0.7rem; border-radius: 999px; font-size: 0.8rem; }
.poem-card__body { padding: 1rem 1.25rem 1.25rem; }
.poem-card__title { font-size: 1.25rem; color: var(--love); }
.poem-card__caption { color: var(--subtle); margin-top: 0.35rem; }
.poem-card__text { white-space: pre-wrap; line-height: 1.8; margin-top: 0.75rem; }
.poem-card__actions { display: flex; align-items: center; gap: 0.5rem; margin: 0.75rem 0; }
.like-button { display: inline-flex; gap: 0.35rem; align-items: center; border: 1px solid var(--overlay); background: transparent; border-radius: 999px; padding: 0.3rem 0.8rem; cursor: pointer; color: var(--text); }
.like-button--liked { color: var(--love); border-color: var(--love); }
.like-button:disabled { opacity: 0.6; cursor: wait; }
.comments { border-top: 1px solid var(--overlay); padding-top: 0.75rem; }
.comments__title { font-size: 0.95rem; margin-bottom: 0.5rem; }
.comments__empty { color: var(--muted); font-size: 0.9rem; text-align: center; }
.comments__list { list-style: none; display: flex; flex-direction: column; gap: 0.5rem; margin-bottom: 0.75rem; }
.comment { background: var(--base); border-radius: 8px; padding: 0.5rem 0.75rem; }
.comment--pending { opacity: 0.6; }
.comment__author { font-weight: 600; font-size: 0.85rem; }
.comment__delete { background: none; border: none; color: var(--love); cursor: pointer; font-size: 0.8rem; }
.comments__form { display: flex; gap: 0.5rem; }
.requests { width: 100%; border-collapse: collapse; background: var(--surface); border-radius: 12px; overflow: hidden; }
.requests th, .requests td { padding: 0.75rem; text-align: left; border-bottom: 1px solid var(--overlay); }
.requests__row--completed { color: var(--muted); background: var(--base); }
.requests__date { text-align: right; }
.requests__empty { text-align: center; color: var(--muted); height: 6rem; }
.badge { background: var(--overlay); padding: 0.15rem 0.6rem; border-radius: 999px; font-size: 0.85rem; }
.suggestions__list { list-style: none; display: flex; flex-wrap: wrap; gap: 0.5rem; margin-top: 0.5rem; }
.suggestions__item { border: 1px solid var(--foam); background: transparent; color: var(--pine); border-radius: 999px; padding: 0.3rem 0.8rem; cursor: pointer; }
.loading { display: flex; flex-direction: column; align-items: center; padding: 3rem; }
.loading__spinner {
    width: 50px; height: 50px; border: 4px solid var(--overlay);
    border-top-color: var(--gold); border-radius: 50%; animation: spin 1s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }
.loading__text { margin-top: 1rem; color: var(--subtle); font-style: italic; }
.error { background: #fce8ec; border: 2px solid var(--love); border-radius: 8px; padding: 1.25rem; margin: 0 auto 1.5rem; max-width: 720px; }
.error__title { color: var(--love); font-weight: 700; margin-bottom: 0.5rem; }
.error__message { color: #8b3d4d; }
.error__retry { margin-top: 1rem; padding: 0.5rem 1rem; background: var(--love); color: var(--base); border: none; border-radius: 4px; cursor: pointer; }
.toasts { position: fixed; bottom: 1rem; right: 1rem; display: flex; flex-direction: column; gap: 0.5rem; z-index: 100; max-width: 360px; }
.toast { position: relative; background: var(--surface); border: 2px solid var(--foam); border-radius: 8px; padding: 0.75rem 2rem 0.75rem 1rem; box-shadow: 0 4px 12px rgba(0, 0, 0, 0.08); }
.toast--error { border-color: var(--love); }
.toast__title { font-weight: 700; }
.toast__close { position: absolute; top: 0.4rem; right: 0.6rem; background: none; border: none; cursor: pointer; color: var(--muted); }
.not-found { text-align: center; color: var(--muted); padding: 3rem 0; }
"#;

fn shell(options: LeptosOptions) -> impl IntoView {
    use leptos_meta::MetaTags;

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🪶</text></svg>"/>
                <style>{CSS}</style>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_outcomes_map_to_redirects() {
        assert_eq!(
            upload_redirect(&Ok(WriteOutcome::Skipped)),
            "/admin/upload?status=demo"
        );
        assert_eq!(
            upload_redirect(&Err(AppError::Unauthorized("no session".into()))),
            "/login"
        );
        assert_eq!(
            upload_redirect(&Err(FieldErrors::single("title", "Title must be at least 2 characters.").into())),
            "/admin/upload?error=Title%20must%20be%20at%20least%202%20characters."
        );
    }
}
