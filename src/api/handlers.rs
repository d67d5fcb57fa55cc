//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{
    ChatRequest, EndSessionResponse, ErrorResponse, I18nResponse, ModelInfo, ModelsResponse,
    SessionView, TurnResponse,
};
use super::AppState;
use crate::i18n::{Locale, Translations};
use crate::llm::all_models;
use crate::session::{try_acquire, SessionError, SettingsError, SettingsUpdate};
use crate::state_machine::TransitionError;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

/// Cookie holding the session id
pub const SESSION_COOKIE: &str = "chatbot_session";

/// File name of the "Save" download
pub const DOWNLOAD_NAME: &str = "gpt_chatbots.json";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the page
        .route("/", get(serve_index))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/session", get(get_session).delete(end_session))
        .route("/api/session/settings", put(update_settings))
        // User actions
        .route("/api/session/chat", post(send_chat))
        .route("/api/session/clear", post(clear_session))
        .route("/api/session/download", get(download_transcript))
        // Pickers
        .route("/api/models", get(list_models))
        .route("/api/i18n/:locale", get(get_strings))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_index() -> Response {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session
// ============================================================

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Current session view; starts a session when the cookie is missing or stale
async fn get_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionView>) {
    let (id, session, created) = state.sessions.get_or_create(session_id(&jar)).await;
    let jar = if created {
        jar.add(session_cookie(id))
    } else {
        jar
    };
    let session = session.lock().await;
    (jar, Json(SessionView::from_session(&session)))
}

async fn end_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<EndSessionResponse>) {
    let ended = match session_id(&jar) {
        Some(id) => state.sessions.end(&id).await,
        None => false,
    };
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(EndSessionResponse { ended }))
}

async fn update_settings(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.require(session_id(&jar)).await?;
    let mut session = try_acquire(&session)?;
    session.update_settings(update)?;
    Ok(Json(SessionView::from_session(&session)))
}

// ============================================================
// User Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<ChatRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let session = state.sessions.require(session_id(&jar)).await?;
    let mut session = try_acquire(&session)?;
    let outcome = state.runner.run_turn(&mut session, &req.text).await?;
    Ok(Json(TurnResponse::new(outcome, &session)))
}

async fn clear_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.require(session_id(&jar)).await?;
    let mut session = try_acquire(&session)?;
    session.clear();
    Ok(Json(SessionView::from_session(&session)))
}

/// The "Save" button: the conversation without its preamble, as JSON
async fn download_transcript(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let session = state.sessions.require(session_id(&jar)).await?;
    let session = session.lock().await;
    let body = session
        .conversation
        .transcript_json()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}

// ============================================================
// Pickers
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = all_models()
        .iter()
        .map(|&model| ModelInfo {
            id: model,
            description: model.description(),
            context_window: model.context_window(),
        })
        .collect();

    Json(ModelsResponse {
        models,
        default: state.sessions.defaults().model,
    })
}

async fn get_strings(Path(locale): Path<String>) -> Result<Json<I18nResponse>, AppError> {
    let locale: Locale = locale
        .parse()
        .map_err(|e: crate::i18n::UnknownLocale| AppError::NotFound(e.to_string()))?;
    let translations = Translations::load(locale);
    Ok(Json(I18nResponse {
        locale,
        strings: translations.ui_strings(),
    }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("gpt_chatbots ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound => AppError::NotFound(e.to_string()),
            SessionError::Busy => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::EmptyInput => AppError::BadRequest(e.to_string()),
            TransitionError::Busy => AppError::Conflict(e.to_string()),
            TransitionError::InvalidTransition(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
