//! Axum handlers for the page and the `/api/*` routes.
//!
//! Each handler receives [`AppState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Errors use the `{error, message}` JSON body
//! built by [`json_error`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{page, AppState, SESSION_COOKIE};
use crate::chat::widget::WidgetEvent;
use crate::chat::{ExportError, TranscriptStore};
use crate::contact::{self, ContactForm};
use crate::content::filter::{filter_projects, filter_skills, CategoryFilter};
use crate::feeds::{Platform, PAGE_SIZE};
use crate::presentation::theme::{cookie_value, THEME_COOKIE};
use crate::presentation::{Theme, ThemeContext};

/// Client-hint header browsers send for the preferred color scheme.
const COLOR_SCHEME_HINT: &str = "sec-ch-prefers-color-scheme";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(super) struct PageQuery {
    #[serde(default)]
    category: String,
    #[serde(default)]
    q: String,
    #[serde(default)]
    skill_q: String,
    #[serde(default)]
    platform: String,
    visible: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ProjectQuery {
    #[serde(default)]
    category: String,
    #[serde(default)]
    q: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SkillQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct PublicationQuery {
    platform: Option<String>,
    visible: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ThemeRequest {
    theme: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct OpenRequest {
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MessageRequest {
    message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WidgetRequest {
    event: WidgetEvent,
}

#[derive(Debug, Deserialize)]
pub(super) struct Observation {
    id: String,
    ratio: f32,
}

#[derive(Debug, Deserialize)]
pub(super) struct VisibilityRequest {
    observations: Vec<Observation>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

/// Decode a JSON body that may be empty; an empty body yields the default.
fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
}

fn unknown_session(id: &str) -> Response {
    (StatusCode::NOT_FOUND, json_error("not_found", format!("unknown session: {id}"))).into_response()
}

fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|h| cookie_value(h, name))
}

fn theme_context(headers: &HeaderMap) -> ThemeContext {
    let hint = headers
        .get(COLOR_SCHEME_HINT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_matches('"'));
    ThemeContext::resolve(cookie(headers, THEME_COOKIE), hint)
}

// ── Page ──────────────────────────────────────────────────────────────────────

/// GET /
pub(super) async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    // Unparseable selectors fall back to defaults on the page; the JSON
    // endpoints are strict.
    let category = CategoryFilter::parse(&query.category).unwrap_or_default();
    let platform = Platform::from_label(&query.platform).unwrap_or(Platform::Medium);
    let visible = query.visible.unwrap_or(PAGE_SIZE);
    let theme = theme_context(&headers).theme();

    let active = match cookie(&headers, SESSION_COOKIE) {
        Some(id) => state.spies.lock().await.active(id).map(str::to_string),
        None => None,
    };

    let publications = state.live.publications.read().await.clone();
    let activity = state.live.activity.read().await.clone();

    let html = page::render(&page::PageContext {
        site_name: &state.site_name,
        content: &state.content,
        theme,
        active_section: active.as_deref(),
        category,
        query: query.q.trim(),
        skill_query: query.skill_q.trim(),
        publications: &publications,
        platform,
        visible,
        activity: state.activity_enabled.then_some(&activity),
    });
    Html(html).into_response()
}

/// GET /{*path}: static files.
pub(super) async fn static_asset(State(state): State<AppState>, uri: Uri) -> Response {
    match state.assets.serve(uri.path()) {
        Some(asset) => (asset.status, [(header::CONTENT_TYPE, asset.content_type)], asset.body).into_response(),
        None => (StatusCode::NOT_FOUND, "not found\n").into_response(),
    }
}

// ── Read-only data ────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let publications = state.live.publications.read().await.status();
    let body = json!({
        "status": "ok",
        "sessions": state.chat.session_count().await,
        "publications": publications,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/profile
pub(super) async fn profile(State(state): State<AppState>) -> Response {
    let c = &state.content;
    let body = json!({
        "profile": c.profile,
        "social_links": c.social_links,
        "highlights": c.highlights,
        "experience": c.experience,
        "education": c.education,
        "certifications": c.certifications,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/projects?category=&q=
pub(super) async fn projects(State(state): State<AppState>, Query(query): Query<ProjectQuery>) -> Response {
    let Some(category) = CategoryFilter::parse(&query.category) else {
        return (
            StatusCode::BAD_REQUEST,
            json_error("bad_request", format!("unknown category: {}", query.category)),
        )
            .into_response();
    };
    let projects = filter_projects(&state.content.projects, category, query.q.trim());
    let body = json!({
        "category": category.to_string(),
        "count": projects.len(),
        "projects": projects,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/skills?q=
pub(super) async fn skills(State(state): State<AppState>, Query(query): Query<SkillQuery>) -> Response {
    let groups = filter_skills(&state.content.skill_groups, query.q.trim());
    let proficiency: Vec<_> = state
        .content
        .proficiency
        .iter()
        .map(|p| json!({ "subject": p.subject, "score": p.score, "level": p.level() }))
        .collect();
    let body = json!({ "proficiency": proficiency, "skill_groups": groups });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/publications?platform=&visible=
pub(super) async fn publications(
    State(state): State<AppState>,
    Query(query): Query<PublicationQuery>,
) -> Response {
    let platform = match query.platform.as_deref() {
        None => Platform::Medium,
        Some(label) => match Platform::from_label(label) {
            Some(p) => p,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    json_error("bad_request", format!("unknown platform: {label}")),
                )
                    .into_response();
            }
        },
    };
    let feed = state.live.publications.read().await;
    let page = feed.page(platform, query.visible.unwrap_or(PAGE_SIZE));
    let body = json!({ "status": feed.status(), "page": page });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/activity
pub(super) async fn activity(State(state): State<AppState>) -> Response {
    if !state.activity_enabled {
        return (StatusCode::OK, Json(json!({ "status": "disabled" }))).into_response();
    }
    let activity = state.live.activity.read().await;
    (StatusCode::OK, Json(&*activity)).into_response()
}

// ── Theme ─────────────────────────────────────────────────────────────────────

/// POST /api/theme: `{"theme": "dark"}` sets, an empty body toggles.
pub(super) async fn theme(headers: HeaderMap, body: Bytes) -> Response {
    let req: ThemeRequest = match optional_json(&body) {
        Ok(req) => req,
        Err(e) => return (StatusCode::BAD_REQUEST, json_error("bad_request", e)).into_response(),
    };
    let mut ctx = theme_context(&headers);
    match req.theme {
        None => {
            ctx.toggle();
        }
        Some(raw) => match Theme::parse(&raw) {
            Some(t) => ctx.set(t),
            None => {
                return (StatusCode::BAD_REQUEST, json_error("bad_request", format!("unknown theme: {raw}")))
                    .into_response();
            }
        },
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, ctx.cookie())],
        Json(json!({ "theme": ctx.theme().as_str() })),
    )
        .into_response()
}

// ── Chat ──────────────────────────────────────────────────────────────────────

/// POST /api/chat/session
pub(super) async fn chat_open(State(state): State<AppState>, body: Bytes) -> Response {
    let req: OpenRequest = match optional_json(&body) {
        Ok(req) => req,
        Err(e) => return (StatusCode::BAD_REQUEST, json_error("bad_request", e)).into_response(),
    };
    let view = state.chat.open(req.session_id.as_deref()).await;
    (StatusCode::OK, Json(view)).into_response()
}

/// GET /api/chat/{id}
pub(super) async fn chat_view(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.chat.view(&id).await {
        Some(view) => (StatusCode::OK, Json(view)).into_response(),
        None => unknown_session(&id),
    }
}

/// POST /api/chat/{id}/message
///
/// The exchange runs in its own task so the session settles even if this
/// request times out or the client goes away.
pub(super) async fn chat_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Response {
    let hub = Arc::clone(&state.chat);
    let session_id = id.clone();
    let task = tokio::spawn(async move { hub.send(&session_id, &req.message).await });

    match tokio::time::timeout(state.reply_timeout, task).await {
        Ok(Ok(Some(view))) => (StatusCode::OK, Json(view)).into_response(),
        Ok(Ok(None)) => unknown_session(&id),
        Ok(Err(e)) => {
            warn!(session_id = %id, "chat task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, json_error("internal", e)).into_response()
        }
        Err(_) => {
            warn!(session_id = %id, "chat reply timed out");
            (StatusCode::GATEWAY_TIMEOUT, json_error("timeout", "assistant reply timed out")).into_response()
        }
    }
}

/// POST /api/chat/{id}/widget
pub(super) async fn chat_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<WidgetRequest>,
) -> Response {
    match state.chat.widget(&id, req.event).await {
        Some(view) => (StatusCode::OK, Json(view)).into_response(),
        None => unknown_session(&id),
    }
}

/// POST /api/chat/{id}/clear
pub(super) async fn chat_clear(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.chat.clear(&id).await {
        Some(view) => (StatusCode::OK, Json(view)).into_response(),
        None => unknown_session(&id),
    }
}

/// GET /api/chat/{id}/export: transcript as a PDF download.
pub(super) async fn chat_export(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.chat.export(&id, Local::now().date_naive()).await {
        Ok(pdf) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", pdf.filename)),
            ],
            pdf.bytes,
        )
            .into_response(),
        Err(ExportError::UnknownSession(_)) => unknown_session(&id),
        Err(e @ ExportError::Refused) => (StatusCode::CONFLICT, json_error("conflict", e)).into_response(),
        Err(e @ ExportError::Failed(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, json_error("export_failed", e)).into_response()
        }
    }
}

// ── Scroll spy ────────────────────────────────────────────────────────────────

/// POST /api/sections/{id}/visibility
pub(super) async fn section_visibility(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VisibilityRequest>,
) -> Response {
    if !TranscriptStore::is_valid_id(&id) {
        return (StatusCode::BAD_REQUEST, json_error("bad_request", "invalid session id")).into_response();
    }
    let mut spies = state.spies.lock().await;
    let observations = req.observations.iter().map(|o| (o.id.as_str(), o.ratio));
    let active = spies.observe(&id, observations).map(str::to_string);
    debug!(active = ?active, "active section updated");
    (StatusCode::OK, Json(json!({ "active": active }))).into_response()
}

// ── Contact ───────────────────────────────────────────────────────────────────

/// POST /api/contact
pub(super) async fn contact(State(state): State<AppState>, Json(form): Json<ContactForm>) -> Response {
    match contact::submit(&form, state.contact_delay).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "sent" }))).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, json_error("invalid", e)).into_response(),
    }
}
