//! Request handlers
//!
//! Each handler validates its input, calls exactly one core component,
//! and maps the outcome through [`ApiError`](super::ApiError).

use crate::auth::{self, verify_secret};
use crate::error::VaultdeskError;
use crate::server::{ApiResult, AppState};
use crate::storage::{Conversation, Message, NewMessage, Role};
use crate::vault::{self, VaultFile};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Pages

pub async fn index() -> Html<&'static str> {
    Html("<!doctype html><title>VaultDesk</title><h1>VaultDesk</h1>")
}

pub async fn login_page() -> Html<&'static str> {
    Html(
        "<!doctype html><title>VaultDesk login</title>\
        <form method=\"post\" action=\"/api/login\">\
        <input type=\"password\" name=\"password\" autofocus>\
        <button>Sign in</button></form>",
    )
}

// ---------------------------------------------------------------------------
// Authentication

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Log in with the single recognized secret
///
/// On success sets the session cookie; on failure answers 401 without
/// revealing anything about the account (there is only one).
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    if !verify_secret(&req.password, &state.config.auth.password) {
        tracing::info!("rejected login attempt");
        return Err(VaultdeskError::Authentication("invalid credentials".into()).into());
    }

    let token = state.tokens.issue()?;
    let cookie = auth::session_cookie(&token, state.config.server.production);

    let mut response = Json(json!({ "success": true })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| VaultdeskError::Authentication(format!("bad cookie value: {}", e)))?,
    );
    Ok(response)
}

/// Log out by clearing the session cookie (tokens themselves cannot be
/// revoked server-side; they lapse at natural expiry)
pub async fn logout(State(state): State<AppState>) -> ApiResult<Response> {
    let cookie = auth::clear_session_cookie(state.config.server.production);
    let mut response = Json(json!({ "success": true })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| VaultdeskError::Authentication(format!("bad cookie value: {}", e)))?,
    );
    Ok(response)
}

/// Inbound bot webhook, authenticated by shared secret instead of cookie
pub async fn bot_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> ApiResult<Json<Value>> {
    let expected = &state.config.auth.webhook_secret;
    let presented = headers
        .get("x-webhook-secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if expected.is_empty() || presented != expected {
        return Err(VaultdeskError::Authentication("invalid webhook secret".into()).into());
    }

    let event_id = uuid::Uuid::new_v4();
    tracing::info!(
        %event_id,
        bytes = payload.to_string().len(),
        "accepted bot webhook payload"
    );
    Ok(Json(json!({ "success": true, "event_id": event_id })))
}

// ---------------------------------------------------------------------------
// Conversations

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Conversation>>> {
    Ok(Json(state.store.list_conversations(query.limit)?))
}

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

pub async fn create_conversation(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationRequest>,
) -> ApiResult<(StatusCode, Json<Conversation>)> {
    let conversation = state.store.create_conversation(&req.id, &req.title)?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// A conversation together with its ordered message history
#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConversationDetail>> {
    let conversation = state
        .store
        .get_conversation(&id)?
        .ok_or_else(|| VaultdeskError::NotFound(format!("conversation {}", id)))?;
    let messages = state.store.get_messages(&id)?;
    Ok(Json(ConversationDetail {
        conversation,
        messages,
    }))
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.store.delete_conversation(&id)?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTitleRequest {
    #[serde(default)]
    pub title: String,
}

pub async fn update_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTitleRequest>,
) -> ApiResult<Json<Value>> {
    state.store.update_conversation_title(&id, &req.title)?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

pub async fn add_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddMessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let role = Role::parse(&req.role).ok_or_else(|| {
        VaultdeskError::Validation(format!(
            "role must be 'user' or 'assistant', got '{}'",
            req.role
        ))
    })?;
    let message = state.store.add_message(
        &id,
        &NewMessage {
            id: req.id,
            role,
            content: req.content,
        },
    )?;
    Ok((StatusCode::CREATED, Json(message)))
}

// ---------------------------------------------------------------------------
// Vault

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub folder: Option<String>,
}

pub async fn list_vault_files(
    State(state): State<AppState>,
    Query(query): Query<FilesQuery>,
) -> ApiResult<Json<Vec<VaultFile>>> {
    Ok(Json(state.vault.list_files(query.folder.as_deref())?))
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    #[serde(default)]
    pub path: String,
}

/// One vault file with its front-matter separated out
#[derive(Debug, Serialize)]
pub struct VaultFileResponse {
    pub metadata: BTreeMap<String, String>,
    pub content: String,
    pub raw: String,
}

pub async fn read_vault_file(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> ApiResult<Json<VaultFileResponse>> {
    if query.path.is_empty() {
        return Err(VaultdeskError::Validation("path query parameter is required".into()).into());
    }
    let raw = state.vault.read_file(&query.path)?;
    let (metadata, body) = vault::split_front_matter(&raw);
    Ok(Json(VaultFileResponse {
        metadata,
        content: body.to_string(),
        raw,
    }))
}

pub async fn vault_graph(
    State(state): State<AppState>,
) -> ApiResult<Json<vault::LinkGraph>> {
    Ok(Json(vault::build_graph(&state.vault)?))
}

// ---------------------------------------------------------------------------
// Workflows

/// Forward a workflow trigger to the external dispatcher
///
/// The dispatcher's `success: false` is relayed as a 200 soft failure;
/// only an unreachable dispatcher becomes a 502.
pub async fn dispatch_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Option<Json<Value>>,
) -> ApiResult<Json<crate::workflow::DispatchResult>> {
    let payload = payload.map(|Json(v)| v).unwrap_or_else(|| json!({}));
    let result = state.workflows.dispatch(&name, payload).await?;
    if !result.success {
        tracing::warn!(workflow = %name, error = ?result.error, "workflow reported failure");
    }
    Ok(Json(result))
}
