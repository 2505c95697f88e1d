//! HTTP serving surface
//!
//! Thin request-forwarding layer over the core components: every route
//! passes the access gate, then calls the conversation store, the vault
//! reader/graph builder, or the workflow dispatcher directly. Handlers
//! hold no logic beyond validation and error mapping.

use crate::auth::{gate, SessionTokenService};
use crate::config::Config;
use crate::error::{Result, VaultdeskError};
use crate::storage::ConversationStore;
use crate::vault::VaultReader;
use crate::workflow::{HttpWorkflowDispatcher, WorkflowDispatcher};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::sync::Arc;

pub mod handlers;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<ConversationStore>,
    pub vault: Arc<VaultReader>,
    pub tokens: Arc<SessionTokenService>,
    pub workflows: Arc<dyn WorkflowDispatcher>,
}

impl AppState {
    /// Build the state from validated configuration
    ///
    /// Fails on a missing signing key or an unopenable database; both are
    /// startup errors, not per-request ones.
    pub fn new(config: Config) -> Result<Self> {
        let tokens = SessionTokenService::new(&config.auth.session_key)?;
        let store = match &config.storage.db_path {
            Some(path) => ConversationStore::new_with_path(path.clone())?,
            None => ConversationStore::new()?,
        };
        let vault = VaultReader::new(config.vault.root.clone());
        let workflows = HttpWorkflowDispatcher::new(&config.workflows)?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            vault: Arc::new(vault),
            tokens: Arc::new(tokens),
            workflows: Arc::new(workflows),
        })
    }
}

/// Assemble the router with the access gate wrapped around every route
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route(
            "/api/conversations",
            get(handlers::list_conversations).post(handlers::create_conversation),
        )
        .route(
            "/api/conversations/:id",
            get(handlers::get_conversation).delete(handlers::delete_conversation),
        )
        .route("/api/conversations/:id/title", put(handlers::update_title))
        .route("/api/conversations/:id/messages", post(handlers::add_message))
        .route("/api/vault/files", get(handlers::list_vault_files))
        .route("/api/vault/file", get(handlers::read_vault_file))
        .route("/api/vault/graph", get(handlers::vault_graph))
        .route("/api/workflows/:name", post(handlers::dispatch_workflow))
        .route("/api/webhook/bot", post(handlers::bot_webhook))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::require_session,
        ))
        .with_state(state)
}

/// Bind and serve until shutdown
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::new(config)?;
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Error wrapper mapping the core error taxonomy onto HTTP statuses
///
/// Validation 400, not-found 404, integrity 409, authentication 401,
/// collaborator failure 502, everything else 500 with the detail kept
/// out of the response body.
pub struct ApiError(anyhow::Error);

/// Result alias for handler functions
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.downcast_ref::<VaultdeskError>() {
            Some(VaultdeskError::Validation(_)) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            Some(VaultdeskError::Vault(_)) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            Some(VaultdeskError::NotFound(_)) => (StatusCode::NOT_FOUND, self.0.to_string()),
            Some(VaultdeskError::Integrity(_)) => (StatusCode::CONFLICT, self.0.to_string()),
            Some(VaultdeskError::Authentication(_)) => {
                (StatusCode::UNAUTHORIZED, self.0.to_string())
            }
            Some(VaultdeskError::Workflow(_)) => (StatusCode::BAD_GATEWAY, self.0.to_string()),
            _ => {
                tracing::error!("internal error: {:#}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({ "success": false, "error": message })),
        )
            .into_response()
    }
}
