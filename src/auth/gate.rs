//! Access gate middleware
//!
//! Every request passes through here. Static assets and the public
//! allow-list bypass the gate; everything else must carry a valid session
//! cookie or gets redirected to the login page. A present-but-invalid
//! cookie is cleared on the way out so the browser stops resending it.

use crate::auth::{clear_session_cookie, extract_session_cookie};
use crate::server::AppState;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

/// Paths reachable without a session
///
/// The bot webhook is here because external callers hold no browser
/// cookie; that endpoint authenticates itself by a shared secret instead.
const PUBLIC_PATHS: &[&str] = &["/login", "/api/login", "/api/webhook/bot", "/favicon.ico"];

/// Prefixes served without authentication (static assets)
const STATIC_PREFIXES: &[&str] = &["/static/"];

/// Enforce session authentication on protected paths
///
/// This middleware is the only place outside login/logout that mutates
/// the session cookie.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if is_public(path) {
        return next.run(request).await;
    }

    let Some(token) = extract_session_cookie(request.headers()) else {
        tracing::debug!(path, "no session cookie, redirecting to login");
        return Redirect::to("/login").into_response();
    };

    if state.tokens.validate(&token) {
        return next.run(request).await;
    }

    tracing::debug!(path, "invalid session token, clearing cookie");
    let mut response = Redirect::to("/login").into_response();
    let cleared = clear_session_cookie(state.config.server.production);
    if let Ok(value) = HeaderValue::from_str(&cleared) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Classify a path as public (bypassing the gate)
fn is_public(path: &str) -> bool {
    STATIC_PREFIXES.iter().any(|p| path.starts_with(p))
        || PUBLIC_PATHS.iter().any(|p| *p == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_paths_are_public() {
        assert!(is_public("/login"));
        assert!(is_public("/api/login"));
    }

    #[test]
    fn test_bot_webhook_is_public() {
        assert!(is_public("/api/webhook/bot"));
    }

    #[test]
    fn test_static_assets_are_public() {
        assert!(is_public("/static/app.css"));
        assert!(is_public("/favicon.ico"));
    }

    #[test]
    fn test_api_routes_are_protected() {
        assert!(!is_public("/"));
        assert!(!is_public("/api/conversations"));
        assert!(!is_public("/api/vault/graph"));
        assert!(!is_public("/api/webhook/bot/extra"));
    }

    #[test]
    fn test_favicon_is_exact_match_only() {
        assert!(is_public("/favicon.ico"));
        assert!(!is_public("/favicon.ico.bak"));
        assert!(!is_public("/favicon.ico/secret"));
    }
}
