//! Session authentication for VaultDesk
//!
//! Single-user authentication built from three pieces: a credential
//! verifier for the login secret, a stateless signed session token, and
//! an access gate middleware that enforces the token on every protected
//! route. There is no server-side session table; a token is valid iff
//! its signature checks out and it has not expired.

pub mod credentials;
pub mod gate;
pub mod token;

pub use credentials::verify_secret;
pub use gate::require_session;
pub use token::{SessionTokenService, SESSION_TTL_SECS};

use axum::http::HeaderMap;

/// Name of the session cookie held by the browser
pub const SESSION_COOKIE: &str = "vaultdesk_session";

/// Build the Set-Cookie value carrying a freshly issued session token
///
/// HTTP-only, SameSite=Lax, path `/`, max-age matching the token TTL.
/// `secure` should be true in production deployments.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that clears the session cookie
///
/// Used on logout and whenever the gate rejects a dead token, so the
/// browser stops resending it.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract the session token from a request's Cookie header, if present
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}
