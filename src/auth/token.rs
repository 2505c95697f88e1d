//! Stateless session token issuing and validation
//!
//! Tokens are `base64url(payload).base64url(mac)` where the payload is a
//! small JSON claims object and the MAC is HMAC-SHA256 over the encoded
//! payload with the configured symmetric key. Validity is a pure function
//! of the token and the key: there is no session table and no revocation
//! list, so a token stays valid until its natural expiry.

use crate::error::{Result, VaultdeskError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Session lifetime: seven days from issuance
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    /// Fixed claim asserting a completed login
    authenticated: bool,
    /// Issue time (Unix seconds)
    iat: i64,
    /// Expiry time (Unix seconds)
    exp: i64,
}

/// Issues and validates signed session tokens
///
/// Construction fails if no signing key is configured; callers must treat
/// that as a startup configuration error, not a per-request failure.
pub struct SessionTokenService {
    key: Vec<u8>,
}

impl SessionTokenService {
    /// Create a token service from the configured signing key
    ///
    /// # Errors
    ///
    /// Returns `VaultdeskError::Config` if the key is empty.
    pub fn new(key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(
                VaultdeskError::Config("session signing key is not configured".to_string()).into(),
            );
        }
        Ok(Self {
            key: key.as_bytes().to_vec(),
        })
    }

    /// Issue a signed token valid for the standard session lifetime
    pub fn issue(&self) -> Result<String> {
        self.issue_with_ttl(SESSION_TTL_SECS)
    }

    /// Issue a signed token with an explicit lifetime in seconds
    ///
    /// Negative lifetimes produce already-expired tokens. Primarily useful
    /// for tests exercising expiry handling.
    pub fn issue_with_ttl(&self, ttl_secs: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            authenticated: true,
            iat: now,
            exp: now + ttl_secs,
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let mac = self.sign(&payload)?;
        Ok(format!("{}.{}", payload, mac))
    }

    /// Validate a token's signature and expiry
    ///
    /// Malformed, tampered, and expired tokens all yield `false`; this
    /// boundary never panics and never propagates an error.
    pub fn validate(&self, token: &str) -> bool {
        self.check(token).is_some()
    }

    fn sign(&self, payload: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| VaultdeskError::Config(format!("invalid signing key: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    fn check(&self, token: &str) -> Option<()> {
        let (payload, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.key).ok()?;
        mac.update(payload.as_bytes());
        // Constant-time comparison
        mac.verify_slice(&signature).ok()?;

        let claims: TokenClaims = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;
        if !claims.authenticated {
            return None;
        }
        if claims.exp <= Utc::now().timestamp() {
            return None;
        }
        Some(())
    }
}
