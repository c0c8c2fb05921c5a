use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims we read from a bearer credential. Nothing here is verified; the
/// signature is the server's business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialClaims {
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decodes the payload segment of a JWT-shaped credential.
/// Returns `None` for opaque tokens.
pub fn decode_claims(credential: &str) -> Option<CredentialClaims> {
    let parts: Vec<&str> = credential.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| tracing::debug!("Credential payload is not base64url: {:?}", e))
        .ok()?;

    serde_json::from_slice(&payload)
        .map_err(|e| tracing::debug!("Credential payload is not JSON claims: {:?}", e))
        .ok()
}

/// True when the credential carries an `exp` at or before `now`.
pub fn is_expired_at(credential: &str, now: DateTime<Utc>) -> bool {
    decode_claims(credential)
        .and_then(|claims| claims.exp)
        .is_some_and(|exp| exp <= now.timestamp())
}

pub fn is_expired(credential: &str) -> bool {
    is_expired_at(credential, Utc::now())
}
