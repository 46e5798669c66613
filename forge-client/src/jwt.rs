//! App-level JWT minting (spec §6): RS256, `iat=now-60`, `exp=now+600`,
//! `iss=appId`. Used once per installation-token mint, never sent with
//! individual API calls otherwise.

use crate::errors::{Error, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// Loads a PEM private key that may be provided base64-encoded, raw PEM
/// text, or a file path — the loader tries base64-decode first, then
/// falls back to treating the value as literal PEM (spec §6).
pub fn load_private_key(raw: &str) -> Result<EncodingKey> {
    use base64::Engine;

    if let Ok(path_contents) = std::fs::read(raw) {
        return EncodingKey::from_rsa_pem(&path_contents)
            .map_err(|e| Error::InvalidPrivateKey(e.to_string()));
    }

    if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(raw.trim()) {
        if let Ok(key) = EncodingKey::from_rsa_pem(&decoded) {
            return Ok(key);
        }
    }

    EncodingKey::from_rsa_pem(raw.as_bytes()).map_err(|e| Error::InvalidPrivateKey(e.to_string()))
}

/// Mints a signed app JWT for minting an installation access token.
pub fn mint_app_jwt(key: &EncodingKey, app_id: &str, now_unix: i64) -> Result<String> {
    let claims = AppClaims {
        iat: now_unix - 60,
        exp: now_unix + 600,
        iss: app_id.to_string(),
    };
    let header = Header::new(Algorithm::RS256);
    encode(&header, &claims, key).map_err(Error::from)
}
