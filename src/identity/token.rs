use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use super::Claims;

type HmacSha256 = Hmac<Sha256>;

/// Fixed token lifetime: one hour from issuance.
pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong structure or bad signature. One kind on purpose; callers that
    /// face clients collapse it further.
    #[error("invalid token")]
    Invalid,
    /// Signature checked out but the expiry instant has passed.
    #[error("token expired")]
    Expired,
}

/// Stateless token issuer/verifier.
///
/// Wire format is `base64url(claims JSON) "." base64url(HMAC-SHA256 tag)`,
/// with the tag computed over the encoded claims. Validity is re-derivable
/// from the signing secret and the clock alone; no per-token state exists,
/// so any number of server instances can verify without shared storage.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into(), ttl_secs: TOKEN_TTL_SECS }
    }

    #[cfg(test)]
    fn with_ttl(secret: impl Into<Vec<u8>>, ttl_secs: i64) -> Self {
        Self { secret: secret.into(), ttl_secs }
    }

    fn mac_for(&self, payload: &str) -> HmacSha256 {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac key");
        mac.update(payload.as_bytes());
        mac
    }

    pub fn issue(&self, user_id: &str, username: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: user_id.to_string(),
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        // A plain struct of strings and ints cannot fail to serialize
        let body = serde_json::to_vec(&claims).expect("serialize claims");
        let payload = URL_SAFE_NO_PAD.encode(body);
        let tag = self.mac_for(&payload).finalize().into_bytes();
        format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(tag))
    }

    /// Pure function of the token, the secret and the current time.
    /// Signature is checked before anything inside the payload is trusted,
    /// so `Expired` is only ever reported for authentically signed tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let (payload, sig) = token.split_once('.').ok_or(TokenError::Invalid)?;
        let sig_bytes = URL_SAFE_NO_PAD.decode(sig).map_err(|_| TokenError::Invalid)?;
        self.mac_for(payload)
            .verify_slice(&sig_bytes)
            .map_err(|_| TokenError::Invalid)?;
        let body = URL_SAFE_NO_PAD.decode(payload).map_err(|_| TokenError::Invalid)?;
        let claims: Claims = serde_json::from_slice(&body).map_err(|_| TokenError::Invalid)?;
        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
