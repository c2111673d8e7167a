//! HMAC-SHA256 signed access tokens
//!
//! Format: `base64url(json claims) "." base64url(hmac_sha256(secret, first segment))`

use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

use crate::domain::token::{AccessClaims, TokenSigner};
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct HmacTokenSigner {
    secret: [u8; 32],
}

impl HmacTokenSigner {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }
}

impl std::fmt::Debug for HmacTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HmacTokenSigner { .. }")
    }
}

impl TokenSigner for HmacTokenSigner {
    fn sign(&self, claims: &AccessClaims) -> AuthResult<String> {
        let payload = serde_json::to_vec(claims)
            .map_err(|e| AuthError::Internal(format!("Failed to encode claims: {e}")))?;
        let payload_b64 = to_base64url(&payload);
        let signature = hmac_sha256(&self.secret, payload_b64.as_bytes());
        Ok(format!("{}.{}", payload_b64, to_base64url(&signature)))
    }

    fn verify(&self, token: &str, now: i64) -> AuthResult<AccessClaims> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(AuthError::TokenInvalid)?;

        let signature = from_base64url(signature_b64).map_err(|_| AuthError::TokenInvalid)?;
        if !verify_hmac_sha256(&self.secret, payload_b64.as_bytes(), &signature) {
            return Err(AuthError::TokenInvalid);
        }

        let payload = from_base64url(payload_b64).map_err(|_| AuthError::TokenInvalid)?;
        let claims: AccessClaims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::TokenInvalid)?;

        if claims.is_expired(now) {
            return Err(AuthError::TokenInvalid);
        }
        Ok(claims)
    }
}
