//! Access token port
//!
//! The issuer decides *whether* to mint a token; how it is encoded and
//! signed is up to the [`TokenSigner`] implementation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthResult;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: user id
    pub sub: Uuid,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

impl AccessClaims {
    #[inline]
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }
}

/// Token encoding and signature verification
pub trait TokenSigner: Send + Sync {
    /// Encode and sign claims into an opaque bearer string
    fn sign(&self, claims: &AccessClaims) -> AuthResult<String>;

    /// Verify signature and expiry, returning the claims
    fn verify(&self, token: &str, now: i64) -> AuthResult<AccessClaims>;
}
