//! Verification pipeline driver with a uniform failure boundary.

use crate::error::EdgeAuthError;
use crate::jwt::claims::Claims;
use crate::jwt::keys::KeyResolver;
use crate::jwt::token::{Token, Unverified, Verified};
use std::sync::Arc;
use tracing::debug;

/// Drives a token through parse, signature, and claims verification.
pub struct TokenVerifier {
    resolver: Arc<KeyResolver>,
    expected_issuer: String,
}

impl TokenVerifier {
    /// Creates a verifier bound to one key resolver and one expected issuer.
    pub fn new(resolver: Arc<KeyResolver>, expected_issuer: impl Into<String>) -> Self {
        TokenVerifier {
            resolver,
            expected_issuer: expected_issuer.into(),
        }
    }

    /// Verifies a token, collapsing every failure kind to `None`. Callers
    /// must not be able to distinguish why verification failed; the cause
    /// goes to the operator log only.
    pub async fn verify(&self, raw_token: &str) -> Option<Claims> {
        match self.verify_token(raw_token).await {
            Ok(token) => Some(token.into_claims()),
            Err(err) => {
                debug!(code = err.code(), error = %err, "token verification failed");
                None
            }
        }
    }

    /// The staged pipeline with distinguishable failures, for callers that
    /// log or test the taxonomy.
    pub async fn verify_token(&self, raw_token: &str) -> Result<Token<Verified>, EdgeAuthError> {
        let unverified = Token::<Unverified>::parse(raw_token)?;
        let signature_verified = unverified.verify_signature(&self.resolver).await?;
        signature_verified.verify_claims(&self.expected_issuer)
    }
}
