//! Type-state token with staged verification.
//!
//! A token moves `Unverified` → `SignatureVerified` → `Verified`; claims are
//! only reachable from the final state, so trust cannot be asserted early by
//! accident.

use std::marker::PhantomData;

use jsonwebtoken::{decode, decode_header, Algorithm, Header, Validation};

use crate::error::EdgeAuthError;
use crate::jwt::claims::Claims;
use crate::jwt::keys::KeyResolver;

/// The single accepted signing algorithm.
pub const ALLOWED_ALGORITHM: Algorithm = Algorithm::RS256;

mod private {
    /// Sealed trait to prevent external state implementations.
    pub trait Sealed {}
}

/// Marker trait for token verification states.
pub trait TokenState: private::Sealed {
    /// Human-readable state name for debugging.
    fn state_name() -> &'static str;
}

/// Parsed but nothing trusted yet.
#[derive(Debug)]
pub struct Unverified;
impl private::Sealed for Unverified {}
impl TokenState for Unverified {
    fn state_name() -> &'static str {
        "Unverified"
    }
}

/// Cryptographic signature checked against the resolved key.
#[derive(Debug)]
pub struct SignatureVerified;
impl private::Sealed for SignatureVerified {}
impl TokenState for SignatureVerified {
    fn state_name() -> &'static str {
        "SignatureVerified"
    }
}

/// Signature and standard claims both checked.
#[derive(Debug)]
pub struct Verified;
impl private::Sealed for Verified {}
impl TokenState for Verified {
    fn state_name() -> &'static str {
        "Verified"
    }
}

/// Token wrapper that enforces the verification stages at compile time.
#[derive(Debug)]
pub struct Token<State: TokenState> {
    raw: String,
    header: Header,
    claims: Option<Claims>,
    kid: Option<String>,
    _state: PhantomData<State>,
}

impl Token<Unverified> {
    /// Parses a raw token string without trusting anything in it. Fails on
    /// structural problems and on algorithms outside the allow-list, before
    /// any network lookup happens.
    pub fn parse(raw: &str) -> Result<Self, EdgeAuthError> {
        let header = decode_header(raw).map_err(|e| EdgeAuthError::TokenMalformed {
            reason: format!("invalid header: {e}"),
        })?;

        if header.alg != ALLOWED_ALGORITHM {
            return Err(EdgeAuthError::AlgorithmNotAllowed {
                alg: format!("{:?}", header.alg),
            });
        }

        let kid = header.kid.clone();

        Ok(Token {
            raw: raw.to_string(),
            header,
            claims: None,
            kid,
            _state: PhantomData,
        })
    }

    /// Key identifier declared by the header, untrusted.
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// Verifies the signature using the key the header names, resolved
    /// through the key resolver.
    pub async fn verify_signature(
        self,
        resolver: &KeyResolver,
    ) -> Result<Token<SignatureVerified>, EdgeAuthError> {
        let kid = self.kid.as_ref().ok_or_else(|| EdgeAuthError::TokenMalformed {
            reason: "missing kid in header".to_string(),
        })?;

        let decoding_key = resolver.get_key(kid).await?;

        // Signature only at this stage; claim checks come next.
        let mut validation = Validation::new(ALLOWED_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let token_data = decode::<Claims>(&self.raw, &decoding_key, &validation)?;

        Ok(Token {
            raw: self.raw,
            header: self.header,
            claims: Some(token_data.claims),
            kid: self.kid,
            _state: PhantomData,
        })
    }
}

impl Token<SignatureVerified> {
    /// Verifies the standard claims: issuer exact match, expiry, and
    /// not-before when present.
    pub fn verify_claims(self, expected_issuer: &str) -> Result<Token<Verified>, EdgeAuthError> {
        let claims = self.claims.as_ref().ok_or_else(|| EdgeAuthError::TokenMalformed {
            reason: "claims not available".to_string(),
        })?;

        if claims.iss != expected_issuer {
            return Err(EdgeAuthError::IssuerMismatch);
        }

        if claims.is_expired() {
            return Err(EdgeAuthError::TokenExpired {
                expired_at: chrono::DateTime::from_timestamp(claims.exp, 0)
                    .unwrap_or_else(chrono::Utc::now),
            });
        }

        if let Some(nbf) = claims.nbf {
            let now = chrono::Utc::now().timestamp();
            if nbf > now {
                return Err(EdgeAuthError::TokenNotYetValid {
                    valid_from: chrono::DateTime::from_timestamp(nbf, 0)
                        .unwrap_or_else(chrono::Utc::now),
                });
            }
        }

        Ok(Token {
            raw: self.raw,
            header: self.header,
            claims: self.claims,
            kid: self.kid,
            _state: PhantomData,
        })
    }
}

impl Token<Verified> {
    /// Access claims; only available once fully verified.
    pub fn claims(&self) -> &Claims {
        self.claims.as_ref().expect("verified token must have claims")
    }

    /// The subject claim.
    pub fn subject(&self) -> &str {
        &self.claims().sub
    }

    /// The issuer claim.
    pub fn issuer(&self) -> &str {
        &self.claims().iss
    }

    /// Consumes the token, yielding the trusted claim set.
    pub fn into_claims(mut self) -> Claims {
        self.claims.take().expect("verified token must have claims")
    }
}

impl<S: TokenState> Token<S> {
    /// The current state name.
    pub fn state_name(&self) -> &'static str {
        S::state_name()
    }
}
