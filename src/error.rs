//! Error handling module with type-safe, non-exhaustive error types
//!
//! Every verification failure is representable here, but the gate collapses
//! all of them to a single "not authenticated" outcome before anything
//! user-visible happens. The structured variants exist for operator logs.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Sensitive patterns that must never survive into log output.
const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "secret",
    "token",
    "key",
    "credential",
    "bearer",
    "authorization",
    "cookie",
    "private",
];

/// Non-exhaustive error enum for forward compatibility.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EdgeAuthError {
    /// Token structure is not parseable (missing segments, undecodable).
    #[error("Token malformed: {reason}")]
    TokenMalformed {
        /// Description of the malformation.
        reason: String,
    },

    /// Token declares an algorithm outside the allow-list.
    #[error("Token algorithm not allowed: {alg}")]
    AlgorithmNotAllowed {
        /// The declared algorithm.
        alg: String,
    },

    /// Token signature verification failed.
    #[error("Token signature invalid")]
    TokenInvalid,

    /// Token has expired.
    #[error("Token expired at {expired_at}")]
    TokenExpired {
        /// When the token expired.
        expired_at: DateTime<Utc>,
    },

    /// Token is not yet valid (nbf claim).
    #[error("Token not yet valid until {valid_from}")]
    TokenNotYetValid {
        /// When the token becomes valid.
        valid_from: DateTime<Utc>,
    },

    /// Issuer claim does not exactly match the configured identity pool.
    #[error("Token issuer does not match the configured identity pool")]
    IssuerMismatch,

    /// Signing key lookup failed (unknown kid, unreachable endpoint).
    #[error("Key lookup failed: {reason}")]
    KeyLookup {
        /// Description of the lookup failure.
        reason: String,
    },

    /// Key-set fetch timed out.
    #[error("Operation timed out after {duration:?}")]
    Timeout {
        /// How long the operation ran before timing out.
        duration: Duration,
    },

    /// Internal error (details sanitized in logs).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EdgeAuthError {
    /// Classifies a key-endpoint HTTP failure. Timeouts carry the deadline
    /// the client was configured with; reqwest does not record it itself.
    pub fn from_key_fetch(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { duration: timeout }
        } else if err.is_connect() {
            Self::KeyLookup {
                reason: "key set endpoint unreachable".to_string(),
            }
        } else {
            Self::KeyLookup {
                reason: sanitize_message(&err.to_string()),
            }
        }
    }

    /// Stable error code for structured logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TokenMalformed { .. } => "AUTH_TOKEN_MALFORMED",
            Self::AlgorithmNotAllowed { .. } => "AUTH_ALGORITHM_NOT_ALLOWED",
            Self::TokenInvalid => "AUTH_TOKEN_INVALID",
            Self::TokenExpired { .. } => "AUTH_TOKEN_EXPIRED",
            Self::TokenNotYetValid { .. } => "AUTH_TOKEN_NOT_YET_VALID",
            Self::IssuerMismatch => "AUTH_ISSUER_MISMATCH",
            Self::KeyLookup { .. } => "KEY_LOOKUP_FAILED",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Sanitize a message by removing sensitive information.
pub fn sanitize_message(message: &str) -> String {
    let lower = message.to_lowercase();
    for pattern in SENSITIVE_PATTERNS {
        if lower.contains(pattern) {
            return "Invalid token format".to_string();
        }
    }
    message.to_string()
}

/// Check if a string contains sensitive information.
pub fn contains_sensitive_info(text: &str) -> bool {
    let lower = text.to_lowercase();
    SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p))
}

impl From<jsonwebtoken::errors::Error> for EdgeAuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => EdgeAuthError::TokenExpired {
                expired_at: Utc::now(),
            },
            ErrorKind::ImmatureSignature => EdgeAuthError::TokenNotYetValid {
                valid_from: Utc::now(),
            },
            ErrorKind::InvalidSignature => EdgeAuthError::TokenInvalid,
            ErrorKind::InvalidIssuer => EdgeAuthError::IssuerMismatch,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                EdgeAuthError::AlgorithmNotAllowed {
                    alg: "unknown".to_string(),
                }
            }
            _ => EdgeAuthError::TokenMalformed {
                reason: sanitize_message(&err.to_string()),
            },
        }
    }
}
