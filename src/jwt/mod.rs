//! Identity-token verification: claims, key resolution, and the staged
//! verification pipeline.

pub mod claims;
pub mod keys;
pub mod token;
pub mod verifier;

pub use claims::Claims;
pub use keys::{Jwk, JwkSet, KeyResolver};
pub use token::{SignatureVerified, Token, TokenState, Unverified, Verified};
pub use verifier::TokenVerifier;
