//! Identity-token claim set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Claims carried by an identity token. Only reachable through a fully
/// verified token; possession of a `Claims` value is evidence of
/// authentication, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer: which identity pool minted the token.
    pub iss: String,
    /// Subject: the authenticated principal.
    pub sub: String,
    /// Audience, when present (the client id for id tokens).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issued-at, seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Not-before, seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Token use discriminator ("id" vs "access") when the pool sets one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_use: Option<String>,
    /// Email address, when the pool includes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Any further claims the pool attaches.
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Whether the expiry claim is in the past.
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_json(exp: i64) -> String {
        format!(
            r#"{{"iss":"https://pool.example.com","sub":"user-1","exp":{exp},"iat":1700000000,"custom_attr":"x"}}"#
        )
    }

    #[test]
    fn expired_when_exp_in_past() {
        let claims: Claims = serde_json::from_str(&claims_json(1700003600)).unwrap();
        assert!(claims.is_expired());
    }

    #[test]
    fn not_expired_when_exp_in_future() {
        let claims: Claims = serde_json::from_str(&claims_json(4102444800)).unwrap();
        assert!(!claims.is_expired());
    }

    #[test]
    fn unknown_claims_land_in_custom() {
        let claims: Claims = serde_json::from_str(&claims_json(4102444800)).unwrap();
        assert_eq!(
            claims.custom.get("custom_attr").and_then(|v| v.as_str()),
            Some("x")
        );
    }
}
