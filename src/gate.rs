//! Per-request decision logic.
//!
//! One terminal decision per request: static assets bypass authentication
//! entirely, authenticated requests pass, an in-progress code exchange
//! passes, and everything else is redirected to the hosted login page.
//! Verification failures of any kind fail closed to "not authenticated".

use crate::config::Config;
use crate::cookie::extract_cookie;
use crate::jwt::TokenVerifier;
use crate::request::{EdgeDecision, EdgeRequest, EdgeResponse, HeaderRecord};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// File extensions that bypass authentication. Static assets carry no
/// user-specific data, and the login page itself needs some of them.
const STATIC_ASSET_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "css", "js", "svg", "ico"];

/// The authentication gate, applied once per incoming request.
pub struct EdgeGate {
    verifier: TokenVerifier,
    token_cookie: String,
    login_url: String,
}

impl EdgeGate {
    /// Creates a gate from the deployment configuration and a verifier.
    /// The login URL is assembled once here; it only depends on config.
    pub fn new(config: &Config, verifier: TokenVerifier) -> Self {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &config.client_id)
            .append_pair("response_type", "code")
            .append_pair("scope", &config.login_scopes.join(" "))
            .append_pair("redirect_uri", config.redirect_uri.as_str())
            .finish();
        let login_url = format!("https://{}/login?{}", config.login_domain, query);

        EdgeGate {
            verifier,
            token_cookie: config.token_cookie.clone(),
            login_url,
        }
    }

    /// Decides what happens to one request.
    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn handle(&self, request: EdgeRequest) -> EdgeDecision {
        if is_static_asset(&request.uri) {
            debug!("static asset, bypassing authentication");
            return EdgeDecision::Forward { request };
        }

        let token = extract_cookie(&request.headers, &self.token_cookie).map(str::to_owned);

        let authenticated = match token {
            Some(raw) => self.verifier.verify(&raw).await.is_some(),
            None => {
                debug!("no identity token cookie present");
                false
            }
        };

        if authenticated {
            debug!("request authenticated, forwarding");
            return EdgeDecision::Forward { request };
        }

        if has_auth_code(&request.querystring) {
            // The code-exchange leg of the login flow; redirecting here
            // would loop. Downstream completes the exchange and sets the
            // cookie.
            debug!("authorization code present, forwarding for exchange");
            return EdgeDecision::Forward { request };
        }

        info!("unauthenticated request, redirecting to login");
        EdgeDecision::Respond {
            response: self.login_redirect(),
        }
    }

    /// Builds the non-cacheable 302 redirect to the hosted login page.
    pub fn login_redirect(&self) -> EdgeResponse {
        let mut headers = HashMap::new();
        headers.insert(
            "location".to_string(),
            vec![HeaderRecord::new("Location", self.login_url.clone())],
        );
        headers.insert(
            "cache-control".to_string(),
            vec![HeaderRecord::new("Cache-Control", "no-cache")],
        );

        EdgeResponse {
            status: "302".to_string(),
            status_description: "Found".to_string(),
            headers,
        }
    }

    /// The precomputed login URL, for logging and tests.
    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

/// Whether the request path names a static asset by extension,
/// case-insensitively.
pub fn is_static_asset(uri: &str) -> bool {
    let file = uri.rsplit('/').next().unwrap_or(uri);
    match file.rsplit_once('.') {
        Some((_, ext)) => STATIC_ASSET_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        None => false,
    }
}

/// Whether the query string carries an authorization-code parameter. Parses
/// pairs rather than substring-matching, so `decode=x` does not count.
pub fn has_auth_code(querystring: &str) -> bool {
    querystring
        .split('&')
        .any(|pair| pair.split_once('=').is_some_and(|(name, _)| name == "code"))
}
