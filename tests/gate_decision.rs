//! End-to-end decision matrix for the edge gate.

mod common;

use common::*;
use edge_auth::request::{EdgeDecision, EdgeRequest};
use wiremock::MockServer;

#[tokio::test]
async fn static_assets_bypass_authentication_entirely() {
    let server = MockServer::start().await;
    mount_jwks(&server, 0).await;
    let gate = build_gate(&test_config(&server.uri()));

    // Bogus cookie and query string must not matter for assets.
    let request = EdgeRequest::new("/img/logo.png")
        .with_querystring("code=whatever")
        .with_header("cookie", "id_token=garbage");

    let decision = gate.handle(request.clone()).await;
    assert_eq!(decision, EdgeDecision::Forward { request });
}

#[tokio::test]
async fn missing_cookie_redirects_without_any_key_fetch() {
    let server = MockServer::start().await;
    mount_jwks(&server, 0).await;
    let gate = build_gate(&test_config(&server.uri()));

    let decision = gate.handle(EdgeRequest::new("/dashboard")).await;

    let EdgeDecision::Respond { response } = decision else {
        panic!("expected a redirect");
    };
    assert_eq!(response.status, "302");
}

#[tokio::test]
async fn valid_token_forwards_request_unchanged() {
    let server = MockServer::start().await;
    mount_jwks_lenient(&server).await;
    let gate = build_gate(&test_config(&server.uri()));

    let request = page_request_with_token(TOKEN_VALID);
    let decision = gate.handle(request.clone()).await;
    assert_eq!(decision, EdgeDecision::Forward { request });
}

#[tokio::test]
async fn unknown_signing_key_redirects() {
    let server = MockServer::start().await;
    mount_jwks_lenient(&server).await;
    let gate = build_gate(&test_config(&server.uri()));

    let decision = gate.handle(page_request_with_token(TOKEN_UNKNOWN_KID)).await;
    assert!(matches!(decision, EdgeDecision::Respond { .. }));
}

#[tokio::test]
async fn wrong_issuer_redirects() {
    let server = MockServer::start().await;
    mount_jwks_lenient(&server).await;
    let gate = build_gate(&test_config(&server.uri()));

    let decision = gate.handle(page_request_with_token(TOKEN_WRONG_ISSUER)).await;
    assert!(matches!(decision, EdgeDecision::Respond { .. }));
}

#[tokio::test]
async fn expired_token_redirects() {
    let server = MockServer::start().await;
    mount_jwks_lenient(&server).await;
    let gate = build_gate(&test_config(&server.uri()));

    let decision = gate.handle(page_request_with_token(TOKEN_EXPIRED)).await;
    assert!(matches!(decision, EdgeDecision::Respond { .. }));
}

#[tokio::test]
async fn code_exchange_leg_forwards_even_when_unauthenticated() {
    let server = MockServer::start().await;
    mount_jwks(&server, 0).await;
    let gate = build_gate(&test_config(&server.uri()));

    let request = EdgeRequest::new("/").with_querystring("code=abc123&state=xyz");
    let decision = gate.handle(request.clone()).await;
    assert_eq!(decision, EdgeDecision::Forward { request });
}

#[tokio::test]
async fn code_exchange_leg_forwards_with_failing_token_too() {
    let server = MockServer::start().await;
    mount_jwks_lenient(&server).await;
    let gate = build_gate(&test_config(&server.uri()));

    let request = EdgeRequest::new("/")
        .with_querystring("code=abc123")
        .with_header("cookie", format!("id_token={TOKEN_EXPIRED}"));
    let decision = gate.handle(request.clone()).await;
    assert_eq!(decision, EdgeDecision::Forward { request });
}

#[tokio::test]
async fn redirect_carries_login_url_and_no_cache_directive() {
    let server = MockServer::start().await;
    mount_jwks(&server, 0).await;
    let gate = build_gate(&test_config(&server.uri()));

    let decision = gate.handle(EdgeRequest::new("/app")).await;
    let EdgeDecision::Respond { response } = decision else {
        panic!("expected a redirect");
    };

    assert_eq!(response.status, "302");
    assert_eq!(response.status_description, "Found");
    assert_eq!(response.header("cache-control"), Some("no-cache"));

    let location = response.header("location").expect("location header");
    assert!(location.starts_with("https://auth.example.com/login?"));
    assert!(location.contains("client_id=client-abc123"));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("scope=email+openid+profile"));
    assert!(location.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2F"));
}

#[tokio::test]
async fn query_substring_code_does_not_bypass() {
    let server = MockServer::start().await;
    mount_jwks(&server, 0).await;
    let gate = build_gate(&test_config(&server.uri()));

    let request = EdgeRequest::new("/app").with_querystring("decode=1&barcode=9");
    let decision = gate.handle(request).await;
    assert!(matches!(decision, EdgeDecision::Respond { .. }));
}
