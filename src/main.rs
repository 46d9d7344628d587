//! Edge Auth Gateway - main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use edge_auth::config::Config;
use edge_auth::gate::EdgeGate;
use edge_auth::jwt::{KeyResolver, TokenVerifier};
use edge_auth::observability::{init_logging, LoggingConfig};
use edge_auth::server::{build_router, AppState};
use edge_auth::shutdown::wait_for_signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    init_logging(&LoggingConfig {
        json: config.log_json,
        ..LoggingConfig::default()
    });

    info!(
        login_domain = %config.login_domain,
        issuer = %config.issuer_str(),
        jwks_url = %config.jwks_url_str(),
        cookie = %config.token_cookie,
        "Starting Edge Auth Gateway"
    );

    let resolver = Arc::new(KeyResolver::new(&config)?);
    let verifier = TokenVerifier::new(resolver, config.issuer_str());
    let gate = Arc::new(EdgeGate::new(&config, verifier));

    let app = build_router(AppState { gate }, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Edge Auth Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    info!("Edge Auth Gateway stopped");

    Ok(())
}
