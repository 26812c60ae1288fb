use axum::{Router, routing::get};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oidc_flow_axum::{InMemorySessionStore, OidcClient, OidcFlow, OidcProvider, oidc_router};

mod handlers;
mod server;

use crate::{
    handlers::{index, login, logout},
    server::{Ports, spawn_http_server, spawn_https_server},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install default CryptoProvider for rustls to prevent:
    // "no process-level CryptoProvider available -- call CryptoProvider::install_default() before this point"
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install default CryptoProvider")?;

    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,oidc_flow=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // OIDC stays disabled when OIDC_CLIENT_ID is not set
    let provider = OidcClient::from_env()?.map(|client| Arc::new(client) as Arc<dyn OidcProvider>);

    let sessions = InMemorySessionStore::new();
    let flow = OidcFlow::new(provider, Arc::new(sessions.clone()));

    let app = Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/logout", get(logout))
        .with_state(sessions)
        .merge(oidc_router(flow));

    let ports = Ports {
        http: 3001,
        https: 3443,
    };

    let http_server = spawn_http_server(ports.http, app.clone());
    match spawn_https_server(ports.https, app).await? {
        Some(https_server) => {
            let (http, https) = tokio::join!(http_server, https_server);
            http?;
            https?;
        }
        None => http_server.await?,
    }

    Ok(())
}
