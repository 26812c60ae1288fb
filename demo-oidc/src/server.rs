use axum::{Router, middleware::from_fn};
use axum_server::tls_rustls::RustlsConfig;
use std::{net::SocketAddr, path::PathBuf};
use tokio::task::JoinHandle;

use oidc_flow_axum::mark_tls;

#[derive(Clone, Copy)]
pub(crate) struct Ports {
    pub(crate) http: u16,
    pub(crate) https: u16,
}

pub(crate) fn spawn_http_server(port: u16, app: Router) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::debug!("HTTP server listening on {}", addr);
        if let Err(e) = axum_server::bind(addr)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("HTTP server error: {}", e);
        }
    })
}

/// Serve `app` over TLS when `self_signed_certs/{cert,key}.pem` exist.
///
/// Requests on this listener are marked as TLS so callback addresses use `https`.
pub(crate) async fn spawn_https_server(
    port: u16,
    app: Router,
) -> Result<Option<JoinHandle<()>>, std::io::Error> {
    let cert_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("self_signed_certs");
    let cert = cert_dir.join("cert.pem");
    let key = cert_dir.join("key.pem");

    if !cert.exists() || !key.exists() {
        tracing::warn!(
            "No certificates in {}, HTTPS server disabled",
            cert_dir.display()
        );
        return Ok(None);
    }

    let config = RustlsConfig::from_pem_file(cert, key).await?;
    let app = app.layer(from_fn(mark_tls));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::debug!("HTTPS server listening on {}", addr);
    Ok(Some(tokio::spawn(async move {
        if let Err(e) = axum_server::bind_rustls(addr, config)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("HTTPS server error: {}", e);
        }
    })))
}
