use anyhow::{Context, Result};
use axum::Router;
use signed_object_store::{
    config::AppConfig,
    routes,
    services::{
        self,
        signature::{SignatureVerifier, SigningKey},
    },
    state::AppState,
};
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!("Starting signed-object-store with config: {:?}", cfg);

    // --- Shared secret for the URL builder and the verifier ---
    let key = SigningKey::new(&cfg.secret)?;
    let verifier = SignatureVerifier::new(key.clone(), cfg.expiry_leeway);

    // --- Initialize storage backend ---
    let storage = services::open_storage(&cfg, key)
        .await
        .context("opening storage backend")?;
    tracing::info!(
        "Serving public objects from {} and private objects from {}",
        cfg.public_dir.display(),
        cfg.private_dir.display()
    );

    // --- Build router ---
    let app: Router = routes::routes::routes(AppState::new(storage, verifier));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
