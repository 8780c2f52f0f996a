use anyhow::Result;
use std::io::ErrorKind;
use tokio::net::TcpListener;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod telemetry;


#[tokio::main]
async fn main() -> Result<()> {
    // --- Environment + logging setup ---
    dotenvy::dotenv().ok();
    telemetry::init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;
    tracing::info!("Starting store-gateway with config: {:?}", cfg);

    // --- Initialize store clients ---
    let state = state::AppState::from_config(&cfg).await?;

    // --- Handle schema initialization mode ---
    if cfg.init_db {
        state.products.init_schema().await?;
        tracing::info!("Database initialization complete.");
        return Ok(()); // exit after init
    }

    // --- Build router ---
    let app = routes::app(state, cfg.max_upload_bytes);

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
