use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use budget_audit::routes::{self, AppState};
use budget_audit::{CohereReviewer, ReviewerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("budget_audit=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Missing credentials are a startup failure, not a per-request error.
    let config = ReviewerConfig::from_env()
        .context("COHERE_API_KEY must be set (in the environment or a .env file)")?;
    let reviewer = CohereReviewer::new(config)?;
    let state = Arc::new(AppState { reviewer });

    let app = routes::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("starting budget-audit server on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
