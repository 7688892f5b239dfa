//! todo-panel - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the todo API.

use todo_panel::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Missing .env is fine
    let dotenv = dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_panel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: env={}, store={:?}, database={}",
        config.env,
        config.store_type,
        config.database_path().display()
    );

    // Start HTTP server
    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting server on {}", addr);

    api::serve(config).await?;

    Ok(())
}
