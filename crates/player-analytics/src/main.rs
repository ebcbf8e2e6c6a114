// Player analytics entry point.
//
// Startup sequence:
// 1. Initialize tracing (stdout)
// 2. Load config
// 3. Warm the player data cache
// 4. Serve HTTP until Ctrl+C

use player_analytics::config;
use player_analytics::data::DataSource;
use player_analytics::web;

use anyhow::Context;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Player analytics starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} ({:?}), data at {}",
        config.server.bind_addr(),
        config.server.environment,
        config.data_path.display()
    );

    // 3. Warm the cache. A failure is not fatal: requests retry the load and
    //    show the error page until the file can be read.
    let source = DataSource::new(&config.data_path);
    match source.dataset().await {
        Ok(dataset) => info!(
            "Serving {} player rows across {} years ({} games)",
            dataset.rows().len(),
            dataset.years().len(),
            dataset.total_games()
        ),
        Err(e) => error!(
            "Initial player data load from {} failed: {}",
            source.path().display(),
            e
        ),
    }

    // 4. Serve
    let state = web::AppState::new(config, source);
    web::serve(state, shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Player analytics shut down cleanly");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Initialize tracing to stdout.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("player_analytics=info,warn")),
        )
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
