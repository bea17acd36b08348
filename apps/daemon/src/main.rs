mod config;

use anyhow::Context;
use clipkeep_context::platform::platform_provider;
use clipkeep_events::TracingEventBus;
use clipkeep_storage::Database;
use clipkeep_watcher::{platform::platform_pasteboard, PasteboardWatcher};
use config::DaemonConfig;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,clipkeep=debug")),
        )
        .init();

    let config = DaemonConfig::from_env();
    tracing::info!(database = %config.database_path.display(), "Starting clipkeep daemon");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let db = Arc::new(
        Database::open(&config.database_path).context("failed to open history database")?,
    );
    let seeded = db
        .seed_default_exclusions()
        .context("failed to seed default exclusions")?;
    if seeded > 0 {
        tracing::info!(count = seeded, "Seeded default app exclusions");
    }

    let mut watcher = PasteboardWatcher::builder(Arc::clone(&db), platform_pasteboard())
        .provider(Arc::new(platform_provider()))
        .events(Arc::new(TracingEventBus))
        .config(config.watcher)
        .build();
    watcher.start().context("failed to start clipboard watcher")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("Shutting down");
    watcher.stop();
    Ok(())
}
