use std::sync::Arc;

use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pitward_bot=info,pitward_archival=info".into()),
        )
        .init();

    // load config: explicit path via PITWARD_CONFIG > ~/.pitward/pitward.toml
    let config_path = std::env::var("PITWARD_CONFIG").ok();
    let config = pitward_core::PitwardConfig::load(config_path.as_deref())?;

    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(&db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let store = pitward_pits::PitStore::new(db)?;
    let gateway = Arc::new(pitward_discord::DiscordGateway::new(&config.discord));

    let engine = pitward_archival::ArchivalEngine::new(
        store,
        gateway,
        pitward_archival::EngineOptions::from(&config.archival),
    );
    let restart = engine.handle();

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let engine_task = tokio::spawn(engine.run(shutdown_rx));

    // SIGHUP forces a re-selection, so pit records edited out-of-band take
    // effect without waiting out the current sleep.
    #[cfg(unix)]
    {
        let restart = restart.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let mut hup = match signal(SignalKind::hangup()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("failed to install SIGHUP handler: {e}");
                    return;
                }
            };
            while hup.recv().await.is_some() {
                restart.restart();
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    let _ = engine_task.await;
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}
