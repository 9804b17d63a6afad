//! Daemon command: keeps the contest cache warm in the foreground.
//!
//! The scheduler refreshes the cache after the configured initial delay and
//! then on every interval. Interactive commands run in other processes read
//! the persisted `contests.json`.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use contestcal_server::Scheduler;

use crate::app::App;
use crate::error::ClientResult;

/// Runs until Ctrl-C.
pub async fn run(app: &App) -> ClientResult<()> {
    let scheduler_config = app.server_config().scheduler.clone();
    info!(
        state_dir = %app.server_config().state_dir.display(),
        "starting refresh daemon"
    );

    let scheduler = Scheduler::new(scheduler_config)?;
    let handle = scheduler.handle();

    let cache = app.cache().clone();
    let scheduler_task = tokio::spawn(async move {
        scheduler
            .run(move || {
                let cache = cache.clone();
                async move {
                    cache
                        .get_or_refresh(Utc::now())
                        .await
                        .map(|contests| info!(count = contests.len(), "contest cache warm"))
                        .map_err(|e| e.to_string())
                }
            })
            .await;
    });

    tokio::signal::ctrl_c().await?;

    info!("shutting down");
    if let Err(e) = handle.stop().await {
        warn!(error = %e, "failed to send stop command to scheduler");
    }
    if tokio::time::timeout(Duration::from_secs(5), scheduler_task)
        .await
        .is_err()
    {
        warn!("scheduler did not stop in time");
    }

    let state = handle.state().await;
    info!(
        runs = state.runs,
        consecutive_failures = state.consecutive_failures,
        "daemon stopped"
    );
    Ok(())
}
