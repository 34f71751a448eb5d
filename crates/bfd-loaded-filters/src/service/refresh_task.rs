//! Periodic refresh driver
//!
//! Calls [`FilterManager::refresh`] on a fixed delay: the next cycle starts
//! `refresh_interval` after the previous one finished. Store reads block, so
//! each cycle runs on tokio's blocking pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::filter_manager::FilterManager;
use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::ports::LoadedBatchStore;

/// Handle to a running refresh loop.
///
/// Dropping the handle without calling [`RefreshTask::shutdown`] also stops
/// the loop after the current cycle.
pub struct RefreshTask {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Start refreshing `manager` from `store`. Must be called from within a
    /// tokio runtime.
    pub fn spawn<S>(manager: Arc<FilterManager>, store: Arc<S>, config: &FilterConfig) -> Self
    where
        S: LoadedBatchStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(
            manager,
            store,
            config.initial_delay,
            config.refresh_interval,
            shutdown_rx,
        ));
        info!(
            initial_delay_ms = config.initial_delay.as_millis() as u64,
            interval_ms = config.refresh_interval.as_millis() as u64,
            "Started loaded filter refresh task"
        );
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Stop the loop and wait for the in-flight cycle, if any, to finish.
    pub async fn shutdown(self) -> Result<(), FilterError> {
        // The loop may already have exited; a closed channel is fine.
        let _ = self.shutdown_tx.send(true);
        self.handle
            .await
            .map_err(|e| FilterError::RefreshTask(e.to_string()))?;
        info!("Stopped loaded filter refresh task");
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

async fn run<S>(
    manager: Arc<FilterManager>,
    store: Arc<S>,
    initial_delay: Duration,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    S: LoadedBatchStore + 'static,
{
    tokio::select! {
        _ = tokio::time::sleep(initial_delay) => {}
        _ = shutdown_rx.changed() => return,
    }

    loop {
        let cycle_manager = Arc::clone(&manager);
        let cycle_store = Arc::clone(&store);
        let result =
            tokio::task::spawn_blocking(move || cycle_manager.refresh(cycle_store.as_ref())).await;

        match result {
            Ok(Ok(outcome)) => debug!(
                merged = outcome.merged,
                trimmed = outcome.trimmed,
                filters = outcome.filter_count,
                "Refresh cycle complete"
            ),
            Ok(Err(e)) => error!(error = %e, "Error refreshing loaded file filters"),
            Err(e) => error!(error = %e, "Refresh cycle did not complete"),
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown_rx.changed() => break,
        }
    }
}
