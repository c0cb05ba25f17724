//! Signal handling for graceful shutdown, config reload and manual refresh.

use crate::config::ConfigLoader;
use qwatch_core::config::WatchConfig;
use qwatch_core::events::{AlertNotice, AlertNoticeSender, PollTrigger, PollTriggerSender};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Notify, watch};

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C).
pub async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Spawns a task that reloads configuration on SIGHUP and requests a manual
/// poll pass on SIGUSR1.
///
/// A reload republishes the runtime config over the watch channel; the
/// scheduler reacts to a filter change with an immediate pass. Returns a
/// Notify used to stop the task on shutdown.
pub fn spawn_signal_handlers(
    config_loader: Arc<ConfigLoader>,
    config_tx: watch::Sender<WatchConfig>,
    trigger_tx: PollTriggerSender,
    notice_tx: AlertNoticeSender,
) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
        let mut sigusr1 =
            signal(SignalKind::user_defined1()).expect("failed to install SIGUSR1 handler");

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded) => {
                            for warning in loaded.warnings {
                                tracing::warn!("{warning}");
                                let _ = notice_tx
                                    .send(AlertNotice::Transient { message: warning })
                                    .await;
                            }
                            if config_tx.send(loaded.watch).is_err() {
                                tracing::error!("Configuration channel closed, reload dropped");
                            } else {
                                tracing::info!("Configuration reloaded successfully");
                            }
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {e}");
                            let _ = notice_tx
                                .send(AlertNotice::Transient {
                                    message: format!("Configuration reload failed: {e}"),
                                })
                                .await;
                        }
                    }
                }
                _ = sigusr1.recv() => {
                    tracing::info!("Received SIGUSR1, requesting manual poll");
                    if trigger_tx.send(PollTrigger::Manual).await.is_err() {
                        tracing::error!("PollTrigger channel closed, manual poll dropped");
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Signal handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}
