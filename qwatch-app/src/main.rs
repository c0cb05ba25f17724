//! qwatch
//!
//! A terminal watcher for the USGS earthquake summary feeds.

mod cities;
mod config;
mod render;
mod shutdown;
mod sink;

use clap::Parser;
use config::{CliOverrides, ConfigLoader, LoadedConfig};
use qwatch_core::config::WatchConfig;
use qwatch_core::entities::FeedKey;
use qwatch_core::events::{
    AlertNotice, alert_notice_channel, poll_trigger_channel, snapshot_update_channel,
};
use qwatch_core::processors::{
    FeedSource, NotificationController, PollScheduler, Reconciler, UsgsFeedSource,
};
use render::EventListRenderer;
use sink::TerminalSink;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// qwatch - USGS earthquake feed watcher
#[derive(Parser, Debug)]
#[command(name = "qwatch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./qwatch-config.toml")]
    config: PathBuf,

    /// Override the feed to poll (e.g. all_hour, m4_5_day)
    #[arg(short, long)]
    feed: Option<FeedKey>,

    /// Drop events below this magnitude at fetch time
    #[arg(long)]
    min_magnitude: Option<f64>,

    /// Watch near this city from the configured city list
    #[arg(long)]
    city: Option<String>,

    /// Radius for regional proximity alerts, in km
    #[arg(long)]
    radius_km: Option<f64>,

    /// Fetch and print one snapshot, then exit
    #[arg(long, default_value = "false")]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting qwatch v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let overrides = CliOverrides {
        feed: args.feed,
        min_magnitude: args.min_magnitude,
        radius_km: args.radius_km,
        city: args.city,
    };
    let config_loader = Arc::new(ConfigLoader::new(&args.config, overrides));
    let LoadedConfig {
        watch: watch_config,
        audio_cue,
        warnings,
    } = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let source = Arc::new(UsgsFeedSource::new());

    if args.once {
        for warning in warnings {
            tracing::warn!("{warning}");
        }
        return run_once(source, &watch_config).await;
    }

    // Wire the event channels
    let (config_tx, config_rx) = tokio::sync::watch::channel(watch_config);
    let (trigger_tx, trigger_rx) = poll_trigger_channel();
    let (snapshot_tx, snapshot_rx) = snapshot_update_channel();
    let (notice_tx, notice_rx) = alert_notice_channel();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Surface startup warnings on the banner channel
    for warning in warnings {
        tracing::warn!("{warning}");
        let _ = notice_tx
            .send(AlertNotice::Transient { message: warning })
            .await;
    }

    // Spawn the pipeline processors
    let scheduler = PollScheduler::new(source, config_rx, trigger_rx, snapshot_tx, notice_tx.clone());
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx.clone()));

    let renderer = EventListRenderer::new(snapshot_rx);
    let renderer_handle = tokio::spawn(renderer.run(shutdown_rx.clone()));

    let controller = NotificationController::new(TerminalSink::new(audio_cue));
    let controller_handle = tokio::spawn(controller.run(shutdown_rx, notice_rx));

    // Spawn signal handlers (SIGHUP reload, SIGUSR1 manual poll)
    let signal_notify =
        shutdown::spawn_signal_handlers(config_loader, config_tx, trigger_tx, notice_tx);

    // Wait for SIGTERM/SIGINT
    shutdown::shutdown_signal().await;

    // Stop everything
    let _ = shutdown_tx.send(true);
    signal_notify.notify_one();
    let _ = tokio::join!(scheduler_handle, renderer_handle, controller_handle);
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Fetch and print one reconciled snapshot, then return.
async fn run_once(source: Arc<UsgsFeedSource>, config: &WatchConfig) -> anyhow::Result<()> {
    let snapshot = source
        .fetch_snapshot(config.feed, config.min_magnitude)
        .await?;
    let now_ms = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let outcome = Reconciler::new().reconcile(snapshot, config.feed, now_ms);

    println!("--- {} events ---", outcome.ordered.len());
    for event in &outcome.ordered {
        println!("{}", render::render_line(event));
    }
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
