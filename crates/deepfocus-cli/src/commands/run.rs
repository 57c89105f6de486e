//! Foreground daemon. Ticks the timer and resets stats at midnight. Writes
//! its broadcasts to stdout as JSON lines. Other CLI invocations reach it
//! only through the store: the store watch picks up their sessions, stats
//! and preference changes and rebroadcasts them here.

use deepfocus_core::{Config, Daemon};

use super::{open_service, print_json_line, runtime, CliResult};

pub fn run(config: &Config) -> CliResult {
    let service = open_service(config)?;
    let daemon = Daemon::new(service, config.tick_interval());
    runtime()?.block_on(serve(daemon, config))
}

async fn serve(daemon: Daemon, config: &Config) -> CliResult {
    let mut events = daemon.subscribe();
    daemon.spawn_daily_reset(config.reset_poll_interval()).await;
    daemon.spawn_store_watch(config.store_poll_interval()).await;
    let resumed = daemon.resume().await?;
    tracing::info!(resumed, "daemon running, Ctrl-C to exit");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(event) => print_json_line(&event)?,
                None => break,
            },
        }
    }

    daemon.shutdown().await;
    tracing::info!("daemon stopped");
    Ok(())
}
