use clap::Subcommand;
use deepfocus_core::clock::now_ms;
use deepfocus_core::{Config, Daemon, Event};
use tokio::time;

use super::{open_service, print_json, print_json_line, runtime, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a work session (replaces a running one)
    Start {
        /// Work minutes (defaults to the last used value)
        #[arg(long)]
        work: Option<u32>,
        /// Break minutes (defaults to the last used value)
        #[arg(long = "break")]
        brk: Option<u32>,
    },
    /// Stop the timer
    Stop,
    /// Print current timer state as JSON
    Status,
    /// Advance the timer once and print the update
    Tick,
    /// Tick in the foreground, printing every update, until the timer stops
    Watch,
}

pub fn run(action: TimerAction, config: &Config) -> CliResult {
    let mut service = open_service(config)?;

    match action {
        TimerAction::Start { work, brk } => {
            let update = match (work, brk) {
                (None, None) => service.start_default(now_ms())?,
                (work, brk) => {
                    let prefs = service.preferences()?;
                    service.start_pomodoro(
                        work.unwrap_or(prefs.work_duration),
                        brk.unwrap_or(prefs.break_duration),
                        now_ms(),
                    )?
                }
            };
            print_json(&update)?;
        }
        TimerAction::Stop => {
            let update = service.stop_pomodoro()?;
            print_json(&update)?;
        }
        TimerAction::Status => {
            let status = service.timer_status(now_ms())?;
            print_json(&status)?;
        }
        TimerAction::Tick => match service.tick(now_ms())? {
            Some(update) => print_json(&update)?,
            None => print_json(&service.timer_status(now_ms())?)?,
        },
        TimerAction::Watch => {
            let tick_interval = config.tick_interval();
            let daemon = Daemon::new(service, tick_interval);
            runtime()?.block_on(watch(daemon, tick_interval))?;
        }
    }
    Ok(())
}

async fn watch(daemon: Daemon, tick_interval: std::time::Duration) -> CliResult {
    let mut events = daemon.subscribe();
    if !daemon.resume().await? {
        eprintln!("timer is idle");
        return Ok(());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = time::timeout(tick_interval * 2, events.recv()) => match next {
                Ok(Some(Event::PomodoroUpdate(update))) => print_json_line(&update)?,
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(_) => {
                    if !daemon.is_ticking().await {
                        break;
                    }
                }
            },
        }
    }

    // Leave the session running; only the foreground ticker ends here.
    daemon.shutdown().await;
    Ok(())
}
