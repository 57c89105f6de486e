use clap::Subcommand;
use deepfocus_core::clock::now_ms;
use deepfocus_core::Config;
use serde_json::json;

use super::{open_service, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's counters, the focus score and the 7-day history
    Show,
    /// Record a tab switch (debounced)
    TabSwitch {
        /// Epoch ms of the switch (defaults to now)
        #[arg(long)]
        at: Option<i64>,
    },
    /// Zero today's counters, keeping the history
    Reset,
    /// Dashboard totals over the 7-day window
    Summary,
}

pub fn run(action: StatsAction, config: &Config) -> CliResult {
    let mut service = open_service(config)?;
    let now = now_ms();

    match action {
        StatsAction::Show => {
            print_json(&service.stats(now)?)?;
        }
        StatsAction::TabSwitch { at } => {
            let recorded = service.tab_switch(at.unwrap_or(now), now)?;
            let counted = recorded.is_some();
            let stats = match recorded {
                Some(snapshot) => snapshot,
                None => service.stats(now)?,
            };
            print_json(&json!({ "counted": counted, "stats": stats }))?;
        }
        StatsAction::Reset => {
            print_json(&service.reset_daily(now)?)?;
        }
        StatsAction::Summary => {
            let snapshot = service.stats(now)?;
            print_json(&snapshot.analytics_data.summary(&snapshot.daily_stats))?;
        }
    }
    Ok(())
}

