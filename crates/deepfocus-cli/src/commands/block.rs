use clap::Subcommand;
use deepfocus_core::clock::now_ms;
use deepfocus_core::Config;
use serde_json::json;

use super::{open_service, print_json, CliResult};

/// Exit status of `block check` when the destination is blocked.
const BLOCKED_EXIT_CODE: i32 = 2;

#[derive(Subcommand)]
pub enum BlockAction {
    /// Block a site (hostname fragment, e.g. "reddit.com")
    Add { site: String },
    /// Unblock a site
    Remove { site: String },
    /// List blocked sites
    List,
    /// Print the installed redirect rules
    Rules,
    /// Run the navigation hook for a URL; exits with 2 when blocked
    Check { url: String },
    /// Continue past the blocked page (counts as a distraction)
    Override,
}

pub fn run(action: BlockAction, config: &Config) -> CliResult {
    let mut service = open_service(config)?;

    match action {
        BlockAction::Add { site } => {
            let rules = service.add_blocked_site(&site)?;
            print_json(&json!({ "sites": service.blocked_sites()?, "rules": rules.len() }))?;
        }
        BlockAction::Remove { site } => {
            let rules = service.remove_blocked_site(&site)?;
            print_json(&json!({ "sites": service.blocked_sites()?, "rules": rules.len() }))?;
        }
        BlockAction::List => {
            print_json(&service.blocked_sites()?)?;
        }
        BlockAction::Rules => {
            print_json(&service.installed_rules()?)?;
        }
        BlockAction::Check { url } => {
            let verdict = service.handle_navigation(&url, now_ms())?;
            print_json(&verdict)?;
            if verdict.is_blocked() {
                std::process::exit(BLOCKED_EXIT_CODE);
            }
        }
        BlockAction::Override => {
            print_json(&service.override_block(now_ms())?)?;
        }
    }
    Ok(())
}
