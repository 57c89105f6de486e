use clap::{Subcommand, ValueEnum};
use deepfocus_core::focus::{self, soundscape_asset};
use deepfocus_core::{Config, FilterLevel};
use serde_json::json;

use super::{open_service, print_json, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        matches!(switch, Switch::On)
    }
}

#[derive(Subcommand)]
pub enum FocusAction {
    /// Turn focus mode (page dimming) on or off
    Mode { state: Switch },
    /// Turn grayscale on or off
    Gray { state: Switch },
    /// Set the dimming level (0-100, higher values are clamped)
    Dim { level: u32 },
    /// Set the content filter level: none, light, moderate or extreme
    Filter { level: String },
    /// Pick a background soundscape ("none" for silence)
    Sound { id: String },
    /// Filter the element at a page position
    Pick { x: f64, y: f64 },
    /// Add a custom CSS selector to filter
    Custom { selector: String },
    /// Print all focus preferences
    Show,
}

pub fn run(action: FocusAction, config: &Config) -> CliResult {
    let mut service = open_service(config)?;

    match action {
        FocusAction::Mode { state } => service.set_focus_mode(state.into())?,
        FocusAction::Gray { state } => service.set_gray_mode(state.into())?,
        FocusAction::Dim { level } => {
            service.set_dimming(level)?;
        }
        FocusAction::Filter { level } => {
            let level: FilterLevel = level.parse()?;
            service.set_filter_level(level)?;
        }
        FocusAction::Sound { id } => service.set_soundscape(&id)?,
        FocusAction::Pick { x, y } => service.filter_element_at_point(x, y),
        FocusAction::Custom { selector } => {
            service.add_custom_filter(&selector)?;
        }
        FocusAction::Show => {}
    }

    let prefs = service.preferences()?;
    let filters = focus::custom_filters(service.store().as_ref())?;
    print_json(&json!({
        "preferences": prefs,
        "filteredCategories": prefs.effective_filter().categories(),
        "pageStyle": prefs.page_style(&filters),
        "soundAsset": soundscape_asset(&prefs.soundscape),
        "customFilters": filters,
    }))
}
