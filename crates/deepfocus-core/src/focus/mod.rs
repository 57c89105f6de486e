//! Focus-mode preferences: dimming, grayscale, content filtering and the
//! background soundscape.
//!
//! Each preference lives under its own store key so that a page can read the
//! one value it needs without pulling the rest.

mod overlay;

pub use overlay::{
    overlay_alpha, overlay_color, ElementCategory, PageStyle, FILTERED_ELEMENT_STYLE,
    MAX_OVERLAY_ALPHA,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, StoreError, ValidationError};
use crate::storage::{keys, Store, StoreExt};

pub const DEFAULT_DIMMING_LEVEL: u8 = 50;
pub const MAX_DIMMING_LEVEL: u8 = 100;
/// Soundscape id meaning "silence".
pub const NO_SOUNDSCAPE: &str = "none";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLevel {
    #[default]
    None,
    Light,
    Moderate,
    Extreme,
}

impl FilterLevel {
    pub const ALL: [FilterLevel; 4] = [
        FilterLevel::None,
        FilterLevel::Light,
        FilterLevel::Moderate,
        FilterLevel::Extreme,
    ];

    /// Element categories hidden at this level. Each level includes the
    /// previous one.
    pub fn categories(self) -> &'static [ElementCategory] {
        use ElementCategory::*;
        match self {
            FilterLevel::None => &[],
            FilterLevel::Light => &[Ads, Comments],
            FilterLevel::Moderate => &[Ads, Comments, SocialFeeds, Recommendations],
            FilterLevel::Extreme => &[
                Ads,
                Comments,
                SocialFeeds,
                Recommendations,
                Images,
                Sidebars,
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterLevel::None => "none",
            FilterLevel::Light => "light",
            FilterLevel::Moderate => "moderate",
            FilterLevel::Extreme => "extreme",
        }
    }
}

impl fmt::Display for FilterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FilterLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "filterLevel".into(),
                message: format!("unknown level '{s}', expected none, light, moderate or extreme"),
            })
    }
}

pub fn clamp_dimming(level: u32) -> u8 {
    level.min(u32::from(MAX_DIMMING_LEVEL)) as u8
}

/// Asset path of a soundscape, `None` for silence.
pub fn soundscape_asset(id: &str) -> Option<String> {
    let id = id.trim();
    (!id.is_empty() && id != NO_SOUNDSCAPE).then(|| format!("sounds/{id}.mp3"))
}

/// Everything the popup shows besides the timer itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub focus_mode: bool,
    pub gray_mode: bool,
    pub dimming_level: u8,
    pub filter_level: FilterLevel,
    pub soundscape: String,
    /// Minutes.
    pub work_duration: u32,
    /// Minutes.
    pub break_duration: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            focus_mode: false,
            gray_mode: false,
            dimming_level: DEFAULT_DIMMING_LEVEL,
            filter_level: FilterLevel::None,
            soundscape: NO_SOUNDSCAPE.to_string(),
            work_duration: 25,
            break_duration: 5,
        }
    }
}

impl Preferences {
    /// Read every preference key, falling back to the default per key.
    pub fn load(store: &dyn Store) -> Result<Self, StoreError> {
        let defaults = Self::default();
        Ok(Self {
            focus_mode: store.read(keys::FOCUS_MODE)?.unwrap_or(defaults.focus_mode),
            gray_mode: store.read(keys::GRAY_MODE)?.unwrap_or(defaults.gray_mode),
            dimming_level: store
                .read::<u32>(keys::DIMMING_LEVEL)?
                .map(clamp_dimming)
                .unwrap_or(defaults.dimming_level),
            filter_level: store
                .read(keys::FILTER_LEVEL)?
                .unwrap_or(defaults.filter_level),
            soundscape: store.read(keys::SOUNDSCAPE)?.unwrap_or(defaults.soundscape),
            work_duration: store
                .read(keys::WORK_DURATION)?
                .unwrap_or(defaults.work_duration),
            break_duration: store
                .read(keys::BREAK_DURATION)?
                .unwrap_or(defaults.break_duration),
        })
    }

    pub fn save(&self, store: &dyn Store) -> Result<(), StoreError> {
        store.set_many(&[
            (keys::FOCUS_MODE, self.focus_mode.into()),
            (keys::GRAY_MODE, self.gray_mode.into()),
            (keys::DIMMING_LEVEL, self.dimming_level.into()),
            (keys::FILTER_LEVEL, self.filter_level.as_str().into()),
            (keys::SOUNDSCAPE, self.soundscape.as_str().into()),
            (keys::WORK_DURATION, self.work_duration.into()),
            (keys::BREAK_DURATION, self.break_duration.into()),
        ])
    }

    /// Filter level in effect on pages, taking focus mode into account.
    pub fn effective_filter(&self) -> FilterLevel {
        if self.focus_mode {
            self.filter_level
        } else {
            FilterLevel::None
        }
    }

    /// Overlay and filter styling for pages. Custom selectors only apply
    /// while focus mode is on.
    pub fn page_style(&self, custom_filters: &[String]) -> PageStyle {
        let custom = if self.focus_mode { custom_filters } else { &[] };
        PageStyle::new(self.dimming_level, self.effective_filter(), custom)
    }
}

/// Selectors the user picked by pointing at elements.
pub fn custom_filters(store: &dyn Store) -> Result<Vec<String>, StoreError> {
    Ok(store.read(keys::CUSTOM_FILTERS)?.unwrap_or_default())
}

/// Append a selector. Blank selectors are rejected; duplicates are kept
/// once.
pub fn add_custom_filter(store: &dyn Store, selector: &str) -> Result<Vec<String>, CoreError> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(ValidationError::Empty("selector".into()).into());
    }
    let filters = store.modify(keys::CUSTOM_FILTERS, |filters: &mut Vec<String>| {
        if !filters.iter().any(|s| s == selector) {
            filters.push(selector.to_string());
        }
    })?;
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn empty_store_loads_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Preferences::load(&store).unwrap(), Preferences::default());
    }

    #[test]
    fn save_writes_one_key_per_preference() {
        let store = MemoryStore::new();
        let prefs = Preferences {
            focus_mode: true,
            filter_level: FilterLevel::Moderate,
            soundscape: "rain".into(),
            ..Preferences::default()
        };
        prefs.save(&store).unwrap();
        assert_eq!(store.get(keys::FILTER_LEVEL).unwrap(), Some("moderate".into()));
        assert_eq!(store.get(keys::FOCUS_MODE).unwrap(), Some(true.into()));
        assert_eq!(Preferences::load(&store).unwrap(), prefs);
    }

    #[test]
    fn stored_dimming_is_clamped() {
        let store = MemoryStore::new();
        store.write(keys::DIMMING_LEVEL, &180u32).unwrap();
        assert_eq!(Preferences::load(&store).unwrap().dimming_level, 100);
    }

    #[test]
    fn filter_levels_are_cumulative() {
        assert!(FilterLevel::None.categories().is_empty());
        for pair in FilterLevel::ALL.windows(2) {
            let (lower, higher) = (pair[0].categories(), pair[1].categories());
            assert!(lower.iter().all(|c| higher.contains(c)));
            assert!(higher.len() > lower.len());
        }
        assert_eq!(FilterLevel::Extreme.categories().len(), 6);
    }

    #[test]
    fn unknown_filter_level_is_rejected() {
        assert_eq!("Extreme".parse::<FilterLevel>().unwrap(), FilterLevel::Extreme);
        assert!("maximum".parse::<FilterLevel>().is_err());
    }

    #[test]
    fn filter_only_applies_in_focus_mode() {
        let mut prefs = Preferences {
            filter_level: FilterLevel::Light,
            ..Preferences::default()
        };
        assert_eq!(prefs.effective_filter(), FilterLevel::None);
        prefs.focus_mode = true;
        assert_eq!(prefs.effective_filter(), FilterLevel::Light);
    }

    #[test]
    fn page_style_is_empty_outside_focus_mode() {
        let custom = vec!["div.feed".to_string()];
        let mut prefs = Preferences {
            filter_level: FilterLevel::Light,
            ..Preferences::default()
        };
        assert!(prefs.page_style(&custom).filtered_selectors.is_empty());
        prefs.focus_mode = true;
        assert_eq!(prefs.page_style(&custom).filtered_selectors.len(), 3);
    }

    #[test]
    fn soundscape_assets() {
        assert_eq!(soundscape_asset("rain").as_deref(), Some("sounds/rain.mp3"));
        assert_eq!(soundscape_asset("none"), None);
    }

    #[test]
    fn custom_filters_dedupe() {
        let store = MemoryStore::new();
        add_custom_filter(&store, "#sidebar").unwrap();
        add_custom_filter(&store, " #sidebar ").unwrap();
        assert!(add_custom_filter(&store, "").is_err());
        assert_eq!(custom_filters(&store).unwrap(), vec!["#sidebar".to_string()]);
    }
}
