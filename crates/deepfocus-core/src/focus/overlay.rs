//! Overlay and content-filter values a page renderer needs.
//!
//! Rendering lives outside this crate. These helpers only fix the numbers and
//! selectors so every renderer agrees on them.

use serde::{Deserialize, Serialize};

use super::FilterLevel;

/// Overlay opacity at 100% dimming.
pub const MAX_OVERLAY_ALPHA: f64 = 0.7;

/// CSS filter applied to filtered elements.
pub const FILTERED_ELEMENT_STYLE: &str = "grayscale(100%) opacity(0.5)";

/// Alpha of the black overlay for a dimming level. Levels above 100 are
/// treated as 100.
pub fn overlay_alpha(dimming_level: u8) -> f64 {
    f64::from(dimming_level.min(100)) / 100.0 * MAX_OVERLAY_ALPHA
}

/// `rgba(...)` background for the overlay element.
pub fn overlay_color(dimming_level: u8) -> String {
    format!("rgba(0, 0, 0, {})", overlay_alpha(dimming_level))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementCategory {
    Ads,
    Comments,
    SocialFeeds,
    Recommendations,
    Images,
    Sidebars,
}

impl ElementCategory {
    pub fn selector(self) -> &'static str {
        match self {
            ElementCategory::Ads => {
                r#"[class*="ad"], [id*="ad"], [aria-label*="advertisement"]"#
            }
            ElementCategory::Comments => r#"#comments, .comments, [class*="comment-"]"#,
            ElementCategory::SocialFeeds => r#".feed, [class*="feed"], [class*="social"]"#,
            ElementCategory::Recommendations => r#"[class*="recommend"], [class*="suggested"]"#,
            ElementCategory::Images => r#"img:not([class*="logo"])"#,
            ElementCategory::Sidebars => r#"aside, [class*="sidebar"]"#,
        }
    }
}

/// Everything a page applies for one set of preferences.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStyle {
    pub overlay_alpha: f64,
    pub overlay_color: String,
    /// Category selectors for the filter level, then the custom ones.
    pub filtered_selectors: Vec<String>,
    pub filtered_style: &'static str,
}

impl PageStyle {
    pub fn new(dimming_level: u8, filter: FilterLevel, custom: &[String]) -> Self {
        let filtered_selectors = filter
            .categories()
            .iter()
            .map(|category| category.selector().to_string())
            .chain(custom.iter().cloned())
            .collect();
        Self {
            overlay_alpha: overlay_alpha(dimming_level),
            overlay_color: overlay_color(dimming_level),
            filtered_selectors,
            filtered_style: FILTERED_ELEMENT_STYLE,
        }
    }
}
