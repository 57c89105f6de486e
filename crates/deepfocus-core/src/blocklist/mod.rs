//! Blocklist of distracting sites.
//!
//! Sites are hostname fragments ("reddit.com"). A navigation is blocked when
//! the destination host contains any fragment, compared case-insensitively.
//! The same list is compiled into declarative redirect rules by [`rules`].

mod rules;

pub use rules::{
    compile_rules, sync_rules, Redirect, RedirectRule, RuleAction, RuleCondition, RuleTable,
    StoreRuleTable, BLOCKED_PAGE,
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{StoreError, ValidationError};
use crate::storage::{keys, Store, StoreExt};

/// Ordered, deduplicated list of blocked host fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockedSites(Vec<String>);

impl BlockedSites {
    /// Normalize and deduplicate, keeping first-seen order. Blank entries
    /// are dropped.
    pub fn new<I, S>(sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for site in sites {
            if let Some(site) = normalize(site.as_ref()) {
                list.insert(site);
            }
        }
        list
    }

    pub fn load(store: &dyn Store) -> Result<Self, StoreError> {
        let raw = store
            .read::<Vec<String>>(keys::BLOCKED_SITES)?
            .unwrap_or_default();
        Ok(Self::new(raw))
    }

    pub fn save(&self, store: &dyn Store) -> Result<(), StoreError> {
        store.write(keys::BLOCKED_SITES, &self.0)
    }

    /// Returns false when the site was already listed.
    pub fn add(&mut self, site: &str) -> Result<bool, ValidationError> {
        let site = normalize(site).ok_or_else(|| ValidationError::Empty("site".into()))?;
        Ok(self.insert(site))
    }

    /// Returns false when the site was not listed.
    pub fn remove(&mut self, site: &str) -> bool {
        let Some(site) = normalize(site) else {
            return false;
        };
        let before = self.0.len();
        self.0.retain(|s| *s != site);
        self.0.len() != before
    }

    pub fn contains(&self, site: &str) -> bool {
        normalize(site).is_some_and(|site| self.0.contains(&site))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First listed fragment contained in the destination host.
    pub fn matching_site(&self, destination: &str) -> Option<&str> {
        let host = destination_host(destination)?;
        self.iter().find(|site| host.contains(site))
    }

    pub fn is_blocked(&self, destination: &str) -> bool {
        self.matching_site(destination).is_some()
    }

    fn insert(&mut self, site: String) -> bool {
        if self.0.contains(&site) {
            return false;
        }
        self.0.push(site);
        true
    }
}

impl From<BlockedSites> for Vec<String> {
    fn from(sites: BlockedSites) -> Self {
        sites.0
    }
}

fn normalize(site: &str) -> Option<String> {
    let site = site.trim().to_lowercase();
    (!site.is_empty()).then_some(site)
}

/// Lowercased host of a destination. The scheme is optional: `example.com/x`
/// is read as `http://example.com/x`.
pub fn destination_host(destination: &str) -> Option<String> {
    let destination = destination.trim();
    if destination.is_empty() {
        return None;
    }
    let host = |url: Url| url.host_str().map(str::to_lowercase);
    Url::parse(destination)
        .ok()
        .and_then(host)
        .or_else(|| {
            Url::parse(&format!("http://{destination}"))
                .ok()
                .and_then(host)
        })
}

/// Convenience for a one-off check against a raw site list.
pub fn is_blocked<S: AsRef<str>>(destination: &str, sites: &[S]) -> bool {
    BlockedSites::new(sites).is_blocked(destination)
}

/// Outcome of the navigation hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum NavigationVerdict {
    Allow,
    Redirect {
        /// The fragment that matched.
        site: String,
        /// Blocked page to show instead.
        to: String,
    },
}

impl NavigationVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, NavigationVerdict::Redirect { .. })
    }
}
