//! Declarative redirect rules.
//!
//! The rule table is always rebuilt from scratch: every installed id is
//! removed and the freshly compiled set is added in one update. Ids are
//! dense, starting at 1, in blocklist order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BlockedSites;
use crate::error::{CoreError, Result, StoreError, ValidationError};
use crate::storage::{keys, Store, StoreExt};

/// Default page blocked navigations are redirected to.
pub const BLOCKED_PAGE: &str = "/blocked.html";

const RULE_PRIORITY: u32 = 1;
const MAIN_FRAME: &str = "main_frame";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRule {
    pub id: u32,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleAction {
    Redirect { redirect: Redirect },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub extension_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    /// `||host` anchors the match at a domain boundary.
    pub url_filter: String,
    pub resource_types: Vec<String>,
    pub is_url_filter_case_sensitive: bool,
}

impl RedirectRule {
    pub fn for_site(id: u32, site: &str, blocked_page: &str) -> Self {
        Self {
            id,
            priority: RULE_PRIORITY,
            action: RuleAction::Redirect {
                redirect: Redirect {
                    extension_path: blocked_page.to_string(),
                },
            },
            condition: RuleCondition {
                url_filter: format!("||{site}"),
                resource_types: vec![MAIN_FRAME.to_string()],
                is_url_filter_case_sensitive: false,
            },
        }
    }
}

pub fn compile_rules(sites: &BlockedSites, blocked_page: &str) -> Vec<RedirectRule> {
    sites
        .iter()
        .zip(1u32..)
        .map(|(site, id)| RedirectRule::for_site(id, site, blocked_page))
        .collect()
}

/// Installed dynamic rules.
pub trait RuleTable: Send + Sync {
    fn rules(&self) -> Result<Vec<RedirectRule>>;

    /// Remove `remove_ids` then add `add`, as one update. Adding an id that
    /// is still installed is an error and leaves the table untouched.
    fn update_rules(&self, remove_ids: &[u32], add: Vec<RedirectRule>) -> Result<()>;
}

/// Replace every installed rule with the compiled blocklist.
pub fn sync_rules(
    table: &dyn RuleTable,
    sites: &BlockedSites,
    blocked_page: &str,
) -> Result<Vec<RedirectRule>> {
    let remove_ids: Vec<u32> = table.rules()?.iter().map(|rule| rule.id).collect();
    let add = compile_rules(sites, blocked_page);
    table.update_rules(&remove_ids, add.clone())?;
    tracing::info!(
        removed = remove_ids.len(),
        installed = add.len(),
        "blocking rules synced"
    );
    Ok(add)
}

/// Rule table persisted under `blockingRules` in the shared store.
pub struct StoreRuleTable<S: ?Sized> {
    store: std::sync::Arc<S>,
}

impl<S: Store + ?Sized> StoreRuleTable<S> {
    pub fn new(store: std::sync::Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: Store + ?Sized> RuleTable for StoreRuleTable<S> {
    fn rules(&self) -> Result<Vec<RedirectRule>> {
        Ok(self
            .store
            .read::<Vec<RedirectRule>>(keys::BLOCKING_RULES)?
            .unwrap_or_default())
    }

    fn update_rules(&self, remove_ids: &[u32], add: Vec<RedirectRule>) -> Result<()> {
        let remove: HashSet<u32> = remove_ids.iter().copied().collect();
        let mut conflict = None;

        self.store.update(keys::BLOCKING_RULES, &mut |current| {
            let untouched = current.clone().unwrap_or(Value::Null);
            let mut installed: Vec<RedirectRule> = match current {
                Some(Value::Null) | None => Vec::new(),
                Some(json) => serde_json::from_value(json).map_err(corrupt)?,
            };

            installed.retain(|rule| !remove.contains(&rule.id));
            let mut ids: HashSet<u32> = installed.iter().map(|rule| rule.id).collect();
            if let Some(rule) = add.iter().find(|rule| !ids.insert(rule.id)) {
                conflict = Some(rule.id);
                return Ok(untouched);
            }
            installed.extend(add.iter().cloned());
            installed.sort_by_key(|rule| rule.id);
            serde_json::to_value(&installed).map_err(corrupt)
        })?;

        match conflict {
            Some(id) => Err(CoreError::Validation(ValidationError::InvalidValue {
                field: "id".into(),
                message: format!("rule {id} is already installed"),
            })),
            None => Ok(()),
        }
    }
}

fn corrupt(err: serde_json::Error) -> StoreError {
    StoreError::Corrupt {
        key: keys::BLOCKING_RULES.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn table() -> StoreRuleTable<MemoryStore> {
        StoreRuleTable::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn ids_are_dense_from_one() {
        let sites = BlockedSites::new(["a.com", "b.com", "c.com"]);
        let ids: Vec<u32> = compile_rules(&sites, BLOCKED_PAGE)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn rule_wire_shape() {
        let rule = RedirectRule::for_site(1, "example.com", BLOCKED_PAGE);
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "id": 1,
                "priority": 1,
                "action": {"type": "redirect", "redirect": {"extensionPath": "/blocked.html"}},
                "condition": {
                    "urlFilter": "||example.com",
                    "resourceTypes": ["main_frame"],
                    "isUrlFilterCaseSensitive": false
                }
            })
        );
    }

    #[test]
    fn sync_replaces_the_whole_table() {
        let table = table();
        sync_rules(&table, &BlockedSites::new(["a.com", "b.com", "c.com"]), BLOCKED_PAGE).unwrap();
        sync_rules(&table, &BlockedSites::new(["b.com"]), BLOCKED_PAGE).unwrap();

        let rules = table.rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, 1);
        assert_eq!(rules[0].condition.url_filter, "||b.com");
    }

    #[test]
    fn empty_blocklist_clears_rules() {
        let table = table();
        sync_rules(&table, &BlockedSites::new(["a.com"]), BLOCKED_PAGE).unwrap();
        sync_rules(&table, &BlockedSites::default(), BLOCKED_PAGE).unwrap();
        assert!(table.rules().unwrap().is_empty());
    }

    #[test]
    fn duplicate_id_is_rejected_without_changes() {
        let table = table();
        let first = compile_rules(&BlockedSites::new(["a.com"]), BLOCKED_PAGE);
        table.update_rules(&[], first.clone()).unwrap();
        assert!(table.update_rules(&[], first.clone()).is_err());
        assert_eq!(table.rules().unwrap(), first);
    }
}
