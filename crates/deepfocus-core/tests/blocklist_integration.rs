//! Integration tests for blocklist editing, rule sync and the navigation hook.

use std::sync::Arc;

use deepfocus_core::blocklist::{compile_rules, sync_rules, BLOCKED_PAGE};
use deepfocus_core::stats::TODAY;
use deepfocus_core::{
    BlockedSites, Broadcaster, Command, Database, Event, FocusService, NavigationVerdict,
    Response, RuleTable, ServiceOptions, Store, StoreRuleTable, TracingNotifier,
};

const NOW: i64 = 1_717_400_000_000;

fn service_over(store: Arc<dyn Store>) -> FocusService {
    FocusService::new(
        store,
        Broadcaster::new(),
        Arc::new(TracingNotifier),
        ServiceOptions::default(),
    )
    .unwrap()
}

#[test]
fn test_rule_table_tracks_list_edits() {
    let store: Arc<dyn Store> = Arc::new(Database::open_memory().unwrap());
    let table = StoreRuleTable::new(store.clone());

    let sites = BlockedSites::new(["facebook.com", "twitter.com", "youtube.com"]);
    sync_rules(&table, &sites, BLOCKED_PAGE).unwrap();
    assert_eq!(table.rules().unwrap().len(), 3);

    let sites = BlockedSites::new(["twitter.com"]);
    let installed = sync_rules(&table, &sites, BLOCKED_PAGE).unwrap();
    assert_eq!(table.rules().unwrap(), installed);
    assert_eq!(installed, compile_rules(&sites, BLOCKED_PAGE));
}

#[test]
fn test_navigation_hook_counts_every_hit() {
    let store: Arc<dyn Store> = Arc::new(Database::open_memory().unwrap());
    let mut service = service_over(store);
    let mut sub = service.bus().subscribe();

    service
        .handle(
            Command::UpdateBlockedSites {
                sites: vec!["example.com".into()],
            },
            NOW,
        )
        .unwrap();

    for url in ["https://sub.example.com/path", "http://EXAMPLE.com", "example.com/x"] {
        let reply = service
            .handle(Command::Navigate { url: url.into() }, NOW)
            .unwrap();
        match reply {
            Some(Response::Navigation { verdict }) => assert!(verdict.is_blocked(), "{url}"),
            other => panic!("unexpected reply {other:?}"),
        }
    }
    assert_eq!(
        service.handle_navigation("https://example.org", NOW).unwrap(),
        NavigationVerdict::Allow
    );

    let stats = service.stats(NOW).unwrap();
    assert_eq!(stats.daily_stats.distractions, 3);
    assert_eq!(stats.analytics_data.blocked_sites_history[TODAY], 3);
    assert_eq!(stats.focus_score, 85);

    let stats_events = sub
        .drain()
        .into_iter()
        .filter(|e| matches!(e, Event::StatsUpdate { .. }))
        .count();
    assert_eq!(stats_events, 3);
}

#[test]
fn test_empty_list_allows_everything() {
    let store: Arc<dyn Store> = Arc::new(Database::open_memory().unwrap());
    let mut service = service_over(store);
    assert_eq!(
        service.handle_navigation("https://anything.test", NOW).unwrap(),
        NavigationVerdict::Allow
    );
    assert_eq!(service.stats(NOW).unwrap().daily_stats.distractions, 0);
}

#[test]
fn test_custom_blocked_page() {
    let store: Arc<dyn Store> = Arc::new(Database::open_memory().unwrap());
    let options = ServiceOptions {
        blocked_page: "/pages/stop.html".into(),
        ..ServiceOptions::default()
    };
    let mut service =
        FocusService::new(store, Broadcaster::new(), Arc::new(TracingNotifier), options).unwrap();
    let rules = service.add_blocked_site("news.site").unwrap();
    assert_eq!(
        serde_json::to_value(&rules[0]).unwrap()["action"]["redirect"]["extensionPath"],
        "/pages/stop.html"
    );
    match service.handle_navigation("news.site", NOW).unwrap() {
        NavigationVerdict::Redirect { to, .. } => assert_eq!(to, "/pages/stop.html"),
        NavigationVerdict::Allow => panic!("expected redirect"),
    }
}
