use std::fs;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tracker_core::{
    BaselineStore, ChangeKind, Checker, ClassifierConfig, FetchAttempt, Observation, PageMeta,
    RuleSet,
};
use tracker_engine::{JsonBaselineStore, PersistError};

fn observation(body: &str) -> Observation {
    let mut meta = PageMeta::new();
    meta.insert("title".to_string(), "Casino Promotions".to_string());
    Observation {
        body: body.to_string(),
        meta,
        observed_at: Utc.with_ymd_and_hms(2025, 9, 16, 8, 0, 0).unwrap(),
    }
}

#[test]
fn missing_file_opens_empty() {
    let temp = TempDir::new().unwrap();
    let store = JsonBaselineStore::open(temp.path().join("baselines.json")).unwrap();
    assert!(store.is_empty());
    assert!(store.load("https://a.example/").unwrap().is_uninitialized());
}

#[test]
fn malformed_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("baselines.json");
    fs::write(&path, "{ not json").unwrap();

    let err = JsonBaselineStore::open(&path).unwrap_err();
    assert!(matches!(err, PersistError::Malformed { .. }));
}

#[test]
fn baselines_survive_reopening() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state").join("baselines.json");
    let checker = Checker::new(ClassifierConfig::default(), RuleSet::new());
    let url = "https://a.example/";

    {
        let mut store = JsonBaselineStore::open(&path).unwrap();
        let result = checker.check(
            &mut store,
            FetchAttempt::fetched(url, observation("<p>Welcome bonus $500</p>")),
        );
        assert!(result.first_sight);
    }

    let mut reopened = JsonBaselineStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    let baseline = reopened.get(url).unwrap().baseline().unwrap().clone();
    assert_eq!(baseline.check_count, 1);
    assert_eq!(
        baseline.last_meta.get("title").map(String::as_str),
        Some("Casino Promotions")
    );

    let result = checker.check(
        &mut reopened,
        FetchAttempt::fetched(url, observation("<p>Welcome bonus $500</p>")),
    );
    assert!(!result.first_sight);
    assert_eq!(result.change_kind, ChangeKind::None);
}

#[test]
fn remove_forgets_a_site_on_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("baselines.json");
    let checker = Checker::new(ClassifierConfig::default(), RuleSet::new());

    let mut store = JsonBaselineStore::open(&path).unwrap();
    checker.check(
        &mut store,
        FetchAttempt::fetched("https://a.example/", observation("<p>a</p>")),
    );
    checker.check(
        &mut store,
        FetchAttempt::fetched("https://b.example/", observation("<p>b</p>")),
    );

    assert!(store.remove("https://a.example/").unwrap());
    assert!(!store.remove("https://a.example/").unwrap());

    let reopened = JsonBaselineStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get("https://b.example/").is_some());
}

#[test]
fn uninitialized_sites_are_not_written() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("baselines.json");
    let checker = Checker::new(ClassifierConfig::default(), RuleSet::new());

    let mut store = JsonBaselineStore::open(&path).unwrap();
    checker.check(
        &mut store,
        FetchAttempt::failed("https://down.example/", "network error"),
    );

    assert!(store.is_empty());
    assert!(!path.exists());
}
