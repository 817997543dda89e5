use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tracker_core::{
    classify, ChangeKind, ClassifierConfig, FieldChange, Highlight, Observation, PageMeta,
    PatternRule, RuleSet, SiteState, TrackedSite,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 16, hour, 0, 0).unwrap()
}

fn page(title: &str, description: &str) -> PageMeta {
    let mut meta = PageMeta::new();
    meta.insert("title".to_string(), title.to_string());
    meta.insert("description".to_string(), description.to_string());
    meta
}

fn observe(body: &str, meta: PageMeta, hour: u32) -> Observation {
    Observation {
        body: body.to_string(),
        meta,
        observed_at: at(hour),
    }
}

fn promo_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.push(PatternRule::new("bonus", r"Welcome Bonus: \$[\d,]+").unwrap());
    rules
}

/// Pads `core` with filler so the raw body is exactly `size` bytes long.
fn body_of_size(core: &str, size: usize) -> String {
    let filler = size - core.len() - "<p></p>".len();
    format!("<p>{core}</p>{}", "x".repeat(filler))
}

/// Runs a first check so that `site` holds an established baseline.
fn established(url: &str, observation: &Observation, rules: &RuleSet) -> TrackedSite {
    let config = ClassifierConfig::default();
    classify(&TrackedSite::new(url), observation, &config, rules).updated
}

#[test]
fn first_sight_establishes_baseline_silently() {
    init_logging();
    let site = TrackedSite::new("https://casino.example/promo");
    let observation = observe("Welcome Bonus: $500", page("Promo", "Offers"), 8);

    let classification = classify(&site, &observation, &ClassifierConfig::default(), &promo_rules());

    assert_eq!(classification.result.change_kind, ChangeKind::None);
    assert!(classification.result.first_sight);
    assert!(classification.result.meta_diff.is_empty());
    assert!(classification.result.highlight_diff.is_empty());
    assert!(!classification.result.is_change());

    let baseline = classification.updated.baseline().expect("baseline established");
    assert_eq!(baseline.check_count, 1);
    assert_eq!(baseline.last_changed_at, None);
    assert_eq!(baseline.last_checked_at, at(8));
    assert_eq!(
        baseline.last_extracted_highlights,
        vec![Highlight::new("bonus", "Welcome Bonus: $500")]
    );
}

#[test]
fn unchanged_content_is_idempotent() {
    init_logging();
    let rules = promo_rules();
    let config = ClassifierConfig::default();
    let observation = observe("<h1>Live tables</h1>", page("Live", "Tables"), 8);
    let site = established("https://a.example", &observation, &rules);

    let first = classify(&site, &observe("<h1>Live tables</h1>", page("Live", "Tables"), 9), &config, &rules);
    let second = classify(
        &first.updated,
        &observe("<h1>Live tables</h1>", page("Live", "Tables"), 10),
        &config,
        &rules,
    );

    assert_eq!(first.result.change_kind, ChangeKind::None);
    assert_eq!(second.result.change_kind, ChangeKind::None);
    let fp_first = first.updated.baseline().unwrap();
    let fp_second = second.updated.baseline().unwrap();
    assert_eq!(fp_first.content_fingerprint, fp_second.content_fingerprint);
    assert_eq!(fp_first.meta_fingerprint, fp_second.meta_fingerprint);
    assert_eq!(fp_second.check_count, 3);
    assert_eq!(fp_second.last_checked_at, at(10));
}

#[test]
fn promotional_change_reports_content_size_and_highlights() {
    init_logging();
    let rules = promo_rules();
    let meta = page("Casino A", "Best bonuses");
    let before = observe(&body_of_size("Welcome Bonus: $500", 1110), meta.clone(), 8);
    let after = observe(&body_of_size("Welcome Bonus: $750", 1303), meta, 9);
    let site = established("https://a.example", &before, &rules);

    let classification = classify(&site, &after, &ClassifierConfig::default(), &rules);
    let result = classification.result;

    assert_eq!(result.change_kind, ChangeKind::Content);
    assert_eq!(result.content_size_delta, 193);
    assert!(result.meta_diff.is_empty());
    let added: Vec<_> = result.highlight_diff.added.iter().map(|h| h.text.as_str()).collect();
    let removed: Vec<_> = result.highlight_diff.removed.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(added, vec!["Welcome Bonus: $750"]);
    assert_eq!(removed, vec!["Welcome Bonus: $500"]);
    assert_eq!(
        classification.updated.baseline().unwrap().last_changed_at,
        Some(at(9))
    );
}

#[test]
fn title_change_is_a_meta_change() {
    init_logging();
    let rules = RuleSet::new();
    let body = "<main>Dealers online</main>";
    let site = established(
        "https://b.example",
        &observe(body, page("Live Blackjack", "Play now"), 8),
        &rules,
    );

    let classification = classify(
        &site,
        &observe(body, page("Live Blackjack — New Tables", "Play now"), 9),
        &ClassifierConfig::default(),
        &rules,
    );

    assert_eq!(classification.result.change_kind, ChangeKind::Meta);
    assert_eq!(classification.result.content_size_delta, 0);
    assert_eq!(classification.result.meta_diff.len(), 1);
    assert_eq!(
        classification.result.meta_diff["title"],
        FieldChange::new("Live Blackjack", "Live Blackjack — New Tables")
    );
}

#[test]
fn content_and_meta_together_are_both() {
    init_logging();
    let rules = RuleSet::new();
    let site = established("https://c.example", &observe("one", page("T1", "D"), 8), &rules);

    let classification = classify(
        &site,
        &observe("two", page("T2", "D"), 9),
        &ClassifierConfig::default(),
        &rules,
    );

    assert_eq!(classification.result.change_kind, ChangeKind::Both);
    assert_eq!(
        classification.result.meta_diff.keys().collect::<Vec<_>>(),
        vec!["title"]
    );
}

#[test]
fn title_appearing_later_is_a_meta_change() {
    init_logging();
    let rules = RuleSet::new();
    let site = established("https://d.example", &observe("body", PageMeta::new(), 8), &rules);
    let mut meta = PageMeta::new();
    meta.insert("title".to_string(), "Now titled".to_string());

    let classification = classify(
        &site,
        &observe("body", meta, 9),
        &ClassifierConfig::default(),
        &rules,
    );

    assert_eq!(classification.result.change_kind, ChangeKind::Meta);
    assert_eq!(
        classification.result.meta_diff["title"],
        FieldChange::new("", "Now titled")
    );
}

#[test]
fn empty_body_is_a_valid_observation() {
    init_logging();
    let rules = RuleSet::new();
    let site = established("https://e.example", &observe("   ", PageMeta::new(), 8), &rules);

    let classification = classify(
        &site,
        &observe("\n", PageMeta::new(), 9),
        &ClassifierConfig::default(),
        &rules,
    );

    assert_eq!(classification.result.change_kind, ChangeKind::None);
    assert_eq!(classification.result.content_size_delta, -2);
}

#[test]
fn whitespace_and_timestamp_noise_is_not_a_change() {
    init_logging();
    let rules = RuleSet::new();
    let site = established(
        "https://f.example",
        &observe("<p>Jackpot</p>\n<small>Last updated: 2025-09-16T08:30:26</small>", page("T", "D"), 8),
        &rules,
    );

    let classification = classify(
        &site,
        &observe("<p>Jackpot</p>   <small>Last updated: 2025-09-16T09:11:19</small>", page("T", "D"), 9),
        &ClassifierConfig::default(),
        &rules,
    );

    assert_eq!(classification.result.change_kind, ChangeKind::None);
}

#[test]
fn baseline_always_advances_to_latest_observation() {
    init_logging();
    let rules = promo_rules();
    let config = ClassifierConfig::default();
    let site = established("https://g.example", &observe("Welcome Bonus: $1", page("T", "D"), 8), &rules);

    let changed = classify(&site, &observe("Welcome Bonus: $2", page("T", "D"), 9), &config, &rules);
    let fresh = established("https://g.example", &observe("Welcome Bonus: $2", page("T", "D"), 9), &rules);

    let advanced = changed.updated.baseline().unwrap();
    let expected = fresh.baseline().unwrap();
    assert_eq!(advanced.content_fingerprint, expected.content_fingerprint);
    assert_eq!(advanced.meta_fingerprint, expected.meta_fingerprint);
    assert_eq!(advanced.last_extracted_highlights, expected.last_extracted_highlights);
    assert!(matches!(changed.updated.state, SiteState::Established(_)));
}

fn tagged_page(title: &str, keywords: &str) -> PageMeta {
    let mut meta = page(title, "Play now");
    meta.insert("keywords".to_string(), keywords.to_string());
    meta
}

fn narrowed_config() -> ClassifierConfig {
    ClassifierConfig {
        meta_fields: vec!["title".to_string(), "description".to_string()],
        ..ClassifierConfig::default()
    }
}

#[test]
fn narrowing_meta_fields_is_not_a_change() {
    init_logging();
    let rules = RuleSet::new();
    let observation = observe("<main>Slots</main>", tagged_page("Slots", "spins,bonus"), 8);
    let site = established("https://k.example", &observation, &rules);

    let classification = classify(
        &site,
        &observe("<main>Slots</main>", tagged_page("Slots", "spins,bonus"), 9),
        &narrowed_config(),
        &rules,
    );

    assert_eq!(classification.result.change_kind, ChangeKind::None);
    assert!(classification.result.meta_diff.is_empty());
    let SiteState::Established(baseline) = &classification.updated.state else {
        panic!("baseline missing");
    };
    assert_eq!(baseline.meta_fields, narrowed_config().meta_fields);

    let again = classify(
        &classification.updated,
        &observe("<main>Slots</main>", tagged_page("Slots", "other,words"), 10),
        &narrowed_config(),
        &rules,
    );
    assert_eq!(again.result.change_kind, ChangeKind::None);
}

#[test]
fn shared_field_change_survives_a_field_list_change() {
    init_logging();
    let rules = RuleSet::new();
    let site = established(
        "https://l.example",
        &observe("<main>Slots</main>", tagged_page("Slots", "spins"), 8),
        &rules,
    );

    let classification = classify(
        &site,
        &observe("<main>Slots</main>", tagged_page("Mega Slots", "spins"), 9),
        &narrowed_config(),
        &rules,
    );

    assert_eq!(classification.result.change_kind, ChangeKind::Meta);
    assert_eq!(
        classification.result.meta_diff.keys().collect::<Vec<_>>(),
        vec!["title"]
    );
}
