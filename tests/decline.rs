use kira_neurovoice::catalog::Domain;
use kira_neurovoice::config::EngineConfig;
use kira_neurovoice::scores::decline::{ProfileType, compute_decline_profile};
use kira_neurovoice::scores::{DomainScores, HistoryRecord};

fn record(lexical: f64) -> HistoryRecord {
    let mut scores = DomainScores::uniform(0.0);
    scores.set(Domain::Lexical, Some(lexical), 1.0);
    HistoryRecord::new(0.0, scores)
}

#[test]
fn short_history_gives_empty_profile() {
    let cfg = EngineConfig::default_v1();
    let history = vec![record(0.0), record(-0.1)];
    let profile = compute_decline_profile(&history, Some(70.0), &cfg);
    assert!(profile.domain_velocities.is_empty());
    assert_eq!(profile.profile_type, ProfileType::Stable);
    assert!(profile.leading_edge.is_none());
    assert!(!profile.age_consistent);
}

#[test]
fn lexical_decline_leads_ad_cascade() {
    let cfg = EngineConfig::default_v1();
    let history: Vec<HistoryRecord> = (0..14).map(|i| record(-0.01 * i as f64)).collect();
    let profile = compute_decline_profile(&history, None, &cfg);

    assert!((profile.domain_velocities[&Domain::Lexical] + 0.07).abs() < 1e-9);
    assert_eq!(profile.domain_velocities[&Domain::Semantic], 0.0);
    assert_eq!(profile.leading_edge, Some(Domain::Lexical));
    assert_eq!(profile.predicted_next, Some(Domain::Semantic));
    assert_eq!(profile.profile_type, ProfileType::AdLike);
    assert!(profile.acceleration.is_none());
    assert!(!profile.age_consistent);
    assert!(profile.excess_decline.as_ref().unwrap()[&Domain::Lexical] > 0.06);
}

#[test]
fn flat_history_is_age_consistent() {
    let cfg = EngineConfig::default_v1();
    let history: Vec<HistoryRecord> = (0..28).map(|_| record(0.0)).collect();
    let profile = compute_decline_profile(&history, None, &cfg);

    assert_eq!(profile.profile_type, ProfileType::Stable);
    assert!(profile.leading_edge.is_none());
    assert!(profile.acceleration.is_some());
    assert!(profile.age_consistent);
}

#[test]
fn only_last_four_weeks_are_used() {
    let cfg = EngineConfig::default_v1();
    // a steep early drop followed by 28 flat sessions
    let mut history: Vec<HistoryRecord> = (0..14).map(|i| record(-0.2 * i as f64)).collect();
    history.extend((0..28).map(|_| record(-3.0)));
    let profile = compute_decline_profile(&history, None, &cfg);
    assert_eq!(profile.domain_velocities[&Domain::Lexical], 0.0);
}
