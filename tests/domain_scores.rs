use std::collections::BTreeMap;

use kira_neurovoice::catalog::{self, Condition, Domain};
use kira_neurovoice::scores::cascade::detect_cascade;
use kira_neurovoice::scores::confounder::{ConfounderFlags, active_confounders, apply_confounders};
use kira_neurovoice::scores::domain::{compute_composite, compute_domain_scores};
use kira_neurovoice::scores::{AlertLevel, DomainScores, ZScores};

fn flags(keys: &[&str]) -> ConfounderFlags {
    keys.iter().map(|k| (k.to_string(), true)).collect()
}

#[test]
fn domain_scores_average_members() {
    let catalog = catalog::load_builtin().unwrap();
    let z: ZScores = catalog
        .domain_members(Domain::Lexical)
        .map(|ind| (ind.id.clone(), -1.0))
        .collect();

    let scores = compute_domain_scores(&catalog, &z, &BTreeMap::new());
    assert!((scores.get(Domain::Lexical).unwrap() + 1.0).abs() < 1e-9);
    assert!((scores.confidence(Domain::Lexical) - 1.0).abs() < 1e-12);
    assert_eq!(scores.get(Domain::Semantic), None);
    assert_eq!(scores.present_count(), 1);
}

#[test]
fn composite_scaling() {
    assert_eq!(compute_composite(&DomainScores::empty()), 0.0);
    assert!(compute_composite(&DomainScores::uniform(0.0)).abs() < 1e-12);
    assert!((compute_composite(&DomainScores::uniform(-1.0)) + 2.2).abs() < 1e-9);
    // lexical alone: weight 0.13, redistribution capped at 2x
    let single = DomainScores::from_pairs(&[(Domain::Lexical, -1.0)]);
    assert!((compute_composite(&single) + 0.572).abs() < 1e-9);
}

#[test]
fn alert_thresholds() {
    assert_eq!(AlertLevel::from_composite(0.3), AlertLevel::Green);
    assert_eq!(AlertLevel::from_composite(-0.5), AlertLevel::Green);
    assert_eq!(AlertLevel::from_composite(-0.51), AlertLevel::Yellow);
    assert_eq!(AlertLevel::from_composite(-1.0), AlertLevel::Yellow);
    assert_eq!(AlertLevel::from_composite(-1.2), AlertLevel::Orange);
    assert_eq!(AlertLevel::from_composite(-1.6), AlertLevel::Red);
}

#[test]
fn illness_halves_all_domains() {
    let scores = DomainScores::uniform(-1.0);
    let adj = apply_confounders(&scores, &flags(&["illness", "poor_sleep"]));
    assert!((adj.global_weight - 0.5).abs() < 1e-12);
    assert!((adj.domain_scores.get(Domain::Memory).unwrap() + 0.5).abs() < 1e-12);
}

#[test]
fn medication_change_targets_motor() {
    let scores = DomainScores::uniform(-1.0);
    let adj = apply_confounders(&scores, &flags(&["medication_change"]));
    assert!((adj.global_weight - 0.3).abs() < 1e-12);
    assert!((adj.domain_scores.get(Domain::PdMotor).unwrap() + 0.15).abs() < 1e-12);
    assert!((adj.domain_scores.get(Domain::Lexical).unwrap() + 0.3).abs() < 1e-12);
}

#[test]
fn cold_illness_only_touches_acoustic() {
    let scores = DomainScores::uniform(-1.0);
    let adj = apply_confounders(&scores, &flags(&["cold_illness", "made_up"]));
    assert_eq!(adj.global_weight, 1.0);
    assert!((adj.domain_scores.get(Domain::Acoustic).unwrap() + 0.3).abs() < 1e-12);
    assert!((adj.domain_scores.get(Domain::Lexical).unwrap() + 1.0).abs() < 1e-12);
    assert_eq!(active_confounders(&flags(&["made_up"])).len(), 0);
}

#[test]
fn inactive_flags_are_ignored() {
    let scores = DomainScores::uniform(-1.0);
    let mut f = ConfounderFlags::new();
    f.insert("illness".to_string(), false);
    let adj = apply_confounders(&scores, &f);
    assert_eq!(adj.domain_scores, scores);
}

#[test]
fn alzheimer_cascade_progresses() {
    let stage1 = DomainScores::from_pairs(&[(Domain::Lexical, -0.8), (Domain::Semantic, -0.8)]);
    let report = detect_cascade(&stage1);
    assert_eq!(report.max_stage(Condition::Alzheimer), Some(1));
    assert_eq!(report.alzheimer[0].name, "semantic_memory_involvement");

    let stage2 = DomainScores::from_pairs(&[
        (Domain::Lexical, -0.8),
        (Domain::Semantic, -0.8),
        (Domain::Syntactic, -0.6),
    ]);
    assert_eq!(detect_cascade(&stage2).max_stage(Condition::Alzheimer), Some(2));
}

#[test]
fn parkinson_cascade_needs_audio() {
    let text_only = DomainScores::from_pairs(&[(Domain::Temporal, -1.0)]);
    assert!(detect_cascade(&text_only).parkinson.is_empty());

    let monopitch = DomainScores::from_pairs(&[(Domain::Acoustic, -0.4), (Domain::PdMotor, 0.0)]);
    let report = detect_cascade(&monopitch);
    assert_eq!(report.parkinson.len(), 1);
    assert_eq!(report.parkinson[0].name, "monopitch_only");
    assert_eq!(report.parkinson[0].stage, 0);
}

#[test]
fn depression_cascade_and_severity_order() {
    let scores = DomainScores::from_pairs(&[(Domain::Affective, -0.5), (Domain::Temporal, -0.5)]);
    let report = detect_cascade(&scores);
    assert_eq!(report.max_stage(Condition::Depression), Some(1));
    for pair in report.all.windows(2) {
        assert!(pair[0].severity >= pair[1].severity);
    }
}
