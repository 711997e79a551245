use kira_neurovoice::catalog::{self, Catalog};
use kira_neurovoice::config::EngineConfig;
use kira_neurovoice::crossval::{
    CvMethod, FoldResult, FoldStatus, ReliabilityStatus, aggregate_results, leave_one_out,
    split_half,
};
use kira_neurovoice::scores::session::SessionInput;
use kira_neurovoice::scores::{AlertLevel, FeatureVector};

fn sessions(catalog: &Catalog, n: usize) -> Vec<SessionInput> {
    (0..n)
        .map(|i| {
            let features = FeatureVector::uniform(catalog, 0.5 + 0.01 * (i % 3) as f64);
            let mut s = SessionInput::new(features);
            s.id = Some(format!("s{i}"));
            s
        })
        .collect()
}

fn fold(index: usize, composite: f64) -> FoldResult {
    FoldResult {
        session_index: index,
        session_id: format!("s{index}"),
        status: FoldStatus::Analyzed,
        baseline_sessions: 10,
        composite: Some(composite),
        alert_level: Some(AlertLevel::from_composite(composite)),
        domain_scores: None,
        sentinel_alerts: Vec::new(),
        topic_genre: None,
        label: None,
    }
}

#[test]
fn loo_needs_minimum_sessions() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let res = leave_one_out(&catalog, &sessions(&catalog, 4), None, &cfg);
    assert_eq!(res.analyzed, 0);
    assert!(res.aggregate.is_none());
    assert!(res.error.unwrap().contains("Insufficient"));
}

#[test]
fn loo_scores_every_session() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let res = leave_one_out(&catalog, &sessions(&catalog, 12), Some(70.0), &cfg);
    assert_eq!(res.method, CvMethod::LooCv);
    assert_eq!(res.total_sessions, 12);
    assert_eq!(res.analyzed, 12);
    assert!(res.error.is_none());
    for (i, fold) in res.results.iter().enumerate() {
        assert_eq!(fold.session_index, i);
        assert_eq!(fold.session_id, format!("s{i}"));
        assert_eq!(fold.baseline_sessions, 11);
    }
    let agg = res.aggregate.unwrap();
    assert_eq!(agg.sessions_analyzed, 12);
    assert!(agg.mean_composite.is_some());
}

#[test]
fn split_half_needs_twice_the_minimum() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let res = split_half(&catalog, &sessions(&catalog, 8), None, &cfg);
    assert!(res.error.is_some());
    assert_eq!(res.even_count, 4);
    assert_eq!(res.odd_count, 4);
    assert!(res.reliability.is_none());
}

#[test]
fn split_half_pairs_halves() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let res = split_half(&catalog, &sessions(&catalog, 12), None, &cfg);
    assert!(res.error.is_none());
    assert_eq!(res.even_on_odd.len(), 6);
    assert_eq!(res.odd_on_even.len(), 6);
    assert!(res.even_on_odd.iter().all(|f| f.session_index % 2 == 0));
    assert_eq!(
        res.even_on_odd[0].label.as_deref(),
        Some("even_on_odd_baseline")
    );
    let rel = res.reliability.unwrap();
    assert_eq!(rel.pairs_used, 6);
    assert_eq!(rel.status, ReliabilityStatus::Ok);
}

#[test]
fn aggregate_flags_outliers() {
    let mut results: Vec<FoldResult> = (0..9).map(|i| fold(i, 0.0)).collect();
    results.push(fold(9, -1.0));
    let agg = aggregate_results(&results);
    assert_eq!(agg.sessions_analyzed, 10);
    assert!((agg.mean_composite.unwrap() + 0.1).abs() < 1e-9);
    assert!((agg.std_composite.unwrap() - 0.3).abs() < 1e-9);
    assert_eq!(agg.outlier_sessions.len(), 1);
    assert_eq!(agg.outlier_sessions[0].session_index, 9);
    assert_eq!(agg.consistency, Some(0.0));
}

#[test]
fn aggregate_of_nothing() {
    let mut skipped = fold(0, 0.0);
    skipped.status = FoldStatus::InsufficientBaseline;
    let agg = aggregate_results(&[skipped]);
    assert_eq!(agg.sessions_analyzed, 0);
    assert_eq!(agg.alert_level, AlertLevel::Unknown);
    assert!(agg.consistency.is_none());
}

#[test]
fn steady_composites_are_consistent() {
    let results: Vec<FoldResult> = (0..4).map(|i| fold(i, -1.0)).collect();
    let agg = aggregate_results(&results);
    assert_eq!(agg.consistency, Some(1.0));
    assert_eq!(agg.alert_level, AlertLevel::Yellow);
}
