use kira_neurovoice::catalog::Domain;
use kira_neurovoice::differential::patterns::{
    FtdVariant, PRAGMATIC_IDS, TemporalPattern, count_step_drops, detect_ad_cascade,
    detect_ftd_pattern, detect_lbd_pattern, detect_temporal_pattern, detect_vci_pattern,
};
use kira_neurovoice::scores::{DomainScores, HistoryRecord, ZScores};

fn timeline(composites: &[f64]) -> Vec<HistoryRecord> {
    composites
        .iter()
        .map(|c| HistoryRecord::new(*c, DomainScores::uniform(0.0)))
        .collect()
}

fn domains(pairs: &[(Domain, f64)]) -> DomainScores {
    let mut scores = DomainScores::uniform(0.0);
    for (d, v) in pairs {
        scores.set(*d, Some(*v), 1.0);
    }
    scores
}

#[test]
fn temporal_pattern_variants() {
    assert_eq!(
        detect_temporal_pattern(&timeline(&[0.0, -0.1, -0.2])),
        TemporalPattern::InsufficientData
    );

    match detect_temporal_pattern(&timeline(&[0.0, -0.1, -0.2, -0.3, -0.4, -0.5])) {
        TemporalPattern::MonotonicDecline { weeks, decline_ratio } => {
            assert_eq!(weeks, 6);
            assert!((decline_ratio - 1.0).abs() < 1e-12);
        }
        other => panic!("unexpected pattern {other:?}"),
    }

    assert_eq!(
        detect_temporal_pattern(&timeline(&[0.0, 0.2, 0.0, 0.2, 0.0])),
        TemporalPattern::Episodic { oscillations: 3 }
    );

    match detect_temporal_pattern(&timeline(&[0.0, 0.0, 0.0, -0.6, -0.6])) {
        TemporalPattern::AcuteDrop { drop_at, magnitude } => {
            assert_eq!(drop_at, 3);
            assert!((magnitude + 0.6).abs() < 1e-9);
        }
        other => panic!("unexpected pattern {other:?}"),
    }

    assert!(matches!(
        detect_temporal_pattern(&timeline(&[0.1, 0.1, 0.1, 0.1])),
        TemporalPattern::Stable { .. }
    ));
    assert_eq!(
        detect_temporal_pattern(&timeline(&[0.0, 0.3, 0.3, 0.3, -0.2])),
        TemporalPattern::Unclear
    );
}

#[test]
fn step_drops_need_a_plateau() {
    assert_eq!(count_step_drops(&timeline(&[0.0, 0.0, -0.5, -0.5, -0.5])), 1);
    assert_eq!(count_step_drops(&timeline(&[0.0, 0.0, 0.0, -0.5])), 0);
    assert_eq!(count_step_drops(&timeline(&[0.0, -0.5, -0.5])), 0);
}

#[test]
fn ad_cascade_stages() {
    let none = detect_ad_cascade(&domains(&[(Domain::Lexical, -0.6)]));
    assert!(!none.detected);

    let s1 = detect_ad_cascade(&domains(&[(Domain::Lexical, -0.6), (Domain::Semantic, -0.6)]));
    assert!(s1.detected);
    assert_eq!(s1.stage, 1);
    assert!((s1.confidence - 0.8).abs() < 1e-12);

    let s3 = detect_ad_cascade(&domains(&[
        (Domain::Lexical, -0.6),
        (Domain::Semantic, -0.6),
        (Domain::Syntactic, -1.0),
        (Domain::Temporal, -0.6),
    ]));
    assert_eq!(s3.stage, 3);
    assert!(!s3.order_preserved);
    assert!((s3.confidence - 0.4).abs() < 1e-12);
}

#[test]
fn lbd_pattern_detected() {
    let mut z = ZScores::new();
    z.insert("TMP_VARIABILITY".to_string(), -1.0);
    let d = domains(&[(Domain::PdMotor, -0.5), (Domain::Semantic, -0.5)]);
    let lbd = detect_lbd_pattern(&d, &z, &[]);
    assert!(lbd.detected);
    assert_eq!(lbd.features.len(), 3);
    assert!((lbd.score - 0.8).abs() < 1e-12);
    assert!(lbd.differentials.contains_key("vs_pd"));
    assert!(lbd.differentials.contains_key("vs_ad"));
}

#[test]
fn ftd_variants() {
    let mut z: ZScores = PRAGMATIC_IDS.iter().map(|id| (id.to_string(), -1.0)).collect();
    let d = domains(&[]);
    let behavioral = detect_ftd_pattern(&d, &z);
    assert!(behavioral.detected);
    assert_eq!(behavioral.variant, Some(FtdVariant::Behavioral));

    z.insert("LEX_WORD_FREQ".to_string(), -1.0);
    let mixed = detect_ftd_pattern(&d, &z);
    assert_eq!(mixed.variant, Some(FtdVariant::Mixed));
    assert!((mixed.score - 0.75).abs() < 1e-12);

    let quiet = detect_ftd_pattern(&d, &ZScores::new());
    assert!(!quiet.detected);
    assert_eq!(quiet.variant, None);
}

#[test]
fn vci_pattern_detected() {
    let d = domains(&[(Domain::Executive, -0.6), (Domain::Temporal, -0.4)]);
    let vci = detect_vci_pattern(&d, &[]);
    assert!(vci.detected);
    assert_eq!(vci.step_count, 0);
    assert!((vci.score - 0.45).abs() < 1e-12);
}
