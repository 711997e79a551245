use kira_neurovoice::catalog::{self, Domain};
use kira_neurovoice::config::EngineConfig;
use kira_neurovoice::pd::cascade::{Severity, pd_cascade};
use kira_neurovoice::pd::parkinsonism::{Parkinsonism, differentiate_parkinsonism};
use kira_neurovoice::pd::signature::detect_pd_signature;
use kira_neurovoice::pd::staging::{HyStage, ProgressionVelocity, progression_velocity, stage_pd};
use kira_neurovoice::pd::subtype::{PdSubtype, classify_pd_subtype};
use kira_neurovoice::pd::updrs::predict_updrs;
use kira_neurovoice::pd::{pd_scale, pd_triggered, run_pd_analysis};
use kira_neurovoice::scores::sentinel::check_sentinels;
use kira_neurovoice::scores::{DomainScores, HistoryRecord, ZScores};

fn z(pairs: &[(&str, f64)]) -> ZScores {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

const QUARTET: [&str; 4] = ["PDM_PPE", "PDM_RPDE", "PDM_DFA", "ACU_HNR"];

#[test]
fn scale_maps_domain_scores() {
    assert!((pd_scale(0.0) - 0.6).abs() < 1e-12);
    assert!((pd_scale(-1.0) - 0.3).abs() < 1e-12);
    assert_eq!(pd_scale(-5.0), 0.0);
    assert_eq!(pd_scale(5.0), 1.0);
}

#[test]
fn full_quartet_signature() {
    let pairs: Vec<(&str, f64)> = QUARTET.iter().map(|id| (*id, -1.0)).collect();
    let sig = detect_pd_signature(&z(&pairs));
    assert!(sig.detected);
    assert!((sig.confidence - 1.0).abs() < 1e-12);
    assert!(sig.note.is_none());
}

#[test]
fn signature_needs_all_four() {
    let sig = detect_pd_signature(&z(&[("PDM_PPE", -1.0), ("PDM_RPDE", -1.0), ("PDM_DFA", -1.0)]));
    assert!(!sig.detected);
    assert!(sig.note.unwrap().contains("insufficient"));
    assert_eq!(sig.quartet_scores["ACU_HNR"], None);
}

#[test]
fn three_of_four_impaired() {
    let sig = detect_pd_signature(&z(&[
        ("PDM_PPE", -1.0),
        ("PDM_RPDE", -1.0),
        ("PDM_DFA", -1.0),
        ("ACU_HNR", 0.0),
    ]));
    assert!(sig.detected);
    assert!((sig.confidence - 0.8).abs() < 1e-12);

    let with_support = detect_pd_signature(&z(&[
        ("PDM_PPE", -1.0),
        ("PDM_RPDE", -1.0),
        ("PDM_DFA", -1.0),
        ("ACU_HNR", 0.0),
        ("ACU_TREMOR_FREQ", -1.0),
    ]));
    assert_eq!(with_support.supporting_evidence.len(), 1);
    assert!((with_support.confidence - 0.85).abs() < 1e-12);
}

#[test]
fn pigd_subtype() {
    let res = classify_pd_subtype(&z(&[
        ("PDM_DDK_REG", -1.0),
        ("PDM_FESTINATION", -1.0),
        ("PDM_VSA", -1.0),
    ]));
    assert_eq!(res.subtype, PdSubtype::Pigd);
    assert!((res.confidence - 0.9).abs() < 1e-12);
    assert_eq!(res.evidence.len(), 3);
}

#[test]
fn tremor_dominant_subtype() {
    let res = classify_pd_subtype(&z(&[
        ("ACU_TREMOR_FREQ", -1.0),
        ("PDM_MONOPITCH", -1.0),
        ("PDM_DDK_REG", 0.0),
    ]));
    assert_eq!(res.subtype, PdSubtype::TremorDominant);
    assert!((res.confidence - 0.82).abs() < 1e-12);
    assert_eq!(res.subtype.as_str(), "tremor_dominant");
}

#[test]
fn subtype_needs_two_features() {
    let res = classify_pd_subtype(&z(&[("PDM_DDK_REG", -1.0)]));
    assert_eq!(res.subtype, PdSubtype::Indeterminate);
    assert_eq!(res.confidence, 0.0);
    assert!(res.note.is_some());
}

#[test]
fn hypokinetic_profile_is_pd() {
    let res = differentiate_parkinsonism(
        &z(&[("ACU_F0_SD", -1.0), ("ACU_ENERGY_RANGE", -1.0)]),
        &DomainScores::empty(),
    );
    assert_eq!(res.primary, Some(Parkinsonism::Pd));
    assert!((res.probabilities[&Parkinsonism::Pd] - 1.0).abs() < 1e-12);
    assert!((res.confidence - 0.95).abs() < 1e-12);
}

#[test]
fn fluctuating_profile_is_msa() {
    let res = differentiate_parkinsonism(
        &z(&[
            ("ACU_F0_SD", 1.2),
            ("PDM_DDK_REG", -1.5),
            ("ACU_ENERGY_RANGE", 1.0),
        ]),
        &DomainScores::empty(),
    );
    assert_eq!(res.primary, Some(Parkinsonism::Msa));
    assert!(res.evidence.iter().all(|e| e.supports == Parkinsonism::Msa));
}

#[test]
fn no_evidence_is_uniform() {
    let res = differentiate_parkinsonism(&ZScores::new(), &DomainScores::empty());
    assert_eq!(res.primary, None);
    for p in Parkinsonism::ALL {
        assert!((res.probabilities[&p] - 0.25).abs() < 1e-12);
    }
}

#[test]
fn cascade_levels() {
    let moderate = pd_cascade(&DomainScores::from_pairs(&[(Domain::Acoustic, -0.9)]));
    assert_eq!(moderate.len(), 1);
    assert_eq!(moderate[0].stage, 1);
    assert_eq!(moderate[0].severity, Some(Severity::Moderate));

    let severe = pd_cascade(&DomainScores::from_pairs(&[(Domain::Acoustic, -1.5)]));
    assert_eq!(severe[0].severity, Some(Severity::Severe));

    let early = pd_cascade(&DomainScores::from_pairs(&[(Domain::Acoustic, -0.3)]));
    assert_eq!(early.len(), 1);
    assert_eq!(early[0].label, "pre_symptomatic");

    let healthy = pd_cascade(&DomainScores::from_pairs(&[
        (Domain::Acoustic, 0.0),
        (Domain::PdMotor, 0.0),
        (Domain::Temporal, 0.0),
    ]));
    assert!(healthy.is_empty());
}

#[test]
fn updrs_estimate() {
    let est = predict_updrs(&z(&[
        ("ACU_JITTER", -1.0),
        ("ACU_SHIMMER", -1.0),
        ("ACU_HNR", -1.0),
    ]));
    assert!((est.estimated_updrs.unwrap() - 18.1).abs() < 1e-9);
    assert!((est.confidence - 0.525).abs() < 1e-12);

    let short = predict_updrs(&z(&[("ACU_JITTER", -1.0), ("ACU_SHIMMER", -1.0)]));
    assert_eq!(short.estimated_updrs, None);
    assert_eq!(short.features_used.len(), 2);
}

#[test]
fn staging_bands() {
    let prodromal = stage_pd(&z(&[("PDM_MONOPITCH", -1.0)]), &[]);
    assert_eq!(prodromal.estimated_stage, HyStage::Prodromal);
    assert!((prodromal.confidence - 0.4).abs() < 1e-12);
    assert_eq!(prodromal.progression_velocity, None);

    let early = stage_pd(&z(&[("ACU_HNR", -1.0), ("ACU_JITTER", -1.0)]), &[]);
    assert_eq!(early.estimated_stage, HyStage::Hy1To2);
    assert!((early.confidence - 0.57).abs() < 1e-12);

    let none = stage_pd(&ZScores::new(), &[]);
    assert_eq!(none.estimated_stage, HyStage::Indeterminate);
}

#[test]
fn motor_progression() {
    let history: Vec<HistoryRecord> = [0.0, 0.0, 0.0, -0.3, -0.3, -0.3]
        .iter()
        .map(|v| HistoryRecord::new(0.0, DomainScores::from_pairs(&[(Domain::PdMotor, *v)])))
        .collect();
    assert_eq!(progression_velocity(&history), Some(ProgressionVelocity::RapidDecline));
    assert_eq!(progression_velocity(&history[..2]), None);
}

#[test]
fn trigger_needs_three_pd_sentinels() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let three = check_sentinels(
        &catalog,
        &z(&[("PDM_PPE", -1.0), ("PDM_RPDE", -1.0), ("PDM_DFA", -1.0)]),
    );
    assert!(pd_triggered(&three, &cfg));
    let two = check_sentinels(&catalog, &z(&[("PDM_PPE", -1.0), ("PDM_RPDE", -1.0)]));
    assert!(!pd_triggered(&two, &cfg));
}

#[test]
fn full_pd_analysis() {
    let pairs: Vec<(&str, f64)> = QUARTET.iter().map(|id| (*id, -1.0)).collect();
    let domains = DomainScores::from_pairs(&[(Domain::Acoustic, -1.0), (Domain::PdMotor, -0.8)]);
    let res = run_pd_analysis(&z(&pairs), &domains, &[]);
    assert!(res.signature.detected);
    assert!(res.confidence > 0.0 && res.confidence <= 1.0);
    assert!(res.cascade.iter().any(|s| s.stage == 2));
}
