use kira_neurovoice::catalog::{Condition, Domain};
use kira_neurovoice::config::EngineConfig;
use kira_neurovoice::scores::cascade::CascadeEntry;
use kira_neurovoice::scores::{AlertLevel, DomainScores, HistoryRecord};
use kira_neurovoice::trajectory::{
    TrajectoryOptions, compute_velocity, point_confidence, predict_trajectory, twin_trajectory,
};

fn history(composites: &[f64]) -> Vec<HistoryRecord> {
    composites
        .iter()
        .map(|c| HistoryRecord::new(*c, DomainScores::uniform(*c)))
        .collect()
}

#[test]
fn short_history_has_no_projection() {
    let cfg = EngineConfig::default_v1();
    let traj = predict_trajectory(&history(&[0.0, -0.1]), &TrajectoryOptions::default(), &cfg);
    assert!(traj.predictions.is_empty());
    assert_eq!(traj.predicted_alert_12w, AlertLevel::Unknown);
    assert!(traj.note.unwrap().contains("3+"));
}

#[test]
fn medication_effect_recovers() {
    let cfg = EngineConfig::default_v1();
    let opts = TrajectoryOptions {
        model: Some(Condition::Medication),
        ..Default::default()
    };
    let traj = predict_trajectory(&history(&[-0.6, -0.6, -0.6]), &opts, &cfg);
    assert_eq!(traj.predictions.len(), 12);
    assert!((traj.predictions[0].composite + 0.4).abs() < 1e-9);
    assert_eq!(traj.predictions[2].composite, 0.0);
    assert_eq!(traj.predicted_alert_12w, AlertLevel::Green);
}

#[test]
fn depression_recovers_slowly() {
    let cfg = EngineConfig::default_v1();
    let opts = TrajectoryOptions {
        model: Some(Condition::Depression),
        ..Default::default()
    };
    let traj = predict_trajectory(&history(&[-1.0, -1.0, -1.0]), &opts, &cfg);
    let last = traj.predictions.last().unwrap();
    assert_eq!(last.week_offset, 12);
    assert!((last.composite + 0.76).abs() < 1e-9);
    assert_eq!(traj.predicted_alert_12w, AlertLevel::Yellow);
    assert!(last.domains.values().all(|v| *v <= 0.0));
}

#[test]
fn confidence_decays_with_horizon() {
    assert!((point_confidence(0.5, 12) - 0.32).abs() < 1e-12);
    assert!((point_confidence(0.5, 40) - 0.1).abs() < 1e-12);
}

#[test]
fn velocity_uses_recent_records() {
    let v = compute_velocity(&history(&[5.0, 0.0, -0.1, -0.2, -0.3]));
    assert!((v.composite + 0.1).abs() < 1e-9);
    assert!((v.domains[&Domain::Lexical] + 0.1).abs() < 1e-9);
    assert_eq!(compute_velocity(&history(&[0.0])).composite, 0.0);
}

#[test]
fn alzheimer_projection_follows_velocity() {
    let cfg = EngineConfig::default_v1();
    let records = history(&[0.1, 0.0, -0.1, -0.2]);
    let opts = TrajectoryOptions {
        model: Some(Condition::Alzheimer),
        base_confidence: Some(0.8),
        ..Default::default()
    };
    let traj = predict_trajectory(&records, &opts, &cfg);
    let last = traj.predictions.last().unwrap();
    assert!((last.composite + 1.4).abs() < 1e-9);
    assert_eq!(traj.predicted_alert_12w, AlertLevel::Orange);
    assert!((traj.confidence - 0.51).abs() < 1e-12);
    assert!(traj.decline_profile.is_some());

    let cascade = vec![CascadeEntry {
        family: Condition::Alzheimer,
        stage: 2,
        name: "syntactic_simplification".to_string(),
        severity: 0.8,
        confidence: 0.8,
    }];
    let staged = TrajectoryOptions {
        model: Some(Condition::Alzheimer),
        cascade: &cascade,
        ..Default::default()
    };
    let traj = predict_trajectory(&records, &staged, &cfg);
    assert!((traj.predictions[11].composite + 1.64).abs() < 1e-9);
    assert_eq!(traj.predicted_alert_12w, AlertLevel::Red);
}

#[test]
fn unmodeled_condition_ages_normally() {
    let cfg = EngineConfig::default_v1();
    let opts = TrajectoryOptions {
        model: Some(Condition::NormalAging),
        age: Some(72.0),
        weeks: 8,
        ..Default::default()
    };
    let traj = predict_trajectory(&history(&[-0.1, -0.1, -0.1]), &opts, &cfg);
    assert_eq!(traj.predictions.len(), 8);
    assert_eq!(traj.twin_trajectory.len(), 8);
    assert!((traj.predictions[7].composite + 0.1).abs() < 1e-9);
    assert!(traj.predictions[7].domains[&Domain::Lexical] < -0.1);
}

#[test]
fn twin_declines_faster_when_older() {
    let start = Domain::ALL.iter().map(|d| (*d, 0.0)).collect();
    let young = twin_trajectory(&start, 12, Some(55.0));
    let old = twin_trajectory(&start, 12, Some(85.0));
    assert_eq!(old.len(), 12);
    assert!(old[11].composite < 0.0);
    assert!(old[11].domains[&Domain::Lexical] < young[11].domains[&Domain::Lexical]);
}

fn project_from_zero(model: Condition) -> Vec<kira_neurovoice::trajectory::PredictedPoint> {
    let cfg = EngineConfig::default_v1();
    let opts = TrajectoryOptions {
        model: Some(model),
        ..Default::default()
    };
    predict_trajectory(&history(&[0.0, 0.0, 0.0]), &opts, &cfg).predictions
}

#[test]
fn parkinson_projection_leads_with_phonation() {
    let preds = project_from_zero(Condition::Parkinson);
    let last = preds.last().unwrap();
    assert!((last.composite + 0.12).abs() < 1e-9);
    assert!((last.domains[&Domain::Acoustic] + 0.24).abs() < 1e-9);
    assert!((last.domains[&Domain::Semantic] + 0.036).abs() < 1e-9);
}

#[test]
fn msa_motor_decline_accelerates() {
    let preds = project_from_zero(Condition::Msa);
    let last = preds.last().unwrap();
    // linear rate alone would give -0.30
    assert!((last.domains[&Domain::Acoustic] + 0.48).abs() < 1e-9);
    assert!((last.domains[&Domain::Lexical] + 0.096).abs() < 1e-9);
    assert!((last.composite + 0.18).abs() < 1e-9);
}

#[test]
fn psp_motor_decline_accelerates() {
    let preds = project_from_zero(Condition::Psp);
    let last = preds.last().unwrap();
    assert_eq!(last.week_offset, 12);
    assert!((last.domains[&Domain::Acoustic] + 0.576).abs() < 1e-9);
    assert!((last.domains[&Domain::PdMotor] + 0.48).abs() < 1e-9);
    assert!((last.domains[&Domain::Temporal] + 0.384).abs() < 1e-9);
    assert!((last.domains[&Domain::Lexical] + 0.12).abs() < 1e-9);
    assert!((last.composite + 0.24).abs() < 1e-9);

    let msa = project_from_zero(Condition::Msa);
    assert!(last.domains[&Domain::Acoustic] < msa.last().unwrap().domains[&Domain::Acoustic]);
}

#[test]
fn lbd_decline_fluctuates() {
    let preds = project_from_zero(Condition::Lbd);
    let exec: Vec<f64> = preds.iter().take(4).map(|p| p.domains[&Domain::Executive]).collect();
    assert!((exec[0] + 0.021).abs() < 1e-9);
    assert!((exec[1] + 0.036).abs() < 1e-9);
    assert!((exec[2] + 0.046).abs() < 1e-9);
    assert!((exec[3] + 0.072).abs() < 1e-9);
    // the week 2-3 step is the shallowest of the cycle
    let steps: Vec<f64> = exec.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(steps[1] > steps[0]);
    assert!(steps[1] > steps[2]);
}

#[test]
fn ftd_decline_leads_with_pragmatics() {
    let preds = project_from_zero(Condition::Ftd);
    let last = preds.last().unwrap();
    assert!((last.domains[&Domain::Pragmatic] + 0.3).abs() < 1e-9);
    assert!((last.domains[&Domain::Executive] + 0.24).abs() < 1e-9);
    assert!((last.domains[&Domain::Memory] + 0.06).abs() < 1e-9);
    assert!(last.domains[&Domain::Executive] < last.domains[&Domain::Memory]);
}
