use std::fs;
use std::path::Path;

use kira_neurovoice::catalog;
use kira_neurovoice::ctx::Ctx;
use kira_neurovoice::io::summary::format_summary;
use kira_neurovoice::pipeline;
use serde_json::{Map, Value, json};
use tempfile::TempDir;

fn write_patient(path: &Path, sessions: usize, age: Option<f64>) {
    let catalog = catalog::load_builtin().unwrap();
    let sessions: Vec<Value> = (0..sessions)
        .map(|i| {
            let features: Map<String, Value> = catalog
                .indicators
                .iter()
                .map(|ind| (ind.id.clone(), json!(0.5 + 0.01 * (i % 3) as f64)))
                .collect();
            json!({ "id": format!("s{:02}", i), "features": features })
        })
        .collect();
    let mut patient = json!({ "patient_id": "p-test", "sessions": sessions });
    if let Some(age) = age {
        patient["age"] = json!(age);
    }
    fs::write(path, serde_json::to_string(&patient).unwrap()).unwrap();
}

#[test]
fn full_run_writes_json_report() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("patient.json");
    let out = tmp.path().join("out");
    write_patient(&input, 21, Some(70.0));

    let mut ctx = Ctx::new(input, out.clone(), true, "0.0.0-test");
    pipeline::full_run().run(&mut ctx).unwrap();

    let path = out.join("neurovoice.json");
    assert!(path.exists());
    let json: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["tool"], "kira-neurovoice");
    assert_eq!(json["schema_version"], "v1");
    assert_eq!(json["patient"]["patient_id"], "p-test");
    assert_eq!(json["patient"]["sessions_total"], 21);
    assert_eq!(json["patient"]["calibration_sessions"], 14);
    assert_eq!(json["patient"]["monitored_sessions"], 7);
    assert_eq!(json["patient"]["age_band"], "70-79");
    assert_eq!(json["baseline"]["complete"], true);
    assert_eq!(json["sessions"].as_array().unwrap().len(), 7);
    assert_eq!(json["sessions"][0]["id"], "s14");
    assert_eq!(json["weekly"].as_array().unwrap().len(), 1);
    assert!(json["differential"]["probabilities"].is_object());
    assert_eq!(json["trajectory"]["predictions"].as_array().unwrap().len(), 12);
    assert!(json["pd_analysis"].is_null());
    assert!(json["cross_validation"].is_null());
}

#[test]
fn json_is_skipped_without_flag() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("patient.json");
    let out = tmp.path().join("out");
    write_patient(&input, 21, Some(70.0));

    let mut ctx = Ctx::new(input, out.clone(), false, "0.0.0-test");
    pipeline::full_run().run(&mut ctx).unwrap();
    assert!(out.is_dir());
    assert!(!out.join("neurovoice.json").exists());
    assert_eq!(ctx.report.patient.monitored_sessions, 7);
}

#[test]
fn summary_lists_each_section() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("patient.json");
    write_patient(&input, 21, Some(70.0));

    let mut ctx = Ctx::new(input, tmp.path().join("out"), false, "0.0.0-test");
    ctx.crossval = true;
    pipeline::full_run().run(&mut ctx).unwrap();

    let s = format_summary(&ctx).unwrap();
    assert!(s.contains("kira-neurovoice v"));
    assert!(s.contains("Patient: p-test, age 70 (70-79), sessions 21 (calibration 14, monitored 7)"));
    assert!(s.contains("Baseline: complete, 14/14 sessions"));
    assert!(s.contains("Latest: composite"));
    assert!(s.contains("Differential:"));
    assert!(s.contains("PD: not triggered"));
    assert!(s.contains("Trajectory:"));
    assert!(s.contains("Cross-validation:"));
    assert!(ctx.report.cross_validation.is_some());
}

#[test]
fn overrides_take_precedence() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("patient.json");
    write_patient(&input, 21, None);

    let mut ctx = Ctx::new(input, tmp.path().join("out"), false, "0.0.0-test");
    ctx.overrides.age = Some(82.0);
    ctx.overrides.calibration = Some(16);
    ctx.overrides.weeks = Some(6);
    pipeline::full_run().run(&mut ctx).unwrap();

    assert_eq!(ctx.age, Some(82.0));
    assert_eq!(ctx.calibration_count, 16);
    assert_eq!(ctx.sessions.len(), 5);
    assert_eq!(ctx.config.horizon_weeks, 6);
    assert_eq!(ctx.trajectory.as_ref().unwrap().predictions.len(), 6);
}

#[test]
fn short_calibration_skips_monitoring() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("patient.json");
    write_patient(&input, 10, None);

    let mut ctx = Ctx::new(input, tmp.path().join("out"), false, "0.0.0-test");
    pipeline::full_run().run(&mut ctx).unwrap();

    assert!(ctx.sessions.is_empty());
    assert!(ctx.differential.is_none());
    assert!(ctx.warnings.iter().any(|w| w.contains("baseline incomplete")));
    assert!(ctx.warnings.iter().any(|w| w.contains("exceeds the 10 available")));
    assert!(ctx.warnings.iter().any(|w| w.contains("age unknown")));
    let s = format_summary(&ctx).unwrap();
    assert!(s.contains("Latest: none"));
}

#[test]
fn topics_without_catalog_fail() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("patient.json");
    write_patient(&input, 21, None);

    let mut ctx = Ctx::new(input, tmp.path().join("out"), false, "0.0.0-test");
    ctx.topics_path = Some(tmp.path().join("topics.tsv"));
    let err = pipeline::full_run().run(&mut ctx).unwrap_err();
    assert!(err.to_string().contains("--topics requires --catalog"));
}

#[test]
fn out_path_that_is_a_file_fails() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("patient.json");
    write_patient(&input, 21, Some(70.0));
    let out = tmp.path().join("taken");
    std::fs::write(&out, "x").unwrap();

    let mut ctx = Ctx::new(input, out, true, "test");
    let err = pipeline::full_run().run(&mut ctx).unwrap_err();
    assert!(err.to_string().contains("is not a directory"));
}
