use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::schema::v1::{
    BaselineSummary, CrossValidation, NeurovoiceV1, PatientMeta, SessionSummary,
};
use crate::scores::aging::AgeBand;

pub fn build_report(ctx: &Ctx) -> Result<NeurovoiceV1> {
    let catalog = ctx.catalog.as_ref().context("catalog missing")?;
    let patient = ctx.patient.as_ref().context("patient missing")?;

    let meta = PatientMeta {
        patient_id: patient.patient_id.clone(),
        age: ctx.age,
        age_band: AgeBand::from_age(ctx.age),
        sessions_total: patient.sessions.len(),
        calibration_sessions: ctx.calibration_count,
        monitored_sessions: patient.sessions.len() - ctx.calibration_count,
        catalog_version: catalog.version.clone(),
        indicator_count: catalog.len(),
    };

    let baseline = ctx.baseline.as_ref().map(|b| BaselineSummary {
        complete: b.complete,
        sessions: b.sessions,
        target: b.target,
        sufficient_indicators: b.sufficient_count(),
        high_variance: b.high_variance.clone(),
        needs_extension: b.needs_extension,
        audio_available: b.audio_available,
        audio_sessions: b.audio_sessions,
    });

    let monitored = &patient.sessions[ctx.calibration_count..];
    let sessions = ctx
        .sessions
        .iter()
        .zip(monitored)
        .map(|(a, input)| SessionSummary {
            id: input.id.clone(),
            composite: a.composite,
            alert_level: a.alert_level,
            domain_scores: a.domain_scores.clone(),
            confounder_weight: a.confounder_weight,
            sentinel_alerts: a.sentinel_alerts.clone(),
            topic_genre: a.topic_genre.clone(),
            leading_edge: a.decline_profile.as_ref().and_then(|p| p.leading_edge),
        })
        .collect();

    let cross_validation = match (&ctx.loo, &ctx.split_half) {
        (Some(loo), Some(halves)) => Some(CrossValidation {
            leave_one_out: loo.clone(),
            split_half: halves.clone(),
        }),
        _ => None,
    };

    Ok(NeurovoiceV1 {
        tool: "kira-neurovoice".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: "v1".to_string(),
        patient: meta,
        config: ctx.config.clone(),
        baseline,
        sessions,
        latest_session: ctx.latest().cloned(),
        weekly: ctx.weeks.clone(),
        differential: ctx.differential.clone(),
        pd_analysis: ctx.pd_analysis.clone(),
        trajectory: ctx.trajectory.clone(),
        cross_validation,
        warnings: ctx.warnings.clone(),
    })
}

pub fn write_json(path: &Path, ctx: &Ctx) -> Result<()> {
    let report = build_report(ctx)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}
