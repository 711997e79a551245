use anyhow::{Context, Result, bail};
use tracing::info;

use crate::ctx::Ctx;
use crate::input::read_patient;
use crate::pipeline::Stage;

pub struct Stage2Input;

impl Stage2Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Input {
    fn name(&self) -> &'static str {
        "stage2_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let patient = read_patient(&ctx.input)?;
        let catalog = ctx.catalog.as_ref().context("catalog missing")?;

        let unknown = patient.unknown_indicators(catalog);
        if !unknown.is_empty() {
            ctx.warnings.push(format!(
                "{} unknown indicator ids ignored: {}",
                unknown.len(),
                unknown.join(", ")
            ));
        }
        let confounders = patient.unknown_confounders();
        if !confounders.is_empty() {
            ctx.warnings.push(format!(
                "unknown confounder keys ignored: {}",
                confounders.join(", ")
            ));
        }

        if let Some(age) = ctx.overrides.age {
            if !age.is_finite() || age < 0.0 {
                bail!("invalid --age {}", age);
            }
        }
        ctx.age = ctx.overrides.age.or(patient.age);
        if ctx.age.is_none() {
            ctx.warnings
                .push("patient age unknown; age adjustment disabled".to_string());
        }

        let requested = ctx
            .overrides
            .calibration
            .or(patient.calibration_sessions)
            .unwrap_or(ctx.config.min_baseline_sessions);
        if requested > patient.sessions.len() {
            ctx.warnings.push(format!(
                "calibration of {} sessions exceeds the {} available",
                requested,
                patient.sessions.len()
            ));
        }
        ctx.calibration_count = requested.min(patient.sessions.len());

        info!(
            patient = %patient.patient_id,
            sessions = patient.sessions.len(),
            calibration = ctx.calibration_count,
            "input_ready"
        );
        ctx.patient = Some(patient);
        Ok(())
    }
}
