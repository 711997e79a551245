use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::differential::{DifferentialContext, run_differential};
use crate::pipeline::Stage;
use crate::pipeline::stage5_weekly::SESSIONS_PER_WEEK;

pub struct Stage6Differential;

impl Stage6Differential {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Differential {
    fn name(&self) -> &'static str {
        "stage6_differential"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(latest) = ctx.latest() else {
            return Ok(());
        };
        let patient = ctx.patient.as_ref().context("patient missing")?;

        // Confounder rules look at the most recent week only.
        let monitored = &patient.sessions[ctx.calibration_count..];
        let recent = &monitored[monitored.len().saturating_sub(SESSIONS_PER_WEEK)..];
        let diff_ctx = DifferentialContext {
            timeline: ctx.history(),
            confounders: recent.iter().map(|s| s.confounders.clone()).collect(),
            topic_genre: latest.topic_genre.clone(),
            topic_adjustments: latest.topic_adjustments.clone(),
            indicator_confidence: latest.indicator_confidence.clone(),
            patient_age: ctx.age,
            decline_profile: latest.decline_profile.clone(),
        };
        let result = run_differential(&latest.domain_scores, &latest.z_scores, &diff_ctx);
        info!(
            primary = result.primary.as_str(),
            secondary = result.secondary.as_str(),
            confidence = result.confidence,
            rules_fired = result.rules_fired.len(),
            "differential_ready"
        );
        ctx.differential = Some(result);
        Ok(())
    }
}
