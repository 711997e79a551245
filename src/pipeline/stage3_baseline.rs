use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::FeatureVector;
use crate::scores::baseline::compute_baseline;

pub struct Stage3Baseline;

impl Stage3Baseline {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Baseline {
    fn name(&self) -> &'static str {
        "stage3_baseline"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let catalog = ctx.catalog.as_ref().context("catalog missing")?;
        let patient = ctx.patient.as_ref().context("patient missing")?;
        let calibration: Vec<FeatureVector> = patient.sessions[..ctx.calibration_count]
            .iter()
            .map(|s| s.features.clone())
            .collect();
        let baseline = compute_baseline(catalog, &calibration, &ctx.config);

        if !baseline.complete {
            ctx.warnings.push(format!(
                "baseline incomplete: {} of {} calibration sessions",
                baseline.sessions, baseline.target
            ));
        }
        if baseline.needs_extension {
            ctx.warnings.push(format!(
                "{} high-variance indicators; extend calibration to {} sessions",
                baseline.high_variance.len(),
                ctx.config.extension_sessions
            ));
        }
        info!(
            sessions = baseline.sessions,
            complete = baseline.complete,
            sufficient = baseline.sufficient_count(),
            audio = baseline.audio_available,
            "baseline_ready"
        );
        ctx.baseline = Some(baseline);
        Ok(())
    }
}
