use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::pd::{pd_triggered, run_pd_analysis};
use crate::pipeline::Stage;

pub struct Stage7Pd;

impl Stage7Pd {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage7Pd {
    fn name(&self) -> &'static str {
        "stage7_pd"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(latest) = ctx.latest() else {
            return Ok(());
        };
        if !pd_triggered(&latest.sentinel_alerts, &ctx.config) {
            info!("pd_skipped");
            return Ok(());
        }
        let analysis = run_pd_analysis(&latest.z_scores, &latest.domain_scores, &ctx.history());
        info!(
            detected = analysis.signature.detected,
            confidence = analysis.confidence,
            "pd_ready"
        );
        ctx.pd_analysis = Some(analysis);
        Ok(())
    }
}
