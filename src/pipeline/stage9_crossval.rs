use anyhow::{Context, Result};
use tracing::info;

use crate::crossval::{leave_one_out, split_half};
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage9Crossval;

impl Stage9Crossval {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage9Crossval {
    fn name(&self) -> &'static str {
        "stage9_crossval"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if !ctx.crossval {
            return Ok(());
        }
        let catalog = ctx.catalog.as_ref().context("catalog missing")?;
        let patient = ctx.patient.as_ref().context("patient missing")?;
        let calibration = &patient.sessions[..ctx.calibration_count];
        let age = ctx.age;
        let cfg = &ctx.config;

        #[cfg(feature = "mt")]
        let (loo, halves) = {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(ctx.threads)
                .build()
                .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
            pool.install(|| {
                (
                    leave_one_out(catalog, calibration, age, cfg),
                    split_half(catalog, calibration, age, cfg),
                )
            })
        };
        #[cfg(not(feature = "mt"))]
        let (loo, halves) = (
            leave_one_out(catalog, calibration, age, cfg),
            split_half(catalog, calibration, age, cfg),
        );

        if let Some(err) = &loo.error {
            ctx.warnings.push(format!("leave-one-out: {}", err));
        }
        if let Some(err) = &halves.error {
            ctx.warnings.push(format!("split-half: {}", err));
        }
        info!(
            loo_analyzed = loo.analyzed,
            split_half_sessions = halves.total_sessions,
            "crossval_ready"
        );
        ctx.loo = Some(loo);
        ctx.split_half = Some(halves);
        Ok(())
    }
}
