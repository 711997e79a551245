use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::session::analyze_week;

/// Monitored sessions are grouped into weeks of this many sessions.
pub const SESSIONS_PER_WEEK: usize = 7;

pub struct Stage5Weekly;

impl Stage5Weekly {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Weekly {
    fn name(&self) -> &'static str {
        "stage5_weekly"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.sessions.is_empty() {
            return Ok(());
        }
        let catalog = ctx.catalog.as_ref().context("catalog missing")?;
        let patient = ctx.patient.as_ref().context("patient missing")?;
        let baseline = ctx.baseline.as_ref().context("baseline missing")?;

        let weeks: Vec<_> = patient.sessions[ctx.calibration_count..]
            .chunks(SESSIONS_PER_WEEK)
            .enumerate()
            .filter_map(|(i, chunk)| {
                analyze_week(catalog, chunk, baseline, i + 1, ctx.age, &ctx.config)
            })
            .collect();
        info!(weeks = weeks.len(), "weekly_ready");
        ctx.weeks = weeks;
        Ok(())
    }
}
