use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::trajectory::{TrajectoryOptions, predict_trajectory};

pub struct Stage8Trajectory;

impl Stage8Trajectory {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage8Trajectory {
    fn name(&self) -> &'static str {
        "stage8_trajectory"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(latest) = ctx.latest() else {
            return Ok(());
        };
        let opts = TrajectoryOptions {
            model: ctx.differential.as_ref().map(|d| d.primary),
            base_confidence: ctx.differential.as_ref().map(|d| d.confidence),
            cascade: &latest.cascade.alzheimer,
            weeks: ctx.config.horizon_weeks,
            age: ctx.age,
        };
        let trajectory = predict_trajectory(&ctx.history(), &opts, &ctx.config);
        if let Some(note) = &trajectory.note {
            ctx.warnings.push(format!("trajectory: {}", note));
        }
        info!(
            alert_12w = trajectory.predicted_alert_12w.as_str(),
            confidence = trajectory.confidence,
            "trajectory_ready"
        );
        ctx.trajectory = Some(trajectory);
        Ok(())
    }
}
