use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_scaffold;
pub mod stage10_output;
pub mod stage1_catalog;
pub mod stage2_input;
pub mod stage3_baseline;
pub mod stage4_sessions;
pub mod stage5_weekly;
pub mod stage6_differential;
pub mod stage7_pd;
pub mod stage8_trajectory;
pub mod stage9_crossval;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}

/// The full scoring run, scaffold through output.
pub fn full_run() -> Pipeline {
    Pipeline::new(vec![
        Box::new(stage0_scaffold::Stage0Scaffold::new()),
        Box::new(stage1_catalog::Stage1Catalog::new()),
        Box::new(stage2_input::Stage2Input::new()),
        Box::new(stage3_baseline::Stage3Baseline::new()),
        Box::new(stage4_sessions::Stage4Sessions::new()),
        Box::new(stage5_weekly::Stage5Weekly::new()),
        Box::new(stage6_differential::Stage6Differential::new()),
        Box::new(stage7_pd::Stage7Pd::new()),
        Box::new(stage8_trajectory::Stage8Trajectory::new()),
        Box::new(stage9_crossval::Stage9Crossval::new()),
        Box::new(stage10_output::Stage10Output::new()),
    ])
}

/// Load and check the inputs without scoring anything.
pub fn validate_run() -> Pipeline {
    Pipeline::new(vec![
        Box::new(stage1_catalog::Stage1Catalog::new()),
        Box::new(stage2_input::Stage2Input::new()),
        Box::new(stage3_baseline::Stage3Baseline::new()),
    ])
}
