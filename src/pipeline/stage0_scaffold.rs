use anyhow::{Context, Result, bail};
use std::fs;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage0Scaffold;

impl Stage0Scaffold {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Scaffold {
    fn name(&self) -> &'static str {
        "stage0_scaffold"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let out_dir = &ctx.output.out_dir;
        if out_dir.exists() && !out_dir.is_dir() {
            bail!("--out {} is not a directory", out_dir.display());
        }
        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        info!(
            out_dir = %out_dir.display(),
            json = ctx.write_json,
            crossval = ctx.crossval,
            "run_scaffold_ready"
        );
        Ok(())
    }
}
