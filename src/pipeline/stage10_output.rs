use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::json_writer;
use crate::pipeline::Stage;

pub struct Stage10Output;

impl Stage10Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage10Output {
    fn name(&self) -> &'static str {
        "stage10_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let report = json_writer::build_report(ctx)?;
        ctx.report = report;

        if ctx.write_json {
            json_writer::write_json(&ctx.output.json_path, ctx)?;
            info!(path = %ctx.output.json_path.display(), "report_written");
        }

        info!(
            sessions = ctx.report.sessions.len(),
            warnings = ctx.report.warnings.len(),
            "report_ready"
        );
        Ok(())
    }
}
