use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::HistoryRecord;
use crate::scores::session::{SessionContext, analyze_session};

pub struct Stage4Sessions;

impl Stage4Sessions {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Sessions {
    fn name(&self) -> &'static str {
        "stage4_sessions"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let catalog = ctx.catalog.as_ref().context("catalog missing")?;
        let patient = ctx.patient.as_ref().context("patient missing")?;
        let baseline = ctx.baseline.as_ref().context("baseline missing")?;

        let monitored = &patient.sessions[ctx.calibration_count..];
        if !baseline.complete {
            info!(monitored = monitored.len(), "sessions_skipped");
            return Ok(());
        }

        let mut history: Vec<HistoryRecord> = Vec::with_capacity(monitored.len());
        let mut analyses = Vec::with_capacity(monitored.len());
        for session in monitored {
            let session_ctx = SessionContext {
                confounders: Some(&session.confounders),
                topic: session.topic.as_ref(),
                age: ctx.age,
                history: &history,
            };
            let analysis =
                analyze_session(catalog, &session.features, baseline, &session_ctx, &ctx.config);
            history.push(analysis.history_record());
            analyses.push(analysis);
        }

        if analyses.is_empty() {
            ctx.warnings
                .push("no sessions after calibration; nothing to monitor".to_string());
        }
        info!(analyzed = analyses.len(), "sessions_ready");
        ctx.sessions = analyses;
        Ok(())
    }
}
