use anyhow::{Context, Result};

use crate::ctx::Ctx;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let patient = ctx.patient.as_ref().context("patient missing")?;

    let mut out = String::new();
    out.push_str(&format!("kira-neurovoice v{}\n", version));

    let age = match ctx.age {
        Some(age) => {
            let band = ctx.report.patient.age_band.map_or("unknown", |b| b.label());
            format!("{:.0} ({})", age, band)
        }
        None => "unknown".to_string(),
    };
    out.push_str(&format!(
        "Patient: {}, age {}, sessions {} (calibration {}, monitored {})\n",
        patient.patient_id,
        age,
        patient.sessions.len(),
        ctx.calibration_count,
        patient.sessions.len() - ctx.calibration_count
    ));

    if let Some(baseline) = &ctx.baseline {
        let state = if baseline.complete { "complete" } else { "incomplete" };
        out.push_str(&format!(
            "Baseline: {}, {}/{} sessions, {} indicators\n",
            state,
            baseline.sessions,
            baseline.target,
            baseline.sufficient_count()
        ));
    }

    let Some(latest) = ctx.latest() else {
        out.push_str("Latest: none\n");
        return Ok(out);
    };
    out.push_str(&format!(
        "Latest: composite {:+.3}, alert {}\n",
        latest.composite,
        latest.alert_level.as_str()
    ));

    let triggered: Vec<String> = latest
        .sentinel_alerts
        .iter()
        .filter(|a| a.triggered_count > 0)
        .map(|a| {
            format!(
                "{} {}/{}",
                a.condition.as_str(),
                a.triggered_count,
                a.total_sentinels
            )
        })
        .collect();
    if triggered.is_empty() {
        out.push_str("Sentinels: none\n");
    } else {
        out.push_str(&format!("Sentinels: {}\n", triggered.join(", ")));
    }

    if let Some(diff) = &ctx.differential {
        let primary = diff.probabilities.get(&diff.primary).copied().unwrap_or(0.0);
        out.push_str(&format!(
            "Differential: {} {:.2} (secondary {}), confidence {:.2}\n",
            diff.primary.as_str(),
            primary,
            diff.secondary.as_str(),
            diff.confidence
        ));
    }

    match &ctx.pd_analysis {
        Some(pd) => out.push_str(&format!(
            "PD: stage {}, subtype {}, confidence {:.2}\n",
            pd.stage.estimated_stage.as_str(),
            pd.subtype.subtype.as_str(),
            pd.confidence
        )),
        None => out.push_str("PD: not triggered\n"),
    }

    if let Some(traj) = &ctx.trajectory {
        out.push_str(&format!(
            "Trajectory: {} at {}w, confidence {:.2}\n",
            traj.predicted_alert_12w.as_str(),
            ctx.config.horizon_weeks,
            traj.confidence
        ));
    }

    if let Some(loo) = &ctx.loo {
        let consistency = loo
            .aggregate
            .as_ref()
            .and_then(|a| a.consistency)
            .map_or("n/a".to_string(), |c| format!("{:.2}", c));
        let reliability = ctx
            .split_half
            .as_ref()
            .and_then(|s| s.reliability.as_ref())
            .and_then(|r| r.spearman_brown)
            .map_or("n/a".to_string(), |r| format!("{:.2}", r));
        out.push_str(&format!(
            "Cross-validation: consistency {}, split-half reliability {}\n",
            consistency, reliability
        ));
    }

    Ok(out)
}
