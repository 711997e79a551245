use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Thresholds and minimums for a scoring run. Missing keys in a JSON
/// overlay fall back to `default_v1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_baseline_sessions: usize,
    pub extension_sessions: usize,
    pub high_variance_cv: f64,
    pub cv_min_baseline: usize,
    pub horizon_weeks: usize,
    pub pd_trigger_sentinels: usize,
    pub age_consistent_excess: f64,
    pub age_consistent_spread: f64,
}

impl EngineConfig {
    pub fn default_v1() -> Self {
        Self {
            min_baseline_sessions: 14,
            extension_sessions: 21,
            high_variance_cv: 0.30,
            cv_min_baseline: 5,
            horizon_weeks: 12,
            pd_trigger_sentinels: 3,
            age_consistent_excess: 0.002,
            age_consistent_spread: 0.01,
        }
    }

    pub fn with_min_baseline(&self, min_baseline_sessions: usize) -> Self {
        Self {
            min_baseline_sessions,
            ..self.clone()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_baseline_sessions == 0 {
            bail!("min_baseline_sessions must be at least 1");
        }
        if self.cv_min_baseline == 0 {
            bail!("cv_min_baseline must be at least 1");
        }
        if self.horizon_weeks == 0 {
            bail!("horizon_weeks must be at least 1");
        }
        if !(self.high_variance_cv.is_finite() && self.high_variance_cv > 0.0) {
            bail!("high_variance_cv must be positive");
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::default_v1()
    }
}
