use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::math::stats::{mean, population_std};
use crate::scores::FeatureVector;

const MIN_OBSERVATIONS: usize = 3;
const PLACEHOLDER_MEAN: f64 = 0.5;
const PLACEHOLDER_STD: f64 = 0.05;
const ZERO_STD_REPLACEMENT: f64 = 0.03;
const STD_FLOOR: f64 = 0.02;
const NEEDS_EXTENSION_HIGH_VARIANCE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorStats {
    pub mean: f64,
    pub std: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub n: usize,
    pub cv: f64,
}

impl IndicatorStats {
    fn placeholder() -> Self {
        Self {
            mean: PLACEHOLDER_MEAN,
            std: PLACEHOLDER_STD,
            min: None,
            max: None,
            n: 0,
            cv: 0.0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.n == 0
    }
}

/// Per-patient reference distribution. Rebuilt whenever the calibration
/// set changes; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub complete: bool,
    pub sessions: usize,
    pub target: usize,
    pub stats: BTreeMap<String, IndicatorStats>,
    pub high_variance: Vec<String>,
    pub needs_extension: bool,
    pub audio_available: bool,
    pub audio_sessions: usize,
}

impl Baseline {
    pub fn get(&self, id: &str) -> Option<&IndicatorStats> {
        self.stats.get(id)
    }

    /// Indicators with real statistics (at least three observations).
    pub fn sufficient_count(&self) -> usize {
        self.stats.values().filter(|s| !s.is_placeholder()).count()
    }
}

pub fn compute_baseline(catalog: &Catalog, vectors: &[FeatureVector], cfg: &EngineConfig) -> Baseline {
    let target = cfg.min_baseline_sessions;
    if vectors.len() < target {
        return Baseline {
            complete: false,
            sessions: vectors.len(),
            target,
            stats: BTreeMap::new(),
            high_variance: Vec::new(),
            needs_extension: false,
            audio_available: false,
            audio_sessions: 0,
        };
    }

    let audio_sessions = vectors.iter().filter(|v| v.has_audio(catalog)).count();
    let mut stats = BTreeMap::new();
    let mut high_variance = Vec::new();

    for ind in &catalog.indicators {
        let values: Vec<f64> = vectors
            .iter()
            .filter_map(|v| v.value(&ind.id))
            .filter(|v| v.is_finite())
            .collect();
        if values.len() < MIN_OBSERVATIONS {
            stats.insert(ind.id.clone(), IndicatorStats::placeholder());
            continue;
        }

        let m = mean(&values);
        let mut std = population_std(&values);
        if std == 0.0 {
            std = ZERO_STD_REPLACEMENT;
        }
        let cv = if m > 0.0 { std / m } else { 0.0 };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if cv > cfg.high_variance_cv {
            high_variance.push(ind.id.clone());
        }
        stats.insert(
            ind.id.clone(),
            IndicatorStats {
                mean: m,
                std: std.max(STD_FLOOR),
                min: Some(min),
                max: Some(max),
                n: values.len(),
                cv,
            },
        );
    }

    let needs_extension =
        high_variance.len() > NEEDS_EXTENSION_HIGH_VARIANCE && vectors.len() < cfg.extension_sessions;

    Baseline {
        complete: true,
        sessions: vectors.len(),
        target,
        stats,
        high_variance,
        needs_extension,
        audio_available: audio_sessions >= target / 2,
        audio_sessions,
    }
}
