use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::math::stats::{clamp, round_to, safe_div};
use crate::scores::ZScores;
use crate::scores::aging::{AgeBand, age_offset};
use crate::scores::baseline::Baseline;
use crate::scores::FeatureVector;

const MIN_STD: f64 = 0.05;

/// Detected conversation genre and how sure the detector was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicContext {
    pub genre: String,
    pub confidence: f64,
}

impl TopicContext {
    pub fn new(genre: &str, confidence: f64) -> Self {
        Self {
            genre: genre.to_string(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZScoreOptions<'a> {
    pub age: Option<f64>,
    pub topic: Option<&'a TopicContext>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZScoreResult {
    pub z: ZScores,
    /// Topic offsets actually subtracted, rounded to 3 decimals.
    pub topic_adjustments: BTreeMap<String, f64>,
    pub age_band: Option<AgeBand>,
}

/// Directional z-scores against the baseline, before any layer. Negative
/// always means movement towards pathology.
pub fn raw_z_scores(catalog: &Catalog, vector: &FeatureVector, baseline: &Baseline) -> ZScores {
    let mut out = ZScores::new();
    for ind in &catalog.indicators {
        let Some(value) = vector.value(&ind.id) else {
            continue;
        };
        let Some(stats) = baseline.get(&ind.id) else {
            continue;
        };
        let z = safe_div(value - stats.mean, stats.std.max(MIN_STD), 0.0);
        let z = if ind.flips_sign() { -z } else { z };
        if z.is_finite() {
            out.insert(ind.id.clone(), z);
        }
    }
    out
}

/// Z-scores with the age offset, confidence damping and topic-genre layers
/// applied in that order.
pub fn compute_z_scores(
    catalog: &Catalog,
    vector: &FeatureVector,
    baseline: &Baseline,
    opts: &ZScoreOptions<'_>,
) -> ZScoreResult {
    let band = AgeBand::from_age(opts.age);
    let mut z = raw_z_scores(catalog, vector, baseline);

    for (id, value) in z.iter_mut() {
        *value += age_offset(id, band);
        if let Some(conf) = vector.get(id).confidence() {
            *value *= conf;
        }
    }

    let mut topic_adjustments = BTreeMap::new();
    if let Some(topic) = opts.topic {
        if let Some(table) = catalog.topics.genre(&topic.genre) {
            let conf = clamp(topic.confidence, 0.0, 1.0);
            for (id, adj) in table {
                if let Some(value) = z.get_mut(id) {
                    let applied = adj * conf;
                    *value -= applied;
                    topic_adjustments.insert(id.clone(), round_to(applied, 3));
                }
            }
        }
    }

    ZScoreResult {
        z,
        topic_adjustments,
        age_band: band,
    }
}
