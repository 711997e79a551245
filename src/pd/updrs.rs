use serde::{Deserialize, Serialize};

use crate::math::stats::{clamp, round_to};
use crate::scores::{ZScores, z_value};

const INTERCEPT: f64 = 20.0;
const COEFFICIENTS: [(&str, f64); 6] = [
    ("ACU_JITTER", 3.5),
    ("ACU_SHIMMER", 3.2),
    ("ACU_HNR", -4.8),
    ("PDM_RPDE", 5.1),
    ("PDM_DFA", 4.4),
    ("PDM_PPE", 6.3),
];
const MIN_FEATURES: usize = 3;
const UPDRS_MAX: f64 = 108.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdrsFeature {
    pub indicator: String,
    pub z_score: f64,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdrsEstimate {
    pub estimated_updrs: Option<f64>,
    pub confidence: f64,
    pub features_used: Vec<UpdrsFeature>,
    pub note: Option<String>,
}

/// Linear motor-UPDRS estimate from six dysphonia z-scores.
pub fn predict_updrs(z: &ZScores) -> UpdrsEstimate {
    let features_used: Vec<UpdrsFeature> = COEFFICIENTS
        .iter()
        .filter_map(|(id, coefficient)| {
            z_value(z, id).map(|v| UpdrsFeature {
                indicator: id.to_string(),
                z_score: v,
                coefficient: *coefficient,
            })
        })
        .collect();

    if features_used.len() < MIN_FEATURES {
        return UpdrsEstimate {
            estimated_updrs: None,
            confidence: 0.0,
            note: Some(format!(
                "insufficient features ({}/{} minimum)",
                features_used.len(),
                MIN_FEATURES
            )),
            features_used,
        };
    }

    let sum = INTERCEPT
        + features_used
            .iter()
            .map(|f| f.coefficient * f.z_score)
            .sum::<f64>();
    let estimate = clamp(round_to(sum, 1), 0.0, UPDRS_MAX);
    let coverage = features_used.len() as f64 / COEFFICIENTS.len() as f64;
    UpdrsEstimate {
        estimated_updrs: Some(estimate),
        confidence: round_to(clamp(0.30 + coverage * 0.45, 0.30, 0.75), 3),
        features_used,
        note: None,
    }
}
