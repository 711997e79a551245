use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::stats::{clamp, round_to};
use crate::pd::IMPAIRED;
use crate::scores::{ZScores, z_value};

const QUARTET: [&str; 4] = ["PDM_PPE", "PDM_RPDE", "PDM_DFA", "ACU_HNR"];

const SUPPORTING: [(&str, &str); 4] = [
    ("ACU_F0_SD", "reduced F0 variability (monopitch)"),
    ("PDM_MONOPITCH", "connected-speech monopitch"),
    ("ACU_TREMOR_FREQ", "vocal tremor in the 4-7 Hz band"),
    ("ACU_VOICE_BREAKS", "voice breaks from vocal fold instability"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingEvidence {
    pub indicator: String,
    pub value: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdSignature {
    pub detected: bool,
    pub confidence: f64,
    pub quartet_scores: BTreeMap<String, Option<f64>>,
    pub supporting_evidence: Vec<SupportingEvidence>,
    pub note: Option<String>,
}

/// Dysphonia quartet (PPE, RPDE, DFA, HNR): positive when at least three
/// of the four are impaired. All four must be present.
pub fn detect_pd_signature(z: &ZScores) -> PdSignature {
    let quartet_scores: BTreeMap<String, Option<f64>> = QUARTET
        .iter()
        .map(|id| (id.to_string(), z_value(z, id)))
        .collect();
    let available: Vec<f64> = quartet_scores.values().flatten().copied().collect();
    if available.len() < QUARTET.len() {
        return PdSignature {
            detected: false,
            confidence: 0.0,
            quartet_scores,
            supporting_evidence: Vec::new(),
            note: Some(format!(
                "insufficient quartet data ({}/{} available)",
                available.len(),
                QUARTET.len()
            )),
        };
    }

    let impaired: Vec<f64> = available.iter().copied().filter(|v| *v < IMPAIRED).collect();
    let detected = impaired.len() >= 3;
    let mut confidence = if detected {
        let count_factor = if impaired.len() == 4 { 0.80 } else { 0.60 };
        let magnitude: f64 = impaired.iter().map(|v| v.abs()).sum();
        count_factor + clamp(magnitude / (impaired.len() as f64 * 2.0), 0.0, 0.20)
    } else {
        impaired.len() as f64 * 0.15
    };

    let mut supporting_evidence = Vec::new();
    for (id, interpretation) in SUPPORTING {
        if let Some(v) = z_value(z, id).filter(|v| *v < IMPAIRED) {
            supporting_evidence.push(SupportingEvidence {
                indicator: id.to_string(),
                value: v,
                interpretation: interpretation.to_string(),
            });
            if detected {
                confidence = clamp(confidence + 0.05, 0.0, 1.0);
            }
        }
    }

    PdSignature {
        detected,
        confidence: round_to(confidence, 3),
        quartet_scores,
        supporting_evidence,
        note: None,
    }
}
