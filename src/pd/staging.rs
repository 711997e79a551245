use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::differential::patterns::mean_present;
use crate::math::stats::{clamp, mean, round_to};
use crate::pd::IMPAIRED;
use crate::scores::{HistoryRecord, ZScores, z_value};

const PHONATORY_IDS: [&str; 8] = [
    "ACU_F0_SD",
    "PDM_MONOPITCH",
    "ACU_HNR",
    "ACU_ENERGY_RANGE",
    "ACU_JITTER",
    "ACU_SHIMMER",
    "ACU_BREATHINESS",
    "ACU_LOUDNESS_DECAY",
];
const ARTICULATORY_IDS: [&str; 7] = [
    "PDM_VSA",
    "PDM_VAI",
    "PDM_DDK_RATE",
    "PDM_DDK_REG",
    "PDM_VOT",
    "PDM_SPIRANT",
    "ACU_VOICE_BREAKS",
];
const PROSODIC_IDS: [&str; 5] = [
    "TMP_SPEECH_RATE",
    "TMP_LPR",
    "TMP_PAUSE_DURATION",
    "TMP_ARTIC_RATE",
    "PDM_FESTINATION",
];
const PROGRESSION_WINDOW: usize = 6;

/// Hoehn & Yahr band inferred from which speech subsystems are impaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HyStage {
    Prodromal,
    #[serde(rename = "hy_1_2")]
    Hy1To2,
    #[serde(rename = "hy_2_5_3")]
    Hy2_5To3,
    #[serde(rename = "hy_4_5")]
    Hy4To5,
    Indeterminate,
}

impl HyStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            HyStage::Prodromal => "prodromal",
            HyStage::Hy1To2 => "hy_1_2",
            HyStage::Hy2_5To3 => "hy_2_5_3",
            HyStage::Hy4To5 => "hy_4_5",
            HyStage::Indeterminate => "indeterminate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionVelocity {
    RapidDecline,
    GradualDecline,
    Stable,
    Improving,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEstimate {
    pub estimated_stage: HyStage,
    pub confidence: f64,
    pub domain_pattern: String,
    pub progression_velocity: Option<ProgressionVelocity>,
}

fn count_impaired(z: &ZScores, ids: &[&str]) -> usize {
    ids.iter()
        .filter_map(|id| z_value(z, id))
        .filter(|v| *v < IMPAIRED)
        .count()
}

pub fn stage_pd(z: &ZScores, history: &[HistoryRecord]) -> StageEstimate {
    let phon = count_impaired(z, &PHONATORY_IDS);
    let artic = count_impaired(z, &ARTICULATORY_IDS);
    let pros = count_impaired(z, &PROSODIC_IDS);

    let monopitch_only = z_value(z, "PDM_MONOPITCH")
        .or_else(|| z_value(z, "ACU_F0_SD"))
        .is_some_and(|mp| mp < IMPAIRED && phon <= 1 && artic == 0 && pros == 0);

    let (stage, confidence, pattern) = if monopitch_only {
        (HyStage::Prodromal, 0.40, "monopitch_isolated")
    } else if artic == 0 && pros == 0 && phon > 0 {
        (
            HyStage::Hy1To2,
            clamp(0.45 + phon as f64 * 0.06, 0.45, 0.75),
            "phonatory_dominant",
        )
    } else if artic > 0 && pros <= 1 {
        let severity = mean_present(z, &ARTICULATORY_IDS).map_or(0.0, f64::abs);
        (
            HyStage::Hy2_5To3,
            clamp(0.40 + severity * 0.10 + artic as f64 * 0.04, 0.40, 0.75),
            "phonatory_plus_articulatory",
        )
    } else if pros >= 2 || (artic >= 3 && pros >= 1) {
        (
            HyStage::Hy4To5,
            clamp(0.35 + pros as f64 * 0.08 + artic as f64 * 0.04, 0.35, 0.70),
            "articulation_dominant_with_prosodic_collapse",
        )
    } else if phon > 0 || artic > 0 {
        (HyStage::Hy1To2, 0.35, "mixed_mild")
    } else {
        (HyStage::Indeterminate, 0.0, "insufficient_impairment")
    };

    StageEstimate {
        estimated_stage: stage,
        confidence: round_to(confidence, 3),
        domain_pattern: pattern.to_string(),
        progression_velocity: progression_velocity(history),
    }
}

/// Second-half minus first-half mean of the recent PD-motor scores.
pub fn progression_velocity(history: &[HistoryRecord]) -> Option<ProgressionVelocity> {
    if history.len() < 3 {
        return None;
    }
    let recent = &history[history.len().saturating_sub(PROGRESSION_WINDOW)..];
    let scores: Vec<f64> = recent
        .iter()
        .filter_map(|r| r.domain_scores.get(Domain::PdMotor))
        .collect();
    if scores.len() < 3 {
        return None;
    }
    let split = scores.len().div_ceil(2);
    let delta = mean(&scores[split..]) - mean(&scores[..split]);
    let delta = if delta.is_finite() { delta } else { 0.0 };
    Some(if delta < -0.15 {
        ProgressionVelocity::RapidDecline
    } else if delta < -0.05 {
        ProgressionVelocity::GradualDecline
    } else if delta > 0.05 {
        ProgressionVelocity::Improving
    } else {
        ProgressionVelocity::Stable
    })
}
