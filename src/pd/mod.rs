//! Parkinsonian speech analysis: dysphonia signature, motor subtype,
//! atypical-parkinsonism differential, Hoehn & Yahr staging, UPDRS
//! estimate and the speech-subsystem cascade.

pub mod cascade;
pub mod parkinsonism;
pub mod signature;
pub mod staging;
pub mod subtype;
pub mod updrs;

use serde::{Deserialize, Serialize};

use crate::catalog::Condition;
use crate::config::EngineConfig;
use crate::math::stats::{clamp, mean, round_to};
use crate::scores::sentinel::{SentinelAlert, triggered_count};
use crate::scores::{DomainScores, HistoryRecord, ZScores};

use cascade::{PdCascadeStage, pd_cascade};
use parkinsonism::{ParkinsonismResult, differentiate_parkinsonism};
use signature::{PdSignature, detect_pd_signature};
use staging::{StageEstimate, stage_pd};
use subtype::{SubtypeResult, classify_pd_subtype};
use updrs::{UpdrsEstimate, predict_updrs};

/// z below which a PD feature counts as impaired.
pub const IMPAIRED: f64 = -0.4;

/// Domain score mapped onto the 0-1 level the cascade thresholds use;
/// 0 maps to 0.6 and every -1 drops it by 0.3.
pub fn pd_scale(score: f64) -> f64 {
    clamp(0.6 + 0.3 * score, 0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdAnalysis {
    pub signature: PdSignature,
    pub subtype: SubtypeResult,
    pub parkinsonian_differential: ParkinsonismResult,
    pub stage: StageEstimate,
    pub updrs_estimate: UpdrsEstimate,
    pub cascade: Vec<PdCascadeStage>,
    pub confidence: f64,
}

pub fn pd_triggered(alerts: &[SentinelAlert], cfg: &EngineConfig) -> bool {
    triggered_count(alerts, Condition::Parkinson) >= cfg.pd_trigger_sentinels
}

pub fn run_pd_analysis(z: &ZScores, domains: &DomainScores, history: &[HistoryRecord]) -> PdAnalysis {
    let signature = detect_pd_signature(z);
    let subtype = classify_pd_subtype(z);
    let parkinsonian_differential = differentiate_parkinsonism(z, domains);
    let stage = stage_pd(z, history);
    let updrs_estimate = predict_updrs(z);
    let cascade = pd_cascade(domains);

    let confidences: Vec<f64> = [
        signature.confidence,
        subtype.confidence,
        parkinsonian_differential.confidence,
        stage.confidence,
        updrs_estimate.confidence,
    ]
    .into_iter()
    .filter(|c| c.is_finite() && *c > 0.0)
    .collect();

    PdAnalysis {
        signature,
        subtype,
        parkinsonian_differential,
        stage,
        updrs_estimate,
        cascade,
        confidence: round_to(mean(&confidences), 3),
    }
}
