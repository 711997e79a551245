//! Longitudinal and cross-domain pattern detectors used by the rule set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::math::stats::{mean, population_std, round_to};
use crate::scores::{DomainScores, HistoryRecord, ZScores, z_value};

pub const PRAGMATIC_IDS: [&str; 6] = [
    "PRA_INDIRECT_SPEECH",
    "PRA_DISCOURSE_MARKERS",
    "PRA_REGISTER_SHIFT",
    "PRA_NARRATIVE_STRUCTURE",
    "PRA_PERSPECTIVE_TAKING",
    "PRA_HUMOR_IRONY",
];

pub const EXECUTIVE_IDS: [&str; 5] = [
    "EXE_TASK_SWITCHING",
    "EXE_INHIBITION",
    "EXE_PLANNING",
    "EXE_DUAL_TASK",
    "EXE_COGNITIVE_FLEXIBILITY",
];

/// Mean of the present z-scores among `ids`, or `None` when none is present.
pub fn mean_present(z: &ZScores, ids: &[&str]) -> Option<f64> {
    let vals: Vec<f64> = ids.iter().filter_map(|id| z_value(z, id)).collect();
    if vals.is_empty() { None } else { Some(mean(&vals)) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemporalPattern {
    InsufficientData,
    MonotonicDecline { weeks: usize, decline_ratio: f64 },
    Episodic { oscillations: usize },
    AcuteDrop { drop_at: usize, magnitude: f64 },
    Stable { mean: f64, std: f64 },
    Unclear,
}

pub fn detect_temporal_pattern(timeline: &[HistoryRecord]) -> TemporalPattern {
    if timeline.len() < 4 {
        return TemporalPattern::InsufficientData;
    }
    let c: Vec<f64> = timeline
        .iter()
        .map(|t| if t.composite.is_finite() { t.composite } else { 0.0 })
        .collect();
    let n = c.len();

    let declines = (1..n).filter(|&i| c[i] < c[i - 1] - 0.05).count();
    if declines as f64 >= n as f64 * 0.6 {
        return TemporalPattern::MonotonicDecline {
            weeks: n,
            decline_ratio: declines as f64 / (n - 1) as f64,
        };
    }

    let oscillations = (2..n)
        .filter(|&i| {
            let prev = c[i - 1] - c[i - 2];
            let curr = c[i] - c[i - 1];
            (prev > 0.1 && curr < -0.1) || (prev < -0.1 && curr > 0.1)
        })
        .count();
    if oscillations >= 2 {
        return TemporalPattern::Episodic { oscillations };
    }

    if let Some(i) = (1..n).find(|&i| c[i] - c[i - 1] < -0.5) {
        return TemporalPattern::AcuteDrop {
            drop_at: i,
            magnitude: c[i] - c[i - 1],
        };
    }

    let std = population_std(&c);
    if std < 0.15 {
        return TemporalPattern::Stable { mean: mean(&c), std };
    }
    TemporalPattern::Unclear
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdCascadeSignal {
    pub detected: bool,
    pub stage: u8,
    pub confidence: f64,
    pub order_preserved: bool,
}

/// Ordered semantic/lexical -> syntactic -> temporal involvement.
pub fn detect_ad_cascade(domains: &DomainScores) -> AdCascadeSignal {
    let lex = domains.or_zero(Domain::Lexical);
    let sem = domains.or_zero(Domain::Semantic);
    let syn = domains.or_zero(Domain::Syntactic);
    let tmp = domains.or_zero(Domain::Temporal);

    let stage1 = lex < -0.5 && sem < -0.5;
    let stage2 = stage1 && syn < -0.5;
    let stage3 = stage2 && tmp < -0.5;
    let order_preserved = sem.abs() >= syn.abs() * 0.8;

    if !stage1 {
        return AdCascadeSignal {
            detected: false,
            stage: 0,
            confidence: 0.0,
            order_preserved,
        };
    }
    AdCascadeSignal {
        detected: true,
        stage: if stage3 {
            3
        } else if stage2 {
            2
        } else {
            1
        },
        confidence: if order_preserved { 0.8 } else { 0.4 },
        order_preserved,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LbdPattern {
    pub detected: bool,
    pub confidence: f64,
    pub features: Vec<String>,
    pub differentials: BTreeMap<String, String>,
    pub score: f64,
}

pub fn detect_lbd_pattern(domains: &DomainScores, z: &ZScores, timeline: &[HistoryRecord]) -> LbdPattern {
    let mut features: Vec<String> = Vec::new();
    let mut score = 0.0;

    if z_value(z, "TMP_VARIABILITY").is_some_and(|v| v < -0.8) {
        features.push("fluctuating_cognition".to_string());
        score += 0.3;
    }
    let motor = domains.or_zero(Domain::PdMotor) < -0.3 || domains.or_zero(Domain::Acoustic) < -0.3;
    if motor {
        features.push("parkinsonism".to_string());
        score += 0.25;
    }
    let cognitive = domains.or_zero(Domain::Semantic) < -0.3 || domains.or_zero(Domain::Memory) < -0.3;
    if cognitive {
        features.push("cognitive_decline".to_string());
        score += 0.25;
    }
    if timeline.len() >= 4 {
        let composites: Vec<f64> = timeline.iter().map(|t| t.composite).collect();
        if population_std(&composites) > 0.25 {
            features.push("high_session_variance".to_string());
            score += 0.2;
        }
    }

    let mut differentials = BTreeMap::new();
    if motor && cognitive {
        differentials.insert(
            "vs_pd".to_string(),
            "concurrent motor and cognitive decline".to_string(),
        );
    }
    if features.iter().any(|f| f == "fluctuating_cognition") {
        differentials.insert("vs_ad".to_string(), "fluctuating rather than monotonic".to_string());
    }

    LbdPattern {
        detected: features.len() >= 2 && score >= 0.4,
        confidence: round_to(f64::min(score, 0.95), 2),
        features,
        differentials,
        score: round_to(score, 2),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FtdVariant {
    Behavioral,
    Semantic,
    Nonfluent,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtdPattern {
    pub detected: bool,
    pub variant: Option<FtdVariant>,
    pub confidence: f64,
    pub features: Vec<String>,
    pub differentials: BTreeMap<String, String>,
    pub score: f64,
}

pub fn detect_ftd_pattern(domains: &DomainScores, z: &ZScores) -> FtdPattern {
    let mut features: Vec<String> = Vec::new();
    let mut score = 0.0;
    let mut variant: Option<FtdVariant> = None;
    let mut differentials = BTreeMap::new();

    let pragmatic = mean_present(z, &PRAGMATIC_IDS);
    let memory_preserved = domains.or_zero(Domain::Memory) > -0.3;
    if pragmatic.is_some_and(|p| p < -0.6) && memory_preserved {
        features.push("pragmatic_collapse".to_string());
        features.push("memory_preserved".to_string());
        score += 0.4;
        variant = Some(FtdVariant::Behavioral);
        differentials.insert(
            "vs_ad".to_string(),
            "pragmatic collapse with preserved memory".to_string(),
        );
    }

    let word_freq = z_value(z, "LEX_WORD_FREQ");
    let syntax_preserved = domains.or_zero(Domain::Syntactic) > -0.2;
    if word_freq.is_some_and(|w| w < -0.8) && syntax_preserved {
        features.push("severe_word_finding_deficit".to_string());
        features.push("syntax_preserved".to_string());
        score += 0.35;
        variant = Some(variant.map_or(FtdVariant::Semantic, |_| FtdVariant::Mixed));
        differentials.insert(
            "vs_ad".to_string(),
            "naming failure with preserved syntax".to_string(),
        );
    }

    if mean_present(z, &EXECUTIVE_IDS).is_some_and(|e| e < -0.5) {
        features.push("executive_dysfunction".to_string());
        score += 0.2;
    }

    if domains.or_zero(Domain::Syntactic) < -0.6
        && domains.or_zero(Domain::Temporal) < -0.5
        && memory_preserved
    {
        features.push("agrammatism".to_string());
        features.push("effortful_speech".to_string());
        score += 0.3;
        variant = Some(variant.map_or(FtdVariant::Nonfluent, |_| FtdVariant::Mixed));
    }

    FtdPattern {
        detected: features.len() >= 2 && score >= 0.3,
        variant,
        confidence: round_to(f64::min(score, 0.95), 2),
        features,
        differentials,
        score: round_to(score, 2),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VciPattern {
    pub detected: bool,
    pub confidence: f64,
    pub features: Vec<String>,
    /// Drops below -0.3 followed by a plateau.
    pub step_count: usize,
    pub score: f64,
}

const STEP_DROP: f64 = -0.3;
const PLATEAU_BAND: f64 = 0.1;
const PLATEAU_SPAN: usize = 2;

/// Count acute composite drops that are followed by a plateau of up to
/// two near-flat steps. At least one step after the drop is required.
pub fn count_step_drops(timeline: &[HistoryRecord]) -> usize {
    if timeline.len() < 4 {
        return 0;
    }
    let c: Vec<f64> = timeline.iter().map(|t| t.composite).collect();
    let deltas: Vec<f64> = c.windows(2).map(|w| w[1] - w[0]).collect();
    let mut steps = 0;
    for (i, d) in deltas.iter().enumerate() {
        if *d >= STEP_DROP {
            continue;
        }
        let after = &deltas[i + 1..deltas.len().min(i + 1 + PLATEAU_SPAN)];
        if !after.is_empty() && after.iter().all(|a| a.abs() < PLATEAU_BAND) {
            steps += 1;
        }
    }
    steps
}

pub fn detect_vci_pattern(domains: &DomainScores, timeline: &[HistoryRecord]) -> VciPattern {
    let mut features: Vec<String> = Vec::new();
    let mut score = 0.0;

    let step_count = count_step_drops(timeline);
    if step_count >= 1 {
        features.push("step_wise_decline".to_string());
        score += 0.35;
    }
    let exe = domains.or_zero(Domain::Executive);
    let mem = domains.or_zero(Domain::Memory);
    if exe < -0.5 && mem > -0.3 {
        features.push("executive_predominant".to_string());
        score += 0.3;
    }
    if domains.or_zero(Domain::Temporal) < -0.3 {
        features.push("processing_slowing".to_string());
        score += 0.15;
    }

    VciPattern {
        detected: features.len() >= 2 && score >= 0.4,
        confidence: round_to(f64::min(score, 0.95), 2),
        features,
        step_count,
        score: round_to(score, 2),
    }
}
