//! Differential diagnosis across the eleven conditions.
//!
//! Rules in [`rules::RULES`] run in order against a running score board;
//! the board is then normalized into probabilities that sum to one, and
//! independent per-condition probabilities are derived with a logistic
//! squash so that co-occurring pathologies can be reported.

pub mod patterns;
pub mod rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Condition;
use crate::math::stats::{logistic, round_to};
use crate::scores::confounder::ConfounderFlags;
use crate::scores::decline::DeclineProfile;
use crate::scores::{DomainScores, HistoryRecord, ZScores};

use patterns::{
    FtdPattern, LbdPattern, TemporalPattern, VciPattern, detect_ftd_pattern, detect_lbd_pattern,
    detect_temporal_pattern, detect_vci_pattern,
};
use rules::{RULES, RuleContext, ScoreDelta};

const CONFIDENCE_SCALE: f64 = 0.3;
const CONFIDENCE_CAP: f64 = 0.95;
const SECOND_FLOOR: f64 = 0.01;
const INDEPENDENT_CENTER: f64 = 0.25;
const INDEPENDENT_STEEPNESS: f64 = 6.0;
const MIXED_THRESHOLD: f64 = 0.3;

/// Longitudinal and session context available to the rules.
#[derive(Debug, Clone, Default)]
pub struct DifferentialContext {
    pub timeline: Vec<HistoryRecord>,
    pub confounders: Vec<ConfounderFlags>,
    pub topic_genre: Option<String>,
    pub topic_adjustments: BTreeMap<String, f64>,
    pub indicator_confidence: BTreeMap<String, f64>,
    pub patient_age: Option<f64>,
    pub decline_profile: Option<DeclineProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    MonitorRoutine,
    ExtendMonitoring,
    ReferMemoryClinic,
    ConsiderSecondary,
    ScreenDepression,
    DeferAdReferral,
    ReferMovementDisorder,
    AtypicalParkinsonismWorkup,
    ReviewMedication,
    DeferCognitiveConcern,
    GriefSupport,
    SleepStudy,
    NeurolepticCaution,
    ReferBehavioralNeurology,
    VascularWorkup,
    ComorbidPdDepression,
    MixedPathologyWorkup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialResult {
    pub probabilities: BTreeMap<Condition, f64>,
    pub independent_probabilities: BTreeMap<Condition, f64>,
    pub primary: Condition,
    pub secondary: Condition,
    pub confidence: f64,
    pub mixed_pathology: bool,
    pub evidence: BTreeMap<Condition, Vec<String>>,
    pub flags: Vec<String>,
    pub rules_fired: Vec<u8>,
    pub recommendations: Vec<Recommendation>,
    pub temporal_pattern: TemporalPattern,
    pub lbd_pattern: LbdPattern,
    pub ftd_pattern: FtdPattern,
    pub vci_pattern: VciPattern,
}

#[derive(Debug, Clone)]
struct ScoreBoard {
    scores: BTreeMap<Condition, f64>,
    evidence: BTreeMap<Condition, Vec<String>>,
    flags: Vec<String>,
    fired: Vec<u8>,
}

impl ScoreBoard {
    fn new() -> Self {
        Self {
            scores: Condition::ALL.iter().map(|c| (*c, 0.0)).collect(),
            evidence: BTreeMap::new(),
            flags: Vec::new(),
            fired: Vec::new(),
        }
    }

    /// Scales land before additions within one delta.
    fn apply(&mut self, rule_id: u8, delta: ScoreDelta) {
        if delta.changes_scores() {
            self.fired.push(rule_id);
        }
        for (cond, factor) in delta.scales {
            if let Some(s) = self.scores.get_mut(&cond) {
                *s *= factor;
            }
        }
        for (cond, value) in delta.adds {
            *self.scores.entry(cond).or_insert(0.0) += value;
        }
        for (cond, text) in delta.evidence {
            self.evidence.entry(cond).or_default().push(text);
        }
        for flag in delta.flags {
            if !self.flags.contains(&flag) {
                self.flags.push(flag);
            }
        }
    }
}

pub fn run_differential(
    domains: &DomainScores,
    z: &ZScores,
    ctx: &DifferentialContext,
) -> DifferentialResult {
    let board = RULES.iter().fold(ScoreBoard::new(), |mut board, rule| {
        let delta = (rule.apply)(&RuleContext {
            domains,
            z,
            ctx,
            scores: &board.scores,
        });
        board.apply(rule.id, delta);
        board
    });

    let floored: BTreeMap<Condition, f64> = board
        .scores
        .iter()
        .map(|(c, s)| (*c, if s.is_finite() { s.max(0.0) } else { 0.0 }))
        .collect();
    let probabilities = normalize(&floored);

    let mut ranked: Vec<(Condition, f64)> = Condition::ALL
        .iter()
        .map(|c| (*c, probabilities.get(c).copied().unwrap_or(0.0)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let (primary, p1) = ranked[0];
    let (secondary, p2) = ranked[1];
    let second = if p2 > 0.0 { p2 } else { SECOND_FLOOR };
    let confidence = round_to((p1 / second * CONFIDENCE_SCALE).min(CONFIDENCE_CAP), 2);

    let independent_probabilities: BTreeMap<Condition, f64> = floored
        .iter()
        .map(|(c, s)| {
            (
                *c,
                round_to(logistic(*s, INDEPENDENT_CENTER, INDEPENDENT_STEEPNESS), 3),
            )
        })
        .collect();
    let mixed_pathology = independent_probabilities
        .iter()
        .filter(|(c, p)| c.is_disease() && **p > MIXED_THRESHOLD)
        .count()
        >= 2;

    let recommendations = recommend(primary, secondary, confidence, &board.evidence);

    DifferentialResult {
        probabilities,
        independent_probabilities,
        primary,
        secondary,
        confidence,
        mixed_pathology,
        evidence: board.evidence,
        flags: board.flags,
        rules_fired: board.fired,
        recommendations,
        temporal_pattern: detect_temporal_pattern(&ctx.timeline),
        lbd_pattern: detect_lbd_pattern(domains, z, &ctx.timeline),
        ftd_pattern: detect_ftd_pattern(domains, z),
        vci_pattern: detect_vci_pattern(domains, &ctx.timeline),
    }
}

/// Probabilities rounded to 3 decimals that sum to exactly one. An empty
/// board gives the uniform distribution.
pub fn normalize(scores: &BTreeMap<Condition, f64>) -> BTreeMap<Condition, f64> {
    let total: f64 = scores.values().sum();
    if !total.is_finite() || total <= 0.0 {
        let uniform = round_to(1.0 / Condition::ALL.len() as f64, 3);
        return Condition::ALL.iter().map(|c| (*c, uniform)).collect();
    }
    let mut out: BTreeMap<Condition, f64> = scores
        .iter()
        .map(|(c, s)| (*c, round_to(s / total, 3)))
        .collect();
    let sum: f64 = out.values().sum();
    let remainder = round_to(1.0 - sum, 3);
    if remainder != 0.0 {
        let largest = out
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(c, _)| *c);
        if let Some(c) = largest {
            if let Some(p) = out.get_mut(&c) {
                *p = round_to(*p + remainder, 3);
            }
        }
    }
    out
}

/// Follow-up codes for the ranked result. Evidence for two conditions can
/// add a comorbidity code on top of the primary's own.
pub fn recommend(
    primary: Condition,
    secondary: Condition,
    confidence: f64,
    evidence: &BTreeMap<Condition, Vec<String>>,
) -> Vec<Recommendation> {
    use Recommendation as R;
    let mut out = match primary {
        Condition::NormalAging if confidence > 0.5 => vec![R::MonitorRoutine],
        Condition::NormalAging => vec![R::ExtendMonitoring],
        Condition::Alzheimer if confidence < 0.6 => vec![R::ReferMemoryClinic, R::ConsiderSecondary],
        Condition::Alzheimer => vec![R::ReferMemoryClinic],
        Condition::Depression => vec![R::ScreenDepression, R::DeferAdReferral],
        Condition::Parkinson => vec![R::ReferMovementDisorder],
        Condition::Medication => vec![R::ReviewMedication, R::DeferCognitiveConcern],
        Condition::Grief => vec![R::GriefSupport],
        Condition::Msa | Condition::Psp => {
            vec![R::ReferMovementDisorder, R::AtypicalParkinsonismWorkup]
        }
        Condition::Lbd => vec![R::ReferMovementDisorder, R::SleepStudy, R::NeurolepticCaution],
        Condition::Ftd => vec![R::ReferBehavioralNeurology],
        Condition::Vci => vec![R::VascularWorkup],
    };
    if primary == Condition::Parkinson && matches!(secondary, Condition::Msa | Condition::Psp) {
        out.push(R::AtypicalParkinsonismWorkup);
    }
    if primary.is_disease() {
        let has = |c: Condition| evidence.get(&c).is_some_and(|e| !e.is_empty());
        if has(Condition::Parkinson) && has(Condition::Depression) {
            out.push(R::ComorbidPdDepression);
        }
        if has(Condition::Lbd) && has(Condition::Alzheimer) {
            out.push(R::MixedPathologyWorkup);
        }
    }
    out
}
