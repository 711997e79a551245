use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::scores::DomainScores;

const MIN_WEIGHT: f64 = 0.1;
const MAX_DOMAIN_ADJ: f64 = 10.0;

/// Session-level circumstances that distort speech without reflecting
/// decline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confounder {
    Illness,
    PoorSleep,
    MedicationChange,
    EmotionalDistress,
    ColdIllness,
}

impl Confounder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "illness" => Some(Confounder::Illness),
            "poor_sleep" => Some(Confounder::PoorSleep),
            "medication_change" => Some(Confounder::MedicationChange),
            "emotional_distress" => Some(Confounder::EmotionalDistress),
            "cold_illness" => Some(Confounder::ColdIllness),
            _ => None,
        }
    }

    fn global_weight(&self) -> Option<f64> {
        match self {
            Confounder::Illness | Confounder::PoorSleep => Some(0.5),
            Confounder::MedicationChange => Some(0.3),
            Confounder::EmotionalDistress | Confounder::ColdIllness => None,
        }
    }

    fn domain_multipliers(&self) -> &'static [(Domain, f64)] {
        match self {
            Confounder::Illness | Confounder::PoorSleep => &[],
            Confounder::MedicationChange => &[(Domain::PdMotor, 0.5)],
            Confounder::EmotionalDistress => &[
                (Domain::Temporal, 0.5),
                (Domain::Memory, 1.2),
                (Domain::Semantic, 0.7),
                (Domain::Lexical, 1.0),
                (Domain::Syntactic, 1.0),
                (Domain::Discourse, 0.8),
                (Domain::Affective, 0.3),
                (Domain::Pragmatic, 0.6),
                (Domain::Executive, 0.8),
            ],
            Confounder::ColdIllness => &[(Domain::Acoustic, 0.3)],
        }
    }
}

/// Raw confounder flags as reported by the session. Unknown keys are kept
/// here and ignored by the adjuster.
pub type ConfounderFlags = BTreeMap<String, bool>;

/// Whitelisted confounders that are switched on.
pub fn active_confounders(flags: &ConfounderFlags) -> Vec<Confounder> {
    flags
        .iter()
        .filter(|(_, active)| **active)
        .filter_map(|(key, _)| Confounder::parse(key))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfounderAdjustment {
    pub domain_scores: DomainScores,
    pub global_weight: f64,
    pub domain_adjustments: BTreeMap<Domain, f64>,
}

pub fn apply_confounders(scores: &DomainScores, flags: &ConfounderFlags) -> ConfounderAdjustment {
    let mut global_weight: f64 = 1.0;
    let mut domain_adjustments: BTreeMap<Domain, f64> = BTreeMap::new();

    for confounder in active_confounders(flags) {
        if let Some(g) = confounder.global_weight() {
            global_weight = global_weight.min(g).max(MIN_WEIGHT);
        }
        for (domain, adj) in confounder.domain_multipliers() {
            let prev = domain_adjustments.get(domain).copied().unwrap_or(1.0);
            domain_adjustments.insert(*domain, (prev * adj).clamp(MIN_WEIGHT, MAX_DOMAIN_ADJ));
        }
    }

    let mut adjusted = scores.clone();
    for domain in Domain::ALL {
        if let Some(score) = scores.get(domain) {
            let adj = domain_adjustments.get(&domain).copied().unwrap_or(1.0);
            adjusted.scores.insert(domain, Some(score * global_weight * adj));
        }
    }

    ConfounderAdjustment {
        domain_scores: adjusted,
        global_weight,
        domain_adjustments,
    }
}
