use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::math::stats::{clamp, round_to};
use crate::pd::pd_scale;
use crate::scores::DomainScores;

const IMPAIRED: f64 = 0.45;
const SEVERE: f64 = 0.30;
const NORMAL: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Moderate,
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdCascadeStage {
    pub stage: u8,
    pub label: String,
    pub confidence: f64,
    pub severity: Option<Severity>,
    pub domain_evidence: BTreeMap<Domain, f64>,
}

impl PdCascadeStage {
    fn new(stage: u8, label: &str, confidence: f64, severity: Option<Severity>, domain: Domain, level: f64) -> Self {
        Self {
            stage,
            label: label.to_string(),
            confidence: round_to(confidence, 3),
            severity,
            domain_evidence: BTreeMap::from([(domain, round_to(level, 3))]),
        }
    }
}

fn severity(level: f64) -> Severity {
    if level < SEVERE { Severity::Severe } else { Severity::Moderate }
}

/// Speech-subsystem cascade for parkinsonism: pre-symptomatic,
/// phonatory, articulatory, then prosodic collapse. Domain scores are
/// mapped onto a 0-1 level first.
pub fn pd_cascade(domains: &DomainScores) -> Vec<PdCascadeStage> {
    let acoustic = domains.get(Domain::Acoustic).map(pd_scale);
    let motor = domains.get(Domain::PdMotor).map(pd_scale);
    let temporal = domains.get(Domain::Temporal).map(pd_scale);
    let ok_or_absent = |level: Option<f64>| level.is_none_or(|l| l >= NORMAL);

    let mut out = Vec::new();
    if let Some(a) = acoustic {
        if (0.35..NORMAL).contains(&a) && ok_or_absent(motor) && ok_or_absent(temporal) {
            out.push(PdCascadeStage::new(0, "pre_symptomatic", 0.35, None, Domain::Acoustic, a));
        }
        if a < IMPAIRED {
            out.push(PdCascadeStage::new(
                1,
                "phonatory_involvement",
                clamp(0.55 + (IMPAIRED - a) * 0.5, 0.55, 0.85),
                Some(severity(a)),
                Domain::Acoustic,
                a,
            ));
        }
    }
    if let Some(m) = motor.filter(|m| *m < IMPAIRED) {
        out.push(PdCascadeStage::new(
            2,
            "articulatory_decline",
            clamp(0.50 + (IMPAIRED - m) * 0.5, 0.50, 0.85),
            Some(severity(m)),
            Domain::PdMotor,
            m,
        ));
    }
    if let Some(t) = temporal.filter(|t| *t < IMPAIRED) {
        out.push(PdCascadeStage::new(
            3,
            "prosodic_fluency_collapse",
            clamp(0.45 + (IMPAIRED - t) * 0.5, 0.45, 0.80),
            Some(severity(t)),
            Domain::Temporal,
            t,
        ));
    }
    out
}
