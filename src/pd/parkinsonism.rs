use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::differential::patterns::mean_present;
use crate::math::stats::{clamp, round_to};
use crate::pd::{IMPAIRED, pd_scale};
use crate::scores::{DomainScores, ZScores, z_value};

const PRIMARY_MIN: f64 = 0.35;
const ARTICULATORY_IDS: [&str; 4] = ["PDM_VSA", "PDM_VAI", "PDM_VOT", "PDM_SPIRANT"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parkinsonism {
    Pd,
    Msa,
    Psp,
    Et,
}

impl Parkinsonism {
    pub const ALL: [Parkinsonism; 4] = [
        Parkinsonism::Pd,
        Parkinsonism::Msa,
        Parkinsonism::Psp,
        Parkinsonism::Et,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkinsonismEvidence {
    pub feature: String,
    pub supports: Parkinsonism,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkinsonismResult {
    pub probabilities: BTreeMap<Parkinsonism, f64>,
    /// Absent when no syndrome clears the primary threshold.
    pub primary: Option<Parkinsonism>,
    pub confidence: f64,
    pub evidence: Vec<ParkinsonismEvidence>,
}

struct Board {
    scores: BTreeMap<Parkinsonism, f64>,
    evidence: Vec<ParkinsonismEvidence>,
}

impl Board {
    fn add(&mut self, who: Parkinsonism, value: f64) {
        *self.scores.entry(who).or_insert(0.0) += value;
    }

    fn note(&mut self, feature: &str, supports: Parkinsonism, note: &str) {
        self.evidence.push(ParkinsonismEvidence {
            feature: feature.to_string(),
            supports,
            note: note.to_string(),
        });
    }
}

/// Hypokinetic (PD), hypokinetic-ataxic (MSA), hypokinetic-spastic (PSP)
/// and essential-tremor dysarthria profiles.
pub fn differentiate_parkinsonism(z: &ZScores, domains: &DomainScores) -> ParkinsonismResult {
    use Parkinsonism::{Et, Msa, Pd, Psp};
    let mut b = Board {
        scores: Parkinsonism::ALL.iter().map(|p| (*p, 0.0)).collect(),
        evidence: Vec::new(),
    };

    let f0_sd = z_value(z, "ACU_F0_SD");
    let energy = z_value(z, "ACU_ENERGY_RANGE");
    if f0_sd.is_some_and(|v| v < IMPAIRED) {
        b.add(Pd, 2.0);
        b.note("monopitch", Pd, "reduced F0 variability");
    }
    if z_value(z, "PDM_MONOPITCH").is_some_and(|v| v < IMPAIRED) {
        b.add(Pd, 1.5);
    }
    if energy.is_some_and(|v| v < IMPAIRED) {
        b.add(Pd, 1.5);
        b.note("monoloudness", Pd, "reduced energy dynamic range");
    }
    if f0_sd.is_some_and(|v| v > 0.8) {
        b.add(Msa, 2.5);
        b.note("pitch_fluctuation", Msa, "excessive F0 variability");
    }
    if energy.is_some_and(|v| v > 0.8) {
        b.add(Msa, 1.5);
        b.note("loudness_fluctuation", Msa, "excessive energy fluctuation");
    }

    match z_value(z, "PDM_DDK_RATE") {
        Some(v) if v < -1.0 => {
            b.add(Msa, 2.0);
            b.add(Psp, 1.0);
            b.note("ddk_rate", Msa, "severely reduced DDK rate");
        }
        Some(v) if v < IMPAIRED => {
            b.add(Pd, 1.0);
            b.add(Msa, 0.5);
        }
        _ => {}
    }
    if z_value(z, "PDM_DDK_REG").is_some_and(|v| v < -1.0) {
        b.add(Msa, 1.5);
        b.note("ddk_irregularity", Msa, "highly irregular DDK timing");
    }

    let articulatory = mean_present(z, &ARTICULATORY_IDS);
    match articulatory {
        Some(a) if a < -1.0 => {
            b.add(Psp, 2.5);
            b.note("severe_articulatory", Psp, "imprecise consonants");
        }
        Some(a) if a < -0.5 => {
            b.add(Pd, 1.0);
            b.add(Psp, 0.5);
        }
        _ => {}
    }

    if z_value(z, "PDM_FESTINATION").is_some_and(|v| v < -0.8) {
        b.add(Psp, 1.5);
        b.note("festination_stutter", Psp, "oral festination with blocks");
    }
    if z_value(z, "TMP_REPETITION").is_some_and(|v| v < -0.5) {
        b.add(Psp, 1.0);
        b.note("involuntary_repetition", Psp, "involuntary syllable repetition");
    }
    match z_value(z, "ACU_TREMOR_FREQ") {
        Some(v) if v < -0.8 => {
            b.add(Msa, 1.5);
            b.note("prominent_tremor", Msa, "prominent 4-7 Hz vocal tremor");
        }
        Some(v) if v < IMPAIRED => b.add(Pd, 0.5),
        _ => {}
    }
    if z_value(z, "ACU_VOICE_BREAKS").is_some_and(|v| v < -0.6) {
        b.add(Psp, 1.0);
        b.note("voice_breaks", Psp, "frequent voice breaks");
    }
    if z_value(z, "ACU_HNR").is_some_and(|v| v < -0.8) {
        b.add(Pd, 1.0);
        b.add(Msa, 0.5);
        b.note("reduced_hnr", Pd, "reduced harmonics-to-noise ratio");
    }

    if let (Some(j), Some(s)) = (z_value(z, "ACU_JITTER"), z_value(z, "ACU_SHIMMER")) {
        if j < -0.6 && s < -0.6 && articulatory.is_none_or(|a| a > -0.5) {
            b.add(Et, 2.5);
            b.note("vocal_tremor_preserved_artic", Et, "perturbation with preserved articulation");
        }
    }
    if let (Some(acu), Some(motor)) = (domains.get(Domain::Acoustic), domains.get(Domain::PdMotor)) {
        if pd_scale(acu) < 0.4 && pd_scale(motor) > 0.5 {
            b.add(Et, 1.0);
        }
    }

    let total: f64 = b.scores.values().sum();
    if !total.is_finite() || total <= 0.0 {
        return ParkinsonismResult {
            probabilities: Parkinsonism::ALL.iter().map(|p| (*p, 0.25)).collect(),
            primary: None,
            confidence: 0.0,
            evidence: b.evidence,
        };
    }

    let probabilities: BTreeMap<Parkinsonism, f64> = b
        .scores
        .iter()
        .map(|(p, s)| (*p, round_to(s / total, 3)))
        .collect();
    let mut ranked: Vec<(Parkinsonism, f64)> = probabilities.iter().map(|(p, v)| (*p, *v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let (top, p1) = ranked[0];
    let p2 = ranked[1].1;

    ParkinsonismResult {
        probabilities,
        primary: (p1 > PRIMARY_MIN).then_some(top),
        confidence: round_to(clamp(p1 - p2 + 0.3, 0.20, 0.95), 3),
        evidence: b.evidence,
    }
}
