use serde::{Deserialize, Serialize};

use crate::math::stats::{clamp, round_to};
use crate::pd::IMPAIRED;
use crate::scores::{ZScores, z_value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdSubtype {
    TremorDominant,
    Pigd,
    Indeterminate,
}

impl PdSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdSubtype::TremorDominant => "tremor_dominant",
            PdSubtype::Pigd => "pigd",
            PdSubtype::Indeterminate => "indeterminate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtypeEvidence {
    pub indicator: String,
    pub direction: PdSubtype,
    pub value: f64,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtypeResult {
    pub subtype: PdSubtype,
    pub confidence: f64,
    pub evidence: Vec<SubtypeEvidence>,
    pub note: Option<String>,
}

#[derive(Default)]
struct Tally {
    pigd: f64,
    td: f64,
    available: usize,
    evidence: Vec<SubtypeEvidence>,
}

impl Tally {
    fn push(&mut self, direction: PdSubtype, weight: f64, id: &str, value: f64, note: &str) {
        match direction {
            PdSubtype::Pigd => self.pigd += weight,
            PdSubtype::TremorDominant => self.td += weight,
            PdSubtype::Indeterminate => {}
        }
        self.evidence.push(SubtypeEvidence {
            indicator: id.to_string(),
            direction,
            value,
            note: note.to_string(),
        });
    }
}

/// Tremor-dominant versus postural-instability/gait-difficulty profile.
pub fn classify_pd_subtype(z: &ZScores) -> SubtypeResult {
    use PdSubtype::{Pigd, TremorDominant as Td};
    let mut t = Tally::default();

    if let Some(v) = z_value(z, "PDM_DDK_REG") {
        t.available += 1;
        if v < -0.6 {
            t.push(Pigd, 2.0, "PDM_DDK_REG", v, "severely degraded DDK regularity");
        } else if v < IMPAIRED {
            t.push(Pigd, 1.0, "PDM_DDK_REG", v, "mildly degraded DDK regularity");
        } else {
            t.push(Td, 1.5, "PDM_DDK_REG", v, "preserved DDK regularity");
        }
    }
    if let Some(v) = z_value(z, "ACU_F0_RANGE") {
        t.available += 1;
        if v < -0.8 || v > 1.5 {
            t.push(Pigd, 1.5, "ACU_F0_RANGE", v, "abnormal F0 range with pitch breaks");
        } else if v < IMPAIRED {
            t.push(Td, 1.0, "ACU_F0_RANGE", v, "reduced F0 range");
        }
    }
    if let Some(v) = z_value(z, "PDM_FESTINATION") {
        t.available += 1;
        if v < -0.5 {
            t.push(Pigd, 1.5, "PDM_FESTINATION", v, "oral festination");
        }
    }
    if let Some(v) = z_value(z, "TMP_SPEECH_RATE") {
        t.available += 1;
        if v < -0.8 {
            t.push(Pigd, 1.0, "TMP_SPEECH_RATE", v, "markedly reduced speech rate");
        }
    }
    if let Some(v) = z_value(z, "TMP_LPR") {
        t.available += 1;
        if v < -0.6 {
            t.push(Pigd, 1.0, "TMP_LPR", v, "elevated long pause ratio");
        }
    }
    let monopitch = z_value(z, "PDM_MONOPITCH")
        .map(|v| ("PDM_MONOPITCH", v))
        .or_else(|| z_value(z, "ACU_F0_SD").map(|v| ("ACU_F0_SD", v)));
    if let Some((id, v)) = monopitch {
        t.available += 1;
        if v < IMPAIRED {
            t.push(Td, 1.0, id, v, "monopitch present");
        }
    }
    if let Some(v) = z_value(z, "PDM_VSA") {
        t.available += 1;
        if v < -0.6 {
            t.push(Pigd, 1.5, "PDM_VSA", v, "vowel space compression");
        } else {
            t.push(Td, 0.5, "PDM_VSA", v, "relatively preserved vowel space");
        }
    }
    if let Some(v) = z_value(z, "ACU_TREMOR_FREQ") {
        t.available += 1;
        if v < -0.6 {
            t.push(Td, 1.5, "ACU_TREMOR_FREQ", v, "vocal tremor present");
        }
    }

    if t.available < 2 {
        return SubtypeResult {
            subtype: PdSubtype::Indeterminate,
            confidence: 0.0,
            evidence: t.evidence,
            note: Some("insufficient features for subtype classification".to_string()),
        };
    }

    let diff = t.pigd - t.td;
    let (subtype, confidence) = if diff > 1.5 {
        (PdSubtype::Pigd, clamp(0.5 + diff * 0.08, 0.50, 0.95))
    } else if diff < -1.5 {
        (PdSubtype::TremorDominant, clamp(0.5 + diff.abs() * 0.08, 0.50, 0.95))
    } else {
        (PdSubtype::Indeterminate, clamp(0.3 - diff.abs() * 0.05, 0.10, 0.40))
    };
    SubtypeResult {
        subtype,
        confidence: round_to(confidence, 3),
        evidence: t.evidence,
        note: None,
    }
}
