//! Age bands, age-expected decline rates and the acoustic age offsets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "50-59")]
    Fifties,
    #[serde(rename = "60-69")]
    Sixties,
    #[serde(rename = "70-79")]
    Seventies,
    #[serde(rename = "80+")]
    EightyPlus,
}

impl AgeBand {
    pub const ALL: [AgeBand; 4] = [
        AgeBand::Fifties,
        AgeBand::Sixties,
        AgeBand::Seventies,
        AgeBand::EightyPlus,
    ];

    /// Ages below 50 fall into the youngest band. No age, no band.
    pub fn from_age(age: Option<f64>) -> Option<Self> {
        let age = age.filter(|a| a.is_finite())?;
        Some(if age < 60.0 {
            AgeBand::Fifties
        } else if age < 70.0 {
            AgeBand::Sixties
        } else if age < 80.0 {
            AgeBand::Seventies
        } else {
            AgeBand::EightyPlus
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Fifties => "50-59",
            AgeBand::Sixties => "60-69",
            AgeBand::Seventies => "70-79",
            AgeBand::EightyPlus => "80+",
        }
    }

    /// Multiplier on the weekly base aging rate.
    pub fn rate_multiplier(&self) -> f64 {
        match self {
            AgeBand::Fifties => 0.6,
            AgeBand::Sixties => 1.0,
            AgeBand::Seventies => 1.5,
            AgeBand::EightyPlus => 2.2,
        }
    }

    /// Band factor applied to the per-indicator acoustic offset scale.
    pub fn offset_factor(&self) -> f64 {
        match self {
            AgeBand::Fifties => 0.10,
            AgeBand::Sixties => 0.25,
            AgeBand::Seventies => 0.45,
            AgeBand::EightyPlus => 0.70,
        }
    }
}

/// Annual expected change per domain in healthy aging (z units).
fn annual_aging_rate(domain: Domain) -> f64 {
    match domain {
        Domain::Lexical => -0.02,
        Domain::Syntactic => -0.01,
        Domain::Semantic => -0.01,
        Domain::Temporal => -0.015,
        Domain::Memory => -0.02,
        Domain::Discourse => -0.005,
        Domain::Affective => -0.005,
        Domain::Acoustic => -0.01,
        Domain::PdMotor => -0.005,
        Domain::Pragmatic => -0.005,
        Domain::Executive => -0.008,
    }
}

pub fn weekly_aging_rate(domain: Domain) -> f64 {
    annual_aging_rate(domain) / 52.0
}

/// Weekly aging rate scaled for the age band. Without an age the default
/// rate applies.
pub fn age_adjusted_rate(domain: Domain, age: Option<f64>) -> f64 {
    let multiplier = AgeBand::from_age(age).map_or(1.0, |b| b.rate_multiplier());
    weekly_aging_rate(domain) * multiplier
}

pub fn band_rates(band: AgeBand) -> BTreeMap<Domain, f64> {
    Domain::ALL
        .iter()
        .map(|d| (*d, weekly_aging_rate(*d) * band.rate_multiplier()))
        .collect()
}

pub fn age_adjusted_rates(age: Option<f64>) -> BTreeMap<Domain, f64> {
    Domain::ALL
        .iter()
        .map(|d| (*d, age_adjusted_rate(*d, age)))
        .collect()
}

/// Decline beyond what aging explains: |velocity| - |age rate|.
pub fn excess_decline(velocities: &BTreeMap<Domain, f64>, age: Option<f64>) -> BTreeMap<Domain, f64> {
    velocities
        .iter()
        .map(|(d, v)| (*d, v.abs() - age_adjusted_rate(*d, age).abs()))
        .collect()
}

const AGE_OFFSET_SCALES: [(&str, f64); 17] = [
    ("ACU_F0_MEAN", 0.6),
    ("ACU_F0_SD", 0.8),
    ("ACU_F0_RANGE", 0.8),
    ("ACU_JITTER", 1.0),
    ("ACU_SHIMMER", 1.0),
    ("ACU_HNR", 1.0),
    ("ACU_CPP", 0.8),
    ("ACU_ENERGY_RANGE", 0.6),
    ("ACU_VOICE_BREAKS", 0.7),
    ("ACU_BREATHINESS", 0.7),
    ("ACU_SPECTRAL_HARM", 0.6),
    ("ACU_LOUDNESS_DECAY", 0.5),
    ("ACU_TREMOR_FREQ", 0.5),
    ("PDM_VSA", 0.6),
    ("PDM_VAI", 0.6),
    ("PDM_DDK_RATE", 0.8),
    ("PDM_MONOPITCH", 0.8),
];

/// Additive z offset expected from voice aging alone. Zero for
/// indicators outside the age-sensitive set or when no band is known.
pub fn age_offset(indicator: &str, band: Option<AgeBand>) -> f64 {
    let Some(band) = band else {
        return 0.0;
    };
    AGE_OFFSET_SCALES
        .iter()
        .find(|(id, _)| *id == indicator)
        .map_or(0.0, |(_, scale)| scale * band.offset_factor())
}

pub fn age_sensitive_indicators() -> impl Iterator<Item = &'static str> {
    AGE_OFFSET_SCALES.iter().map(|(id, _)| *id)
}
