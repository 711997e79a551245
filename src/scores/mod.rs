pub mod aging;
pub mod baseline;
pub mod cascade;
pub mod confounder;
pub mod decline;
pub mod domain;
pub mod sentinel;
pub mod session;
pub mod zscore;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Domain};

/// One indicator observation at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FeatureValue {
    Measured {
        value: f64,
        confidence: f64,
    },
    #[default]
    Unmeasured,
}

impl FeatureValue {
    pub fn measured(value: f64) -> Self {
        Self::with_confidence(value, 1.0)
    }

    /// Non-finite values collapse to `Unmeasured`; confidence is clamped
    /// to [0, 1].
    pub fn with_confidence(value: f64, confidence: f64) -> Self {
        if !value.is_finite() {
            return FeatureValue::Unmeasured;
        }
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            1.0
        };
        FeatureValue::Measured { value, confidence }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            FeatureValue::Measured { value, .. } => Some(*value),
            FeatureValue::Unmeasured => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            FeatureValue::Measured { confidence, .. } => Some(*confidence),
            FeatureValue::Unmeasured => None,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, FeatureValue::Measured { .. })
    }
}

/// Indicator id -> observation for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every catalog indicator measured at the same value.
    pub fn uniform(catalog: &Catalog, value: f64) -> Self {
        let mut vector = Self::new();
        for ind in &catalog.indicators {
            vector.insert(&ind.id, FeatureValue::measured(value));
        }
        vector
    }

    pub fn insert(&mut self, id: &str, value: FeatureValue) {
        self.values.insert(id.to_string(), value);
    }

    pub fn set(&mut self, id: &str, value: f64) {
        self.insert(id, FeatureValue::measured(value));
    }

    pub fn get(&self, id: &str) -> FeatureValue {
        self.values.get(id).copied().unwrap_or_default()
    }

    pub fn value(&self, id: &str) -> Option<f64> {
        self.get(id).value()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn measured_count(&self) -> usize {
        self.values.values().filter(|v| v.is_measured()).count()
    }

    pub fn has_audio(&self, catalog: &Catalog) -> bool {
        catalog.audio_ids().any(|id| self.get(id).is_measured())
    }

    /// Confidence of every measured indicator whose confidence is below 1.
    pub fn confidence_map(&self) -> BTreeMap<String, f64> {
        self.values
            .iter()
            .filter_map(|(id, v)| v.confidence().filter(|c| *c < 1.0).map(|c| (id.clone(), c)))
            .collect()
    }
}

impl FromIterator<(String, FeatureValue)> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = (String, FeatureValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Indicator id -> signed z. Unmeasured indicators are absent keys.
pub type ZScores = BTreeMap<String, f64>;

pub fn z_value(z: &ZScores, id: &str) -> Option<f64> {
    z.get(id).copied().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    pub scores: BTreeMap<Domain, Option<f64>>,
    pub domain_confidence: BTreeMap<Domain, f64>,
}

impl Default for DomainScores {
    fn default() -> Self {
        Self::empty()
    }
}

impl DomainScores {
    /// All eleven domains absent.
    pub fn empty() -> Self {
        Self {
            scores: Domain::ALL.iter().map(|d| (*d, None)).collect(),
            domain_confidence: Domain::ALL.iter().map(|d| (*d, 0.0)).collect(),
        }
    }

    /// Scores for the listed domains with full confidence; the rest absent.
    pub fn from_pairs(pairs: &[(Domain, f64)]) -> Self {
        let mut out = Self::empty();
        for (domain, score) in pairs {
            out.set(*domain, Some(*score), 1.0);
        }
        out
    }

    pub fn uniform(score: f64) -> Self {
        let pairs: Vec<(Domain, f64)> = Domain::ALL.iter().map(|d| (*d, score)).collect();
        Self::from_pairs(&pairs)
    }

    pub fn set(&mut self, domain: Domain, score: Option<f64>, confidence: f64) {
        self.scores.insert(domain, score.filter(|v| v.is_finite()));
        self.domain_confidence.insert(domain, confidence);
    }

    pub fn get(&self, domain: Domain) -> Option<f64> {
        self.scores
            .get(&domain)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }

    pub fn or_zero(&self, domain: Domain) -> f64 {
        self.get(domain).unwrap_or(0.0)
    }

    pub fn confidence(&self, domain: Domain) -> f64 {
        self.domain_confidence.get(&domain).copied().unwrap_or(0.0)
    }

    pub fn present(&self) -> impl Iterator<Item = (Domain, f64)> + '_ {
        Domain::ALL
            .into_iter()
            .filter_map(move |d| self.get(d).map(|v| (d, v)))
    }

    pub fn present_count(&self) -> usize {
        self.present().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Green,
    Yellow,
    Orange,
    Red,
    Unknown,
}

impl AlertLevel {
    pub fn from_composite(composite: f64) -> Self {
        if composite >= -0.5 {
            AlertLevel::Green
        } else if composite >= -1.0 {
            AlertLevel::Yellow
        } else if composite >= -1.5 {
            AlertLevel::Orange
        } else {
            AlertLevel::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Green => "green",
            AlertLevel::Yellow => "yellow",
            AlertLevel::Orange => "orange",
            AlertLevel::Red => "red",
            AlertLevel::Unknown => "unknown",
        }
    }
}

/// Prior session outcome as seen by the longitudinal analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub composite: f64,
    pub domain_scores: DomainScores,
}

impl HistoryRecord {
    pub fn new(composite: f64, domain_scores: DomainScores) -> Self {
        Self {
            composite,
            domain_scores,
        }
    }
}
