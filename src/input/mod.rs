use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::catalog::Catalog;
use crate::scores::confounder::{Confounder, ConfounderFlags};
use crate::scores::session::SessionInput;
use crate::scores::zscore::TopicContext;
use crate::scores::{FeatureValue, FeatureVector};

/// A feature is either a bare number or `{ "value": .., "confidence": .. }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFeature {
    Plain(f64),
    Detailed {
        value: Option<f64>,
        confidence: Option<f64>,
    },
}

impl RawFeature {
    fn into_value(self) -> FeatureValue {
        match self {
            RawFeature::Plain(v) => FeatureValue::measured(v),
            RawFeature::Detailed {
                value: Some(v),
                confidence,
            } => FeatureValue::with_confidence(v, confidence.unwrap_or(1.0)),
            RawFeature::Detailed { value: None, .. } => FeatureValue::Unmeasured,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSession {
    id: Option<String>,
    #[serde(default)]
    features: BTreeMap<String, Option<RawFeature>>,
    #[serde(default)]
    confounders: ConfounderFlags,
    topic_genre: Option<String>,
    topic_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPatient {
    patient_id: Option<String>,
    age: Option<f64>,
    calibration_sessions: Option<usize>,
    sessions: Vec<RawSession>,
}

#[derive(Debug, Clone)]
pub struct PatientRecord {
    pub patient_id: String,
    pub age: Option<f64>,
    pub calibration_sessions: Option<usize>,
    pub sessions: Vec<SessionInput>,
}

impl PatientRecord {
    /// Feature ids that the catalog does not define, in first-seen order.
    pub fn unknown_indicators(&self, catalog: &Catalog) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for session in &self.sessions {
            for (id, _) in session.features.iter() {
                if !catalog.contains(id) && !out.iter().any(|o| o == id) {
                    out.push(id.to_string());
                }
            }
        }
        out
    }

    pub fn unknown_confounders(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for session in &self.sessions {
            for key in session.confounders.keys() {
                if Confounder::parse(key).is_none() && !out.contains(key) {
                    out.push(key.clone());
                }
            }
        }
        out
    }
}

pub fn parse_patient(content: &str, source: &str) -> Result<PatientRecord> {
    let raw: RawPatient = serde_json::from_str(content)
        .with_context(|| format!("{}: malformed patient JSON", source))?;
    if raw.sessions.is_empty() {
        bail!("{}: no sessions", source);
    }
    if let Some(age) = raw.age {
        if !age.is_finite() || age < 0.0 {
            bail!("{}: invalid age {}", source, age);
        }
    }

    let sessions = raw
        .sessions
        .into_iter()
        .map(|s| {
            let features: FeatureVector = s
                .features
                .into_iter()
                .map(|(id, f)| (id, f.map_or(FeatureValue::Unmeasured, RawFeature::into_value)))
                .collect();
            SessionInput {
                id: s.id,
                features,
                confounders: s.confounders,
                topic: s
                    .topic_genre
                    .map(|g| TopicContext::new(&g, s.topic_confidence.unwrap_or(1.0))),
            }
        })
        .collect();

    Ok(PatientRecord {
        patient_id: raw.patient_id.unwrap_or_else(|| "unknown".to_string()),
        age: raw.age,
        calibration_sessions: raw.calibration_sessions,
        sessions,
    })
}

pub fn read_patient(path: &Path) -> Result<PatientRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input {}", path.display()))?;
    parse_patient(&content, &path.display().to_string())
}
