use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::config::EngineConfig;
use crate::crossval::{LooResult, SplitHalfResult};
use crate::differential::DifferentialResult;
use crate::pd::PdAnalysis;
use crate::scores::aging::AgeBand;
use crate::scores::sentinel::SentinelAlert;
use crate::scores::session::{SessionAnalysis, WeekAnalysis};
use crate::scores::{AlertLevel, DomainScores};
use crate::trajectory::Trajectory;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientMeta {
    pub patient_id: String,
    pub age: Option<f64>,
    pub age_band: Option<AgeBand>,
    pub sessions_total: usize,
    pub calibration_sessions: usize,
    pub monitored_sessions: usize,
    pub catalog_version: String,
    pub indicator_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub complete: bool,
    pub sessions: usize,
    pub target: usize,
    pub sufficient_indicators: usize,
    pub high_variance: Vec<String>,
    pub needs_extension: bool,
    pub audio_available: bool,
    pub audio_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Option<String>,
    pub composite: f64,
    pub alert_level: AlertLevel,
    pub domain_scores: DomainScores,
    pub confounder_weight: f64,
    pub sentinel_alerts: Vec<SentinelAlert>,
    pub topic_genre: Option<String>,
    pub leading_edge: Option<Domain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidation {
    pub leave_one_out: LooResult,
    pub split_half: SplitHalfResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeurovoiceV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub patient: PatientMeta,
    pub config: EngineConfig,
    pub baseline: Option<BaselineSummary>,
    pub sessions: Vec<SessionSummary>,
    pub latest_session: Option<SessionAnalysis>,
    pub weekly: Vec<WeekAnalysis>,
    pub differential: Option<DifferentialResult>,
    pub pd_analysis: Option<PdAnalysis>,
    pub trajectory: Option<Trajectory>,
    pub cross_validation: Option<CrossValidation>,
    pub warnings: Vec<String>,
}

impl NeurovoiceV1 {
    pub fn empty(tool_version: &str) -> Self {
        Self {
            tool: "kira-neurovoice".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            patient: PatientMeta::default(),
            config: EngineConfig::default_v1(),
            baseline: None,
            sessions: Vec::new(),
            latest_session: None,
            weekly: Vec::new(),
            differential: None,
            pd_analysis: None,
            trajectory: None,
            cross_validation: None,
            warnings: Vec::new(),
        }
    }
}
