use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::crossval::{LooResult, SplitHalfResult};
use crate::differential::DifferentialResult;
use crate::input::PatientRecord;
use crate::pd::PdAnalysis;
use crate::schema::v1::NeurovoiceV1;
use crate::scores::HistoryRecord;
use crate::scores::baseline::Baseline;
use crate::scores::session::{SessionAnalysis, WeekAnalysis};
use crate::trajectory::Trajectory;

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
}

/// Command-line settings that override the patient file and the config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub age: Option<f64>,
    pub calibration: Option<usize>,
    pub weeks: Option<usize>,
}

#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub write_json: bool,
    pub crossval: bool,
    pub threads: usize,
    pub config_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub topics_path: Option<PathBuf>,
    pub overrides: Overrides,
    pub config: EngineConfig,
    pub catalog: Option<Catalog>,
    pub patient: Option<PatientRecord>,
    pub age: Option<f64>,
    pub calibration_count: usize,
    pub baseline: Option<Baseline>,
    pub sessions: Vec<SessionAnalysis>,
    pub weeks: Vec<WeekAnalysis>,
    pub differential: Option<DifferentialResult>,
    pub pd_analysis: Option<PdAnalysis>,
    pub trajectory: Option<Trajectory>,
    pub loo: Option<LooResult>,
    pub split_half: Option<SplitHalfResult>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
    pub report: NeurovoiceV1,
}

impl Ctx {
    pub fn new(input: PathBuf, out_dir: PathBuf, write_json: bool, tool_version: &str) -> Self {
        let json_path = out_dir.join("neurovoice.json");
        Self {
            input,
            write_json,
            crossval: false,
            threads: 0,
            config_path: None,
            catalog_path: None,
            topics_path: None,
            overrides: Overrides::default(),
            config: EngineConfig::default_v1(),
            catalog: None,
            patient: None,
            age: None,
            calibration_count: 0,
            baseline: None,
            sessions: Vec::new(),
            weeks: Vec::new(),
            differential: None,
            pd_analysis: None,
            trajectory: None,
            loo: None,
            split_half: None,
            warnings: Vec::new(),
            output: OutputPaths { out_dir, json_path },
            report: NeurovoiceV1::empty(tool_version),
        }
    }

    /// Outcomes of the monitored sessions analyzed so far, oldest first.
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.sessions.iter().map(|s| s.history_record()).collect()
    }

    pub fn latest(&self) -> Option<&SessionAnalysis> {
        self.sessions.last()
    }
}
