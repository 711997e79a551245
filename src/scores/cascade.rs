use serde::{Deserialize, Serialize};

use crate::catalog::{Condition, Domain};
use crate::scores::DomainScores;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeEntry {
    pub family: Condition,
    pub stage: u8,
    pub name: String,
    pub severity: f64,
    pub confidence: f64,
}

impl CascadeEntry {
    fn new(family: Condition, stage: u8, name: &str, severity: f64, confidence: f64) -> Self {
        Self {
            family,
            stage,
            name: name.to_string(),
            severity,
            confidence: finite_min1(confidence),
        }
    }
}

fn finite_min1(value: f64) -> f64 {
    if value.is_finite() { value.min(1.0) } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CascadeReport {
    pub alzheimer: Vec<CascadeEntry>,
    pub parkinson: Vec<CascadeEntry>,
    pub depression: Vec<CascadeEntry>,
    pub lbd: Vec<CascadeEntry>,
    pub ftd: Vec<CascadeEntry>,
    /// Every entry, most severe first.
    pub all: Vec<CascadeEntry>,
}

impl CascadeReport {
    pub fn max_stage(&self, family: Condition) -> Option<u8> {
        self.all
            .iter()
            .filter(|e| e.family == family)
            .map(|e| e.stage)
            .max()
    }
}

pub fn detect_cascade(scores: &DomainScores) -> CascadeReport {
    let alzheimer = alzheimer_cascade(scores);
    let parkinson = parkinson_cascade(scores);
    let depression = depression_cascade(scores);
    let lbd = lbd_cascade(scores);
    let ftd = ftd_cascade(scores);

    let mut all: Vec<CascadeEntry> = alzheimer
        .iter()
        .chain(&parkinson)
        .chain(&depression)
        .chain(&lbd)
        .chain(&ftd)
        .cloned()
        .collect();
    all.sort_by(|a, b| b.severity.total_cmp(&a.severity));

    CascadeReport {
        alzheimer,
        parkinson,
        depression,
        lbd,
        ftd,
        all,
    }
}

fn by_stage(mut entries: Vec<CascadeEntry>) -> Vec<CascadeEntry> {
    entries.sort_by_key(|e| e.stage);
    entries
}

fn alzheimer_cascade(s: &DomainScores) -> Vec<CascadeEntry> {
    let lex = s.or_zero(Domain::Lexical);
    let syn = s.or_zero(Domain::Syntactic);
    let sem = s.or_zero(Domain::Semantic);
    let tmp = s.or_zero(Domain::Temporal);
    let mem = s.or_zero(Domain::Memory);
    let mut out: Vec<CascadeEntry> = Vec::new();
    let fam = Condition::Alzheimer;

    if tmp < -0.3 && lex > -0.2 && sem > -0.2 {
        out.push(CascadeEntry::new(
            fam,
            0,
            "pre_symptomatic_fluency",
            tmp.abs(),
            tmp.abs() / 0.5,
        ));
    }
    if (lex < -0.5 || sem < -0.5) && lex < -0.3 && sem < -0.3 {
        let severity = (lex.abs() + sem.abs()) / 2.0;
        out.push(CascadeEntry::new(
            fam,
            1,
            "semantic_memory_involvement",
            severity,
            (lex.abs() + sem.abs()) / 2.0,
        ));
    }
    if syn < -0.5 && out.iter().any(|e| e.stage == 1) {
        out.push(CascadeEntry::new(fam, 2, "syntactic_simplification", syn.abs(), syn.abs()));
    }
    if sem < -1.0 && tmp < -0.5 {
        out.push(CascadeEntry::new(
            fam,
            3,
            "discourse_collapse",
            (sem.abs() + tmp.abs()) / 2.0,
            (sem.abs() + tmp.abs()) / 3.0,
        ));
    }
    if mem < -0.5 && out.iter().any(|e| e.stage >= 1) {
        let stage = out.last().map_or(1, |e| e.stage);
        out.push(CascadeEntry::new(fam, stage, "memory_cascade", mem.abs(), mem.abs()));
    }
    by_stage(out)
}

fn parkinson_cascade(s: &DomainScores) -> Vec<CascadeEntry> {
    let acu = s.get(Domain::Acoustic);
    let pdm = s.get(Domain::PdMotor);
    if acu.is_none() && pdm.is_none() {
        return Vec::new();
    }
    let acu = acu.unwrap_or(0.0);
    let pdm = pdm.unwrap_or(0.0);
    let tmp = s.or_zero(Domain::Temporal);
    let fam = Condition::Parkinson;
    let mut out: Vec<CascadeEntry> = Vec::new();

    if acu < -0.3 && pdm > -0.2 {
        out.push(CascadeEntry::new(fam, 0, "monopitch_only", acu.abs(), acu.abs() / 0.5));
    }
    if acu < -0.5 && (pdm < -0.2 || acu < -0.7) {
        out.push(CascadeEntry::new(fam, 1, "phonatory_degradation", acu.abs(), acu.abs()));
    }
    if pdm < -0.5 && out.iter().any(|e| e.stage >= 1) {
        out.push(CascadeEntry::new(fam, 2, "articulatory_breakdown", pdm.abs(), pdm.abs()));
    }
    if pdm < -1.0 && tmp < -0.5 {
        out.push(CascadeEntry::new(
            fam,
            3,
            "prosodic_fluency_collapse",
            (pdm.abs() + tmp.abs()) / 2.0,
            (pdm.abs() + tmp.abs()) / 3.0,
        ));
    }
    by_stage(out)
}

fn depression_cascade(s: &DomainScores) -> Vec<CascadeEntry> {
    let aff = s.or_zero(Domain::Affective);
    let tmp = s.or_zero(Domain::Temporal);
    let lex = s.or_zero(Domain::Lexical);
    let dis = s.or_zero(Domain::Discourse);
    let acu = s.get(Domain::Acoustic);
    let fam = Condition::Depression;
    let mut out: Vec<CascadeEntry> = Vec::new();

    if aff < -0.3 {
        out.push(CascadeEntry::new(fam, 0, "affective_shift", aff.abs(), aff.abs() / 0.5));
    }
    if tmp < -0.4 && out.iter().any(|e| e.stage == 0) {
        let sev = (aff.abs() + tmp.abs()) / 2.0;
        out.push(CascadeEntry::new(fam, 1, "temporal_retardation", sev, sev));
    }
    let engagement_drop = lex < -0.5 || dis < -0.4 || acu.is_some_and(|a| a < -0.5);
    if engagement_drop && out.iter().any(|e| e.stage >= 1) {
        let combined = match acu {
            Some(a) => (lex.abs() + dis.abs() + a.abs()) / 3.0,
            None => (lex.abs() + dis.abs()) / 2.0,
        };
        out.push(CascadeEntry::new(fam, 2, "engagement_withdrawal", combined, combined));
    }
    by_stage(out)
}

fn lbd_cascade(s: &DomainScores) -> Vec<CascadeEntry> {
    let acu = s.get(Domain::Acoustic);
    let pdm = s.get(Domain::PdMotor);
    let sem = s.or_zero(Domain::Semantic);
    let mem = s.or_zero(Domain::Memory);
    let exe = s.or_zero(Domain::Executive);
    let fam = Condition::Lbd;
    let mut out = Vec::new();

    if exe < -0.3 && sem > -0.2 {
        out.push(CascadeEntry::new(fam, 0, "fluctuating_attention", exe.abs(), exe.abs() / 0.5));
    }
    let motor = acu.is_some_and(|a| a < -0.3) || pdm.is_some_and(|p| p < -0.3);
    if motor && (sem < -0.3 || mem < -0.3) {
        out.push(CascadeEntry::new(
            fam,
            1,
            "motor_cognitive_concurrent",
            (sem.abs() + mem.abs()) / 2.0,
            0.6,
        ));
    }
    by_stage(out)
}

fn ftd_cascade(s: &DomainScores) -> Vec<CascadeEntry> {
    let pra = s.get(Domain::Pragmatic);
    let exe = s.get(Domain::Executive);
    let sem = s.or_zero(Domain::Semantic);
    let mem = s.or_zero(Domain::Memory);
    let lex = s.or_zero(Domain::Lexical);
    let syn = s.or_zero(Domain::Syntactic);
    let fam = Condition::Ftd;
    let mut out = Vec::new();

    if let Some(pra) = pra.filter(|p| *p < -0.5 && mem > -0.3) {
        out.push(CascadeEntry::new(fam, 0, "pragmatic_collapse", pra.abs(), pra.abs()));
    }
    if lex < -0.7 && sem < -0.7 && syn > -0.3 {
        let sev = (lex.abs() + sem.abs()) / 2.0;
        out.push(CascadeEntry::new(fam, 1, "semantic_collapse", sev, sev));
    }
    if let Some(exe) = exe.filter(|e| *e < -0.5) {
        out.push(CascadeEntry::new(fam, 0, "executive_dysfunction", exe.abs(), exe.abs()));
    }
    by_stage(out)
}
