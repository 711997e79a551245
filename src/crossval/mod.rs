//! Cross-validated scoring of a calibration set. No session is ever
//! scored against a baseline that contains it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Domain};
use crate::config::EngineConfig;
use crate::math::stats::{mean, pearson, population_std, round_to, spearman_brown};
use crate::scores::baseline::{Baseline, compute_baseline};
use crate::scores::sentinel::SentinelAlert;
use crate::scores::session::{SessionContext, SessionInput, analyze_session};
use crate::scores::{AlertLevel, DomainScores, FeatureVector};

#[cfg(feature = "mt")]
use rayon::prelude::*;

const MIN_PAIRS: usize = 3;
const OUTLIER_SD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvMethod {
    LooCv,
    SplitHalf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldStatus {
    Analyzed,
    InsufficientBaseline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    pub session_index: usize,
    pub session_id: String,
    pub status: FoldStatus,
    pub baseline_sessions: usize,
    pub composite: Option<f64>,
    pub alert_level: Option<AlertLevel>,
    pub domain_scores: Option<DomainScores>,
    pub sentinel_alerts: Vec<SentinelAlert>,
    pub topic_genre: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSession {
    pub session_index: usize,
    pub session_id: String,
    pub composite: f64,
    pub deviation: f64,
    pub topic_genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvAggregate {
    pub mean_composite: Option<f64>,
    pub std_composite: Option<f64>,
    pub alert_level: AlertLevel,
    pub domain_means: BTreeMap<Domain, f64>,
    pub outlier_sessions: Vec<OutlierSession>,
    pub consistency: Option<f64>,
    pub sessions_analyzed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityStatus {
    Ok,
    InsufficientPairs,
    /// r = -1, so the Spearman-Brown denominator vanished.
    Degenerate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reliability {
    pub status: ReliabilityStatus,
    pub raw_correlation: Option<f64>,
    pub spearman_brown: Option<f64>,
    pub pairs_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LooResult {
    pub method: CvMethod,
    pub total_sessions: usize,
    pub analyzed: usize,
    pub results: Vec<FoldResult>,
    pub aggregate: Option<CvAggregate>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitHalfResult {
    pub method: CvMethod,
    pub total_sessions: usize,
    pub odd_count: usize,
    pub even_count: usize,
    pub even_on_odd: Vec<FoldResult>,
    pub odd_on_even: Vec<FoldResult>,
    pub aggregate: Option<CvAggregate>,
    pub reliability: Option<Reliability>,
    pub error: Option<String>,
}

/// Index-ordered map; parallel under the `mt` feature.
fn map_indexed<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "mt")]
    {
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "mt"))]
    {
        (0..n).map(f).collect()
    }
}

fn session_id(session: &SessionInput, index: usize) -> String {
    session
        .id
        .clone()
        .unwrap_or_else(|| format!("session_{}", index))
}

fn fold_baseline(catalog: &Catalog, vectors: &[FeatureVector], min: usize, cfg: &EngineConfig) -> Baseline {
    let fold_cfg = cfg.with_min_baseline(min.min(vectors.len()));
    compute_baseline(catalog, vectors, &fold_cfg)
}

fn score_fold(
    catalog: &Catalog,
    session: &SessionInput,
    index: usize,
    baseline: &Baseline,
    age: Option<f64>,
    label: Option<&str>,
    cfg: &EngineConfig,
) -> FoldResult {
    let mut out = FoldResult {
        session_index: index,
        session_id: session_id(session, index),
        status: FoldStatus::InsufficientBaseline,
        baseline_sessions: baseline.sessions,
        composite: None,
        alert_level: None,
        domain_scores: None,
        sentinel_alerts: Vec::new(),
        topic_genre: session.topic.as_ref().map(|t| t.genre.clone()),
        label: label.map(str::to_string),
    };
    if !baseline.complete {
        return out;
    }
    let ctx = SessionContext {
        confounders: Some(&session.confounders),
        topic: session.topic.as_ref(),
        age,
        history: &[],
    };
    let analysis = analyze_session(catalog, &session.features, baseline, &ctx, cfg);
    out.status = FoldStatus::Analyzed;
    out.composite = Some(analysis.composite);
    out.alert_level = Some(analysis.alert_level);
    out.domain_scores = Some(analysis.domain_scores);
    out.sentinel_alerts = analysis.sentinel_alerts;
    out
}

/// Leave-one-out: fold i is scored against the baseline of every other
/// session.
pub fn leave_one_out(
    catalog: &Catalog,
    sessions: &[SessionInput],
    age: Option<f64>,
    cfg: &EngineConfig,
) -> LooResult {
    let min = cfg.cv_min_baseline;
    if sessions.len() < min {
        return LooResult {
            method: CvMethod::LooCv,
            total_sessions: sessions.len(),
            analyzed: 0,
            results: Vec::new(),
            aggregate: None,
            error: Some(format!(
                "Insufficient sessions ({} < {} minimum)",
                sessions.len(),
                min
            )),
        };
    }

    let results = map_indexed(sessions.len(), |i| {
        let training: Vec<FeatureVector> = sessions
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, s)| s.features.clone())
            .collect();
        let baseline = fold_baseline(catalog, &training, min, cfg);
        score_fold(catalog, &sessions[i], i, &baseline, age, None, cfg)
    });

    LooResult {
        method: CvMethod::LooCv,
        total_sessions: sessions.len(),
        analyzed: results
            .iter()
            .filter(|r| r.status == FoldStatus::Analyzed)
            .count(),
        aggregate: Some(aggregate_results(&results)),
        results,
        error: None,
    }
}

/// Split by index parity: even sessions are scored on the odd baseline
/// and odd sessions on the even baseline.
pub fn split_half(
    catalog: &Catalog,
    sessions: &[SessionInput],
    age: Option<f64>,
    cfg: &EngineConfig,
) -> SplitHalfResult {
    let min = cfg.cv_min_baseline;
    let (even_idx, odd_idx): (Vec<usize>, Vec<usize>) =
        (0..sessions.len()).partition(|i| i % 2 == 0);

    if sessions.len() < min * 2 {
        return SplitHalfResult {
            method: CvMethod::SplitHalf,
            total_sessions: sessions.len(),
            odd_count: odd_idx.len(),
            even_count: even_idx.len(),
            even_on_odd: Vec::new(),
            odd_on_even: Vec::new(),
            aggregate: None,
            reliability: None,
            error: Some(format!(
                "Insufficient sessions for split-half ({} < {})",
                sessions.len(),
                min * 2
            )),
        };
    }

    let vectors = |idx: &[usize]| -> Vec<FeatureVector> {
        idx.iter().map(|i| sessions[*i].features.clone()).collect()
    };
    let odd_baseline = fold_baseline(catalog, &vectors(&odd_idx), min, cfg);
    let even_baseline = fold_baseline(catalog, &vectors(&even_idx), min, cfg);

    let score_half = |idx: &[usize], baseline: &Baseline, label: &str| -> Vec<FoldResult> {
        map_indexed(idx.len(), |k| {
            let i = idx[k];
            score_fold(catalog, &sessions[i], i, baseline, age, Some(label), cfg)
        })
    };
    let even_on_odd = score_half(&even_idx, &odd_baseline, "even_on_odd_baseline");
    let odd_on_even = score_half(&odd_idx, &even_baseline, "odd_on_even_baseline");

    let all: Vec<FoldResult> = even_on_odd.iter().chain(odd_on_even.iter()).cloned().collect();
    SplitHalfResult {
        method: CvMethod::SplitHalf,
        total_sessions: sessions.len(),
        odd_count: odd_idx.len(),
        even_count: even_idx.len(),
        aggregate: Some(aggregate_results(&all)),
        reliability: Some(split_half_reliability(&even_on_odd, &odd_on_even)),
        even_on_odd,
        odd_on_even,
        error: None,
    }
}

fn analyzed_composites(results: &[FoldResult]) -> Vec<f64> {
    results
        .iter()
        .filter(|r| r.status == FoldStatus::Analyzed)
        .filter_map(|r| r.composite)
        .collect()
}

/// Spearman-Brown corrected correlation between the two halves' composites,
/// paired in session order.
pub fn split_half_reliability(first: &[FoldResult], second: &[FoldResult]) -> Reliability {
    let x = analyzed_composites(first);
    let y = analyzed_composites(second);
    let pairs = x.len().min(y.len());
    if pairs < MIN_PAIRS {
        return Reliability {
            status: ReliabilityStatus::InsufficientPairs,
            raw_correlation: None,
            spearman_brown: None,
            pairs_used: pairs,
        };
    }
    let r = pearson(&x[..pairs], &y[..pairs]);
    let status = if 1.0 + r == 0.0 {
        ReliabilityStatus::Degenerate
    } else {
        ReliabilityStatus::Ok
    };
    Reliability {
        status,
        raw_correlation: Some(round_to(r, 3)),
        spearman_brown: Some(round_to(spearman_brown(r), 3)),
        pairs_used: pairs,
    }
}

pub fn aggregate_results(results: &[FoldResult]) -> CvAggregate {
    let analyzed: Vec<(&FoldResult, f64)> = results
        .iter()
        .filter(|r| r.status == FoldStatus::Analyzed)
        .filter_map(|r| r.composite.map(|c| (r, c)))
        .collect();
    if analyzed.is_empty() {
        return CvAggregate {
            mean_composite: None,
            std_composite: None,
            alert_level: AlertLevel::Unknown,
            domain_means: BTreeMap::new(),
            outlier_sessions: Vec::new(),
            consistency: None,
            sessions_analyzed: 0,
        };
    }

    let composites: Vec<f64> = analyzed.iter().map(|(_, c)| *c).collect();
    let m = mean(&composites);
    let std = population_std(&composites);

    let mut domain_means = BTreeMap::new();
    for domain in Domain::ALL {
        let vals: Vec<f64> = analyzed
            .iter()
            .filter_map(|(r, _)| r.domain_scores.as_ref().and_then(|d| d.get(domain)))
            .collect();
        if !vals.is_empty() {
            domain_means.insert(domain, round_to(mean(&vals), 3));
        }
    }

    let outlier_sessions = analyzed
        .iter()
        .filter(|(_, c)| std > 0.0 && (c - m).abs() > OUTLIER_SD * std)
        .map(|(r, c)| OutlierSession {
            session_index: r.session_index,
            session_id: r.session_id.clone(),
            composite: *c,
            deviation: round_to(c - m, 3),
            topic_genre: r.topic_genre.clone(),
        })
        .collect();

    let consistency = if m != 0.0 {
        (1.0 - std / m.abs()).clamp(0.0, 1.0)
    } else {
        0.0
    };

    CvAggregate {
        mean_composite: Some(round_to(m, 3)),
        std_composite: Some(round_to(std, 3)),
        alert_level: AlertLevel::from_composite(m),
        domain_means,
        outlier_sessions,
        consistency: Some(round_to(consistency, 3)),
        sessions_analyzed: analyzed.len(),
    }
}
