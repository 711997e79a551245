use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Domain};
use crate::config::EngineConfig;
use crate::math::stats::{mean, round_to};
use crate::scores::baseline::Baseline;
use crate::scores::cascade::{CascadeReport, detect_cascade};
use crate::scores::confounder::{ConfounderFlags, apply_confounders};
use crate::scores::decline::{DeclineProfile, compute_decline_profile};
use crate::scores::domain::{compute_composite, compute_domain_scores};
use crate::scores::sentinel::{SentinelAlert, check_sentinels};
use crate::scores::zscore::{TopicContext, ZScoreOptions, compute_z_scores};
use crate::scores::{AlertLevel, DomainScores, FeatureVector, HistoryRecord, ZScores};

/// One recorded session as handed to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionInput {
    pub id: Option<String>,
    pub features: FeatureVector,
    pub confounders: ConfounderFlags,
    pub topic: Option<TopicContext>,
}

impl SessionInput {
    pub fn new(features: FeatureVector) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }
}

/// Per-call context for a single-session analysis.
#[derive(Debug, Clone, Default)]
pub struct SessionContext<'a> {
    pub confounders: Option<&'a ConfounderFlags>,
    pub topic: Option<&'a TopicContext>,
    pub age: Option<f64>,
    pub history: &'a [HistoryRecord],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub version: String,
    pub composite: f64,
    pub alert_level: AlertLevel,
    pub domain_scores: DomainScores,
    pub raw_domain_scores: DomainScores,
    pub z_scores: ZScores,
    pub cascade: CascadeReport,
    pub sentinel_alerts: Vec<SentinelAlert>,
    pub confounder_weight: f64,
    pub confounder_domain_adjustments: BTreeMap<Domain, f64>,
    pub indicator_count: usize,
    pub audio_available: bool,
    pub acoustic_scores: Option<ZScores>,
    pub pd_motor_scores: Option<ZScores>,
    pub decline_profile: Option<DeclineProfile>,
    pub topic_genre: Option<String>,
    pub topic_adjusted: bool,
    pub topic_adjustments: BTreeMap<String, f64>,
    pub indicator_confidence: BTreeMap<String, f64>,
    pub patient_age: Option<f64>,
}

impl SessionAnalysis {
    pub fn history_record(&self) -> HistoryRecord {
        HistoryRecord::new(self.composite, self.domain_scores.clone())
    }
}

/// Full single-session pipeline: z-scores, domains, confounders,
/// composite, alert, cascade, sentinels and (with two or more history
/// records) the decline profile.
pub fn analyze_session(
    catalog: &Catalog,
    vector: &FeatureVector,
    baseline: &Baseline,
    ctx: &SessionContext<'_>,
    cfg: &EngineConfig,
) -> SessionAnalysis {
    let audio_available = vector.has_audio(catalog);
    let zres = compute_z_scores(
        catalog,
        vector,
        baseline,
        &ZScoreOptions {
            age: ctx.age,
            topic: ctx.topic,
        },
    );
    let indicator_confidence = vector.confidence_map();
    let raw_domain_scores = compute_domain_scores(catalog, &zres.z, &indicator_confidence);
    let empty_flags = ConfounderFlags::new();
    let adjusted = apply_confounders(&raw_domain_scores, ctx.confounders.unwrap_or(&empty_flags));
    let composite = compute_composite(&adjusted.domain_scores);
    let cascade = detect_cascade(&adjusted.domain_scores);
    let sentinel_alerts = check_sentinels(catalog, &zres.z);
    let decline_profile = if ctx.history.len() >= 2 {
        Some(compute_decline_profile(ctx.history, ctx.age, cfg))
    } else {
        None
    };

    let (acoustic_scores, pd_motor_scores) = if audio_available {
        (
            Some(domain_z(catalog, &zres.z, Domain::Acoustic)),
            Some(domain_z(catalog, &zres.z, Domain::PdMotor)),
        )
    } else {
        (None, None)
    };

    SessionAnalysis {
        version: "v5".to_string(),
        composite,
        alert_level: AlertLevel::from_composite(composite),
        domain_scores: adjusted.domain_scores,
        raw_domain_scores,
        indicator_count: zres.z.len(),
        z_scores: zres.z,
        cascade,
        sentinel_alerts,
        confounder_weight: adjusted.global_weight,
        confounder_domain_adjustments: adjusted.domain_adjustments,
        audio_available,
        acoustic_scores,
        pd_motor_scores,
        decline_profile,
        topic_genre: ctx.topic.map(|t| t.genre.clone()),
        topic_adjusted: !zres.topic_adjustments.is_empty(),
        topic_adjustments: zres.topic_adjustments,
        indicator_confidence,
        patient_age: ctx.age,
    }
}

fn domain_z(catalog: &Catalog, z: &ZScores, domain: Domain) -> ZScores {
    catalog
        .domain_members(domain)
        .filter_map(|ind| z.get(&ind.id).map(|v| (ind.id.clone(), *v)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekAnalysis {
    pub version: String,
    pub week_number: usize,
    pub composite: f64,
    pub alert_level: AlertLevel,
    pub domain_scores: DomainScores,
    pub cascade: CascadeReport,
    pub sessions_analyzed: usize,
    /// Last minus first session composite, rounded to 3 decimals.
    pub trend: f64,
    pub session_composites: Vec<f64>,
    pub audio_available: bool,
    pub acoustic_scores: Option<ZScores>,
    pub pd_motor_scores: Option<ZScores>,
    pub topic_genres: Vec<String>,
    pub topic_adjusted_sessions: usize,
}

/// Aggregate a week of sessions. Each session is analyzed without
/// history; the week composite is recomputed from the mean domain scores.
pub fn analyze_week(
    catalog: &Catalog,
    sessions: &[SessionInput],
    baseline: &Baseline,
    week_number: usize,
    age: Option<f64>,
    cfg: &EngineConfig,
) -> Option<WeekAnalysis> {
    if sessions.is_empty() {
        return None;
    }
    let results: Vec<SessionAnalysis> = sessions
        .iter()
        .map(|s| {
            let ctx = SessionContext {
                confounders: Some(&s.confounders),
                topic: s.topic.as_ref(),
                age,
                history: &[],
            };
            analyze_session(catalog, &s.features, baseline, &ctx, cfg)
        })
        .collect();
    let audio_available = results.iter().any(|r| r.audio_available);

    let mut domain_scores = DomainScores::empty();
    for domain in Domain::ALL {
        let vals: Vec<f64> = results.iter().filter_map(|r| r.domain_scores.get(domain)).collect();
        let confs: Vec<f64> = results
            .iter()
            .filter(|r| r.domain_scores.get(domain).is_some())
            .map(|r| r.domain_scores.confidence(domain))
            .collect();
        if !vals.is_empty() {
            domain_scores.set(domain, Some(mean(&vals)), mean(&confs));
        }
    }

    let composite = compute_composite(&domain_scores);
    let composites: Vec<f64> = results.iter().map(|r| r.composite).collect();
    let trend = match (composites.first(), composites.last()) {
        (Some(first), Some(last)) if composites.len() >= 2 => last - first,
        _ => 0.0,
    };

    let (acoustic_scores, pd_motor_scores) = if audio_available {
        (
            Some(mean_scores(results.iter().filter_map(|r| r.acoustic_scores.as_ref()))),
            Some(mean_scores(results.iter().filter_map(|r| r.pd_motor_scores.as_ref()))),
        )
    } else {
        (None, None)
    };

    Some(WeekAnalysis {
        version: "v5".to_string(),
        week_number,
        composite,
        alert_level: AlertLevel::from_composite(composite),
        cascade: detect_cascade(&domain_scores),
        domain_scores,
        sessions_analyzed: sessions.len(),
        trend: round_to(trend, 3),
        session_composites: composites.iter().map(|c| round_to(*c, 3)).collect(),
        audio_available,
        acoustic_scores,
        pd_motor_scores,
        topic_genres: results.iter().filter_map(|r| r.topic_genre.clone()).collect(),
        topic_adjusted_sessions: results.iter().filter(|r| r.topic_adjusted).count(),
    })
}

fn mean_scores<'a>(maps: impl Iterator<Item = &'a ZScores>) -> ZScores {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for map in maps {
        for (id, v) in map {
            let entry = sums.entry(id.clone()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(id, (sum, n))| (id, sum / n as f64))
        .collect()
}
