//! Forward projection of composite and domain scores under the model
//! picked by the differential, alongside a "cognitive twin" that ages
//! without disease.

pub mod models;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Condition, Domain};
use crate::config::EngineConfig;
use crate::math::stats::{index_slope, round_to};
use crate::scores::aging::{AgeBand, age_adjusted_rate};
use crate::scores::cascade::CascadeEntry;
use crate::scores::decline::{DeclineProfile, compute_decline_profile};
use crate::scores::{AlertLevel, HistoryRecord};

use models::{ModelInput, project};

const MIN_RECORDS: usize = 3;
const VELOCITY_WINDOW: usize = 4;
const DEFAULT_BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_DECAY: f64 = 0.03;
const CONFIDENCE_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub composite: f64,
    pub domains: BTreeMap<Domain, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPoint {
    pub week_offset: usize,
    pub composite: f64,
    pub domains: BTreeMap<Domain, f64>,
    pub alert_level: AlertLevel,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinPoint {
    pub week_offset: usize,
    pub composite: f64,
    pub domains: BTreeMap<Domain, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub predictions: Vec<PredictedPoint>,
    pub velocity: Option<Velocity>,
    pub model: Option<Condition>,
    pub confidence: f64,
    pub predicted_alert_12w: AlertLevel,
    pub twin_trajectory: Vec<TwinPoint>,
    pub decline_profile: Option<DeclineProfile>,
    pub age_band: Option<AgeBand>,
    pub note: Option<String>,
}

pub struct TrajectoryOptions<'a> {
    /// Usually the differential's primary hypothesis.
    pub model: Option<Condition>,
    pub base_confidence: Option<f64>,
    pub cascade: &'a [CascadeEntry],
    pub weeks: usize,
    pub age: Option<f64>,
}

impl Default for TrajectoryOptions<'_> {
    fn default() -> Self {
        Self {
            model: None,
            base_confidence: None,
            cascade: &[],
            weeks: 12,
            age: None,
        }
    }
}

pub fn point_confidence(base: f64, week: usize) -> f64 {
    f64::max(CONFIDENCE_FLOOR, base * (1.0 - week as f64 * CONFIDENCE_DECAY))
}

pub fn compute_velocity(history: &[HistoryRecord]) -> Velocity {
    if history.len() < 2 {
        return Velocity::default();
    }
    let recent = &history[history.len().saturating_sub(VELOCITY_WINDOW)..];
    let composites: Vec<f64> = recent.iter().map(|r| finite_or_zero(r.composite)).collect();
    let domains = Domain::ALL
        .iter()
        .map(|d| {
            let ys: Vec<f64> = recent.iter().map(|r| r.domain_scores.or_zero(*d)).collect();
            (*d, index_slope(&ys))
        })
        .collect();
    Velocity {
        composite: round_to(index_slope(&composites), 4),
        domains,
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Healthy-aging projection of the starting domains. The composite is
/// the weighted domain sum.
pub fn twin_trajectory(
    start: &BTreeMap<Domain, f64>,
    weeks: usize,
    age: Option<f64>,
) -> Vec<TwinPoint> {
    (1..=weeks)
        .map(|w| {
            let domains: BTreeMap<Domain, f64> = Domain::ALL
                .iter()
                .map(|d| {
                    let current = start.get(d).copied().unwrap_or(0.0);
                    (*d, round_to(current + age_adjusted_rate(*d, age) * w as f64, 3))
                })
                .collect();
            let composite = domains.iter().map(|(d, v)| v * d.weight()).sum::<f64>();
            TwinPoint {
                week_offset: w,
                composite: round_to(composite, 3),
                domains,
            }
        })
        .collect()
}

pub fn predict_trajectory(
    history: &[HistoryRecord],
    opts: &TrajectoryOptions<'_>,
    cfg: &EngineConfig,
) -> Trajectory {
    let age_band = AgeBand::from_age(opts.age);
    let Some(last) = history.last().filter(|_| history.len() >= MIN_RECORDS) else {
        return Trajectory {
            predictions: Vec::new(),
            velocity: None,
            model: opts.model,
            confidence: 0.0,
            predicted_alert_12w: AlertLevel::Unknown,
            twin_trajectory: Vec::new(),
            decline_profile: None,
            age_band,
            note: Some(format!("need {}+ records", MIN_RECORDS)),
        };
    };

    let start: BTreeMap<Domain, f64> = Domain::ALL
        .iter()
        .map(|d| (*d, last.domain_scores.or_zero(*d)))
        .collect();
    let velocity = compute_velocity(history);
    let base = opts
        .base_confidence
        .filter(|c| c.is_finite() && *c > 0.0)
        .unwrap_or(DEFAULT_BASE_CONFIDENCE);
    let input = ModelInput {
        composite: finite_or_zero(last.composite),
        domains: &start,
        composite_velocity: velocity.composite,
        domain_velocities: &velocity.domains,
        cascade_stage: opts.cascade.iter().map(|c| c.stage).max().unwrap_or(0),
        age: opts.age,
    };

    let predictions: Vec<PredictedPoint> = (1..=opts.weeks)
        .map(|w| {
            let p = project(opts.model, &input, w);
            let composite = round_to(p.composite, 3);
            PredictedPoint {
                week_offset: w,
                composite,
                domains: p.domains.into_iter().map(|(d, v)| (d, round_to(v, 3))).collect(),
                alert_level: AlertLevel::from_composite(composite),
                confidence: round_to(point_confidence(base, w), 2),
            }
        })
        .collect();

    Trajectory {
        predicted_alert_12w: predictions
            .last()
            .map_or(AlertLevel::Unknown, |p| p.alert_level),
        confidence: round_to(point_confidence(base, opts.weeks), 2),
        twin_trajectory: twin_trajectory(&start, opts.weeks, opts.age),
        decline_profile: Some(compute_decline_profile(history, opts.age, cfg)),
        predictions,
        velocity: Some(velocity),
        model: opts.model,
        age_band,
        note: None,
    }
}
