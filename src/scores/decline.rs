use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::config::EngineConfig;
use crate::math::stats::{linear_slope, mean, round_to};
use crate::scores::HistoryRecord;
use crate::scores::aging::{AgeBand, excess_decline};

const WINDOW: usize = 28;
const WEEK: usize = 7;
const DECLINING: f64 = -0.05;
const NEXT_DOMAIN_CEILING: f64 = -0.1;
const ACCEL_HALF_MIN_BINS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    Stable,
    AdLike,
    PdLike,
    DepLike,
    LbdLike,
    FtdLike,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclineProfile {
    pub leading_edge: Option<Domain>,
    pub domain_velocities: BTreeMap<Domain, f64>,
    pub predicted_next: Option<Domain>,
    pub profile_type: ProfileType,
    /// Second-half minus first-half velocity; absent below four weekly bins.
    pub acceleration: Option<BTreeMap<Domain, f64>>,
    pub excess_decline: Option<BTreeMap<Domain, f64>>,
    pub age_consistent: bool,
    pub age_band: Option<AgeBand>,
}

impl DeclineProfile {
    pub fn empty(age: Option<f64>) -> Self {
        Self {
            leading_edge: None,
            domain_velocities: BTreeMap::new(),
            predicted_next: None,
            profile_type: ProfileType::Stable,
            acceleration: None,
            excess_decline: None,
            age_consistent: false,
            age_band: AgeBand::from_age(age),
        }
    }
}

const CASCADE_SEQUENCES: [&[Domain]; 5] = [
    &[
        Domain::Temporal,
        Domain::Lexical,
        Domain::Semantic,
        Domain::Syntactic,
        Domain::Discourse,
    ],
    &[Domain::Acoustic, Domain::PdMotor, Domain::Temporal, Domain::Lexical],
    &[Domain::Affective, Domain::Temporal, Domain::Lexical, Domain::Discourse],
    &[
        Domain::Executive,
        Domain::Acoustic,
        Domain::PdMotor,
        Domain::Semantic,
        Domain::Memory,
    ],
    &[Domain::Pragmatic, Domain::Executive, Domain::Lexical, Domain::Semantic],
];

const AD_SET: &[Domain] = &[Domain::Lexical, Domain::Semantic, Domain::Syntactic, Domain::Memory];
const PD_SET: &[Domain] = &[Domain::Acoustic, Domain::PdMotor];
const DEP_SET: &[Domain] = &[Domain::Affective];
const LBD_SET: &[Domain] = &[Domain::Executive, Domain::PdMotor, Domain::Memory];
const FTD_SET: &[Domain] = &[Domain::Pragmatic, Domain::Executive, Domain::Lexical];

pub fn compute_decline_profile(
    history: &[HistoryRecord],
    age: Option<f64>,
    cfg: &EngineConfig,
) -> DeclineProfile {
    if history.len() < 2 {
        return DeclineProfile::empty(age);
    }
    let recent = &history[history.len().saturating_sub(WINDOW)..];
    let bins: Vec<&[HistoryRecord]> = recent.chunks(WEEK).collect();
    if bins.len() < 2 {
        return DeclineProfile::empty(age);
    }

    let velocities = bin_velocities(&bins);
    let leading_edge = leading_edge(&velocities);
    let predicted_next = leading_edge.and_then(|edge| predict_next(edge, &velocities));
    let profile_type = classify_profile(&velocities, leading_edge);

    let half = bins.len() / 2;
    let acceleration = if half >= ACCEL_HALF_MIN_BINS && bins.len() - half >= ACCEL_HALF_MIN_BINS {
        let first = bin_velocities(&bins[..half]);
        let second = bin_velocities(&bins[half..]);
        Some(
            Domain::ALL
                .iter()
                .map(|d| {
                    let a = second.get(d).copied().unwrap_or(0.0) - first.get(d).copied().unwrap_or(0.0);
                    (*d, round_to(a, 3))
                })
                .collect(),
        )
    } else {
        None
    };

    let excess = excess_decline(&velocities, age);
    let age_consistent = is_age_consistent(&velocities, &excess, cfg);

    DeclineProfile {
        leading_edge,
        domain_velocities: velocities,
        predicted_next,
        profile_type,
        acceleration,
        excess_decline: Some(excess),
        age_consistent,
        age_band: AgeBand::from_age(age),
    }
}

/// Per-domain slope over the weekly means, rounded to 3 decimals. Domains
/// with fewer than two populated bins get 0.
fn bin_velocities(bins: &[&[HistoryRecord]]) -> BTreeMap<Domain, f64> {
    let mut out = BTreeMap::new();
    for domain in Domain::ALL {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (i, bin) in bins.iter().enumerate() {
            let vals: Vec<f64> = bin.iter().filter_map(|r| r.domain_scores.get(domain)).collect();
            if !vals.is_empty() {
                xs.push(i as f64);
                ys.push(mean(&vals));
            }
        }
        let v = if xs.len() < 2 {
            0.0
        } else {
            round_to(linear_slope(&xs, &ys), 3)
        };
        out.insert(domain, v);
    }
    out
}

fn leading_edge(velocities: &BTreeMap<Domain, f64>) -> Option<Domain> {
    let mut ranked: Vec<(Domain, f64)> = Domain::ALL
        .iter()
        .filter_map(|d| velocities.get(d).map(|v| (*d, *v)))
        .filter(|(_, v)| *v != 0.0)
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.first().map(|(d, _)| *d)
}

fn predict_next(edge: Domain, velocities: &BTreeMap<Domain, f64>) -> Option<Domain> {
    for seq in CASCADE_SEQUENCES {
        if let Some(idx) = seq.iter().position(|d| *d == edge) {
            let next = seq[idx + 1..]
                .iter()
                .find(|d| velocities.get(*d).copied().unwrap_or(0.0) > NEXT_DOMAIN_CEILING);
            if let Some(next) = next {
                return Some(*next);
            }
        }
    }
    None
}

fn classify_profile(velocities: &BTreeMap<Domain, f64>, edge: Option<Domain>) -> ProfileType {
    let count = |set: &[Domain]| {
        set.iter()
            .filter(|d| velocities.get(*d).copied().unwrap_or(0.0) < DECLINING)
            .count()
    };
    let ad = count(AD_SET);
    let pd = count(PD_SET);
    let dep = count(DEP_SET);
    let lbd = count(LBD_SET);
    let ftd = count(FTD_SET);

    if lbd >= 2 && pd >= 1 {
        ProfileType::LbdLike
    } else if ftd >= 2 && ad <= 1 {
        ProfileType::FtdLike
    } else if pd >= 1 && ad <= 1 && dep == 0 {
        ProfileType::PdLike
    } else if ad >= 2 && pd == 0 {
        ProfileType::AdLike
    } else if dep >= 1 && ad <= 1 && pd == 0 {
        ProfileType::DepLike
    } else if (ad >= 1 && pd >= 1) || (ad >= 1 && dep >= 1) {
        ProfileType::Mixed
    } else if let Some(edge) = edge {
        if AD_SET.contains(&edge) {
            ProfileType::AdLike
        } else if PD_SET.contains(&edge) {
            ProfileType::PdLike
        } else if DEP_SET.contains(&edge) {
            ProfileType::DepLike
        } else if LBD_SET.contains(&edge) {
            ProfileType::LbdLike
        } else if FTD_SET.contains(&edge) {
            ProfileType::FtdLike
        } else {
            ProfileType::Stable
        }
    } else {
        ProfileType::Stable
    }
}

fn is_age_consistent(
    velocities: &BTreeMap<Domain, f64>,
    excess: &BTreeMap<Domain, f64>,
    cfg: &EngineConfig,
) -> bool {
    if velocities.is_empty() {
        return false;
    }
    let max_excess = excess.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_v = velocities.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_v = velocities.values().copied().fold(f64::INFINITY, f64::min);
    max_excess < cfg.age_consistent_excess && (max_v - min_v) < cfg.age_consistent_spread
}
