//! Condition-specific progression models. Every model takes the current
//! state and a week offset and returns the projected composite plus
//! per-domain scores, unrounded.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::catalog::{Condition, Domain};
use crate::scores::aging::age_adjusted_rate;

const AD_DEFAULT_VELOCITY: f64 = -0.02;
const AD_STAGE_ACCEL: f64 = 0.1;
const DEP_RECOVERY: f64 = 0.02;
const MED_RECOVERY_WEEKS: f64 = 3.0;
const MED_DOMAIN_SHARE: f64 = 0.8;

pub struct ModelInput<'a> {
    pub composite: f64,
    pub domains: &'a BTreeMap<Domain, f64>,
    pub composite_velocity: f64,
    pub domain_velocities: &'a BTreeMap<Domain, f64>,
    pub cascade_stage: u8,
    pub age: Option<f64>,
}

pub struct Projection {
    pub composite: f64,
    pub domains: BTreeMap<Domain, f64>,
}

pub fn project(model: Option<Condition>, input: &ModelInput<'_>, week: usize) -> Projection {
    let w = week as f64;
    let current = |d: Domain| input.domains.get(&d).copied().unwrap_or(0.0);
    let linear = |base: f64, rate: &dyn Fn(Domain) -> f64| Projection {
        composite: input.composite + base * w,
        domains: Domain::ALL.iter().map(|d| (*d, current(*d) + rate(*d) * w)).collect(),
    };

    match model {
        Some(Condition::Alzheimer) => {
            let stage = input.cascade_stage.min(3);
            let velocity = if input.composite_velocity != 0.0 {
                input.composite_velocity
            } else {
                AD_DEFAULT_VELOCITY
            };
            let weekly = velocity * (1.0 + f64::from(stage) * AD_STAGE_ACCEL);
            Projection {
                composite: input.composite + weekly * w,
                domains: Domain::ALL
                    .iter()
                    .map(|d| {
                        let v = input.domain_velocities.get(d).copied().unwrap_or(0.0);
                        (*d, current(*d) + v * cascade_boost(*d, stage) * w)
                    })
                    .collect(),
            }
        }
        Some(Condition::Depression) => Projection {
            composite: (input.composite + DEP_RECOVERY * w).min(0.0),
            domains: Domain::ALL
                .iter()
                .map(|d| (*d, (current(*d) + DEP_RECOVERY * w).min(0.0)))
                .collect(),
        },
        Some(Condition::Medication) => {
            let composite = if w <= MED_RECOVERY_WEEKS {
                input.composite * (1.0 - w / MED_RECOVERY_WEEKS)
            } else {
                0.0
            };
            Projection {
                composite,
                domains: Domain::ALL
                    .iter()
                    .map(|d| (*d, composite * MED_DOMAIN_SHARE))
                    .collect(),
            }
        }
        Some(Condition::Parkinson) => linear(-0.01, &|d| -0.01 * pd_multiplier(d)),
        Some(Condition::Msa) => linear(-0.015, &|d| msa_rate(d, w)),
        Some(Condition::Psp) => linear(-0.02, &|d| psp_rate(d, w)),
        Some(Condition::Lbd) => linear(-0.012, &|d| lbd_rate(d, w)),
        Some(Condition::Ftd) => linear(-0.015, &ftd_rate),
        _ => linear(0.0, &|d| age_adjusted_rate(d, input.age)),
    }
}

/// Per-domain speed-up of the AD model as the cascade recruits domains.
fn cascade_boost(domain: Domain, stage: u8) -> f64 {
    use Domain::*;
    match (stage, domain) {
        (0, Temporal) => 1.5,
        (1, Lexical | Semantic) => 1.5,
        (1, Temporal) => 1.2,
        (1, Memory) => 1.3,
        (2, Lexical | Semantic | Syntactic | Memory) => 1.5,
        (2, Temporal) => 1.3,
        (2, Discourse) => 1.2,
        (3, Lexical | Semantic | Syntactic | Temporal | Memory | Discourse) => 1.5,
        _ => 1.0,
    }
}

/// Phonation first, articulation next, cognition spared early.
fn pd_multiplier(domain: Domain) -> f64 {
    match domain {
        Domain::Acoustic => 2.0,
        Domain::PdMotor => 1.5,
        Domain::Temporal => 1.2,
        Domain::Lexical | Domain::Executive => 0.5,
        Domain::Syntactic | Domain::Memory => 0.4,
        Domain::Semantic | Domain::Discourse | Domain::Affective | Domain::Pragmatic => 0.3,
    }
}

fn is_motor(domain: Domain) -> bool {
    matches!(domain, Domain::Acoustic | Domain::PdMotor | Domain::Temporal)
}

/// Motor domains accelerate by 5% per week.
fn msa_rate(domain: Domain, week: f64) -> f64 {
    let rate = match domain {
        Domain::Acoustic => -0.025,
        Domain::PdMotor => -0.020,
        Domain::Temporal => -0.018,
        Domain::Lexical => -0.008,
        Domain::Syntactic | Domain::Memory | Domain::Executive => -0.006,
        Domain::Semantic | Domain::Discourse => -0.005,
        Domain::Affective | Domain::Pragmatic => -0.004,
    };
    if is_motor(domain) { rate * (1.0 + week * 0.05) } else { rate }
}

/// Faster than MSA; motor domains accelerate by 5% per week.
fn psp_rate(domain: Domain, week: f64) -> f64 {
    let rate = match domain {
        Domain::Acoustic => -0.030,
        Domain::PdMotor => -0.025,
        Domain::Temporal => -0.020,
        Domain::Lexical | Domain::Memory | Domain::Executive => -0.010,
        Domain::Syntactic | Domain::Semantic | Domain::Discourse => -0.008,
        Domain::Pragmatic => -0.006,
        Domain::Affective => -0.005,
    };
    if is_motor(domain) { rate * (1.0 + week * 0.05) } else { rate }
}

/// Fluctuating cognition: the rate oscillates by 15% over a 4-week cycle.
fn lbd_rate(domain: Domain, week: f64) -> f64 {
    let rate = match domain {
        Domain::Executive => -0.018,
        Domain::Acoustic | Domain::Memory => -0.015,
        Domain::PdMotor | Domain::Temporal | Domain::Semantic => -0.012,
        Domain::Lexical | Domain::Pragmatic => -0.008,
        Domain::Syntactic => -0.006,
        Domain::Discourse | Domain::Affective => -0.005,
    };
    rate * (1.0 + 0.15 * (week * PI / 2.0).sin())
}

fn ftd_rate(domain: Domain) -> f64 {
    match domain {
        Domain::Pragmatic => -0.025,
        Domain::Executive => -0.020,
        Domain::Discourse => -0.015,
        Domain::Semantic => -0.012,
        Domain::Lexical => -0.010,
        Domain::Temporal | Domain::Affective => -0.008,
        Domain::Syntactic => -0.006,
        Domain::Memory => -0.005,
        Domain::Acoustic => -0.003,
        Domain::PdMotor => -0.002,
    }
}
