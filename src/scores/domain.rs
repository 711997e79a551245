use std::collections::BTreeMap;

use crate::catalog::{Catalog, Domain};
use crate::math::stats::safe_div;
use crate::scores::{AlertLevel, DomainScores, ZScores, z_value};

const MAX_REDISTRIBUTION: f64 = 2.0;
const COMPOSITE_SCALE: f64 = 0.2;

/// Weighted mean of member z-scores per domain. Each member weighs
/// `base_weight x confidence`; indicators missing from `confidence`
/// count as fully confident.
pub fn compute_domain_scores(
    catalog: &Catalog,
    z: &ZScores,
    confidence: &BTreeMap<String, f64>,
) -> DomainScores {
    let mut out = DomainScores::empty();
    for domain in Domain::ALL {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let mut conf_sum = 0.0;
        let mut contributors = 0usize;
        for ind in catalog.domain_members(domain) {
            let Some(value) = z_value(z, &ind.id) else {
                continue;
            };
            let conf = confidence.get(&ind.id).copied().unwrap_or(1.0);
            let w = ind.base_weight * conf;
            weighted += value * w;
            total_weight += w;
            conf_sum += conf;
            contributors += 1;
        }
        if contributors == 0 {
            continue;
        }
        let score = if total_weight > 0.0 {
            Some(safe_div(weighted, total_weight, 0.0))
        } else {
            None
        };
        out.set(domain, score, conf_sum / contributors as f64);
    }
    out
}

/// Weighted composite over present domains. Absent domain weight is
/// redistributed (amplification capped at 2x), then the result is scaled
/// by domain count x 0.2.
pub fn compute_composite(scores: &DomainScores) -> f64 {
    let mut present_weight = 0.0;
    let mut absent_weight = 0.0;
    let mut available = Vec::with_capacity(Domain::ALL.len());
    for domain in Domain::ALL {
        match scores.get(domain) {
            Some(score) => {
                present_weight += domain.weight();
                available.push((domain.weight(), score));
            }
            None => absent_weight += domain.weight(),
        }
    }
    if present_weight == 0.0 {
        return 0.0;
    }

    let total = present_weight + absent_weight;
    let factor = (total / present_weight).min(MAX_REDISTRIBUTION);
    let sum: f64 = available
        .iter()
        .map(|(w, s)| s * w * factor)
        .filter(|t| t.is_finite())
        .sum();
    let result = safe_div(sum, total, 0.0) * Domain::ALL.len() as f64 * COMPOSITE_SCALE;
    if result.is_finite() { result } else { 0.0 }
}

pub fn alert_level(composite: f64) -> AlertLevel {
    AlertLevel::from_composite(composite)
}
