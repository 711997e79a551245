use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Condition, SENTINELS};
use crate::math::stats::round_to;
use crate::scores::{ZScores, z_value};

const MAX_ABS_Z: f64 = 5.0;
const MIN_FIRED: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentinelHit {
    pub indicator: String,
    pub z_score: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentinelAlert {
    pub condition: Condition,
    pub triggered_count: usize,
    pub total_sentinels: usize,
    pub details: Vec<SentinelHit>,
    pub confidence: f64,
}

pub fn sentinel_threshold(condition: Condition) -> f64 {
    if condition == Condition::Depression { -0.4 } else { -0.5 }
}

pub fn check_sentinels(catalog: &Catalog, z: &ZScores) -> Vec<SentinelAlert> {
    let mut alerts = Vec::new();
    for (condition, ids) in SENTINELS {
        let threshold = sentinel_threshold(condition);
        let details: Vec<SentinelHit> = ids
            .iter()
            .filter_map(|id| z_value(z, id).map(|v| (*id, v)))
            .filter(|(_, v)| v.abs() <= MAX_ABS_Z && *v < threshold)
            .map(|(id, v)| SentinelHit {
                indicator: id.to_string(),
                z_score: round_to(v, 2),
                name: catalog.get(id).map(|i| i.name.clone()).unwrap_or_default(),
            })
            .collect();
        if details.len() >= MIN_FIRED {
            alerts.push(SentinelAlert {
                condition,
                triggered_count: details.len(),
                total_sentinels: ids.len(),
                confidence: (details.len() as f64 / ids.len() as f64).min(1.0),
                details,
            });
        }
    }
    alerts
}

pub fn triggered_count(alerts: &[SentinelAlert], condition: Condition) -> usize {
    alerts
        .iter()
        .find(|a| a.condition == condition)
        .map_or(0, |a| a.triggered_count)
}
