use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::catalog::{Catalog, Condition, Domain, Indicator, Stream, TopicTable};

pub fn load_builtin_v5() -> Result<Catalog> {
    let indicators = parse_indicator_tsv(
        include_str!("../../assets/catalog/indicators_v5.tsv"),
        "built-in v5",
    )?;
    let topics = parse_topic_tsv(
        include_str!("../../assets/catalog/topic_adjustments_v5.tsv"),
        "built-in v5 topics",
    )?;
    Ok(Catalog::new("v5", indicators, topics))
}

pub fn load_indicator_tsv(path: &Path) -> Result<Vec<Indicator>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read indicator TSV {}", path.display()))?;
    parse_indicator_tsv(&content, &path.display().to_string())
}

pub fn load_topic_tsv(path: &Path) -> Result<TopicTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read topic TSV {}", path.display()))?;
    parse_topic_tsv(&content, &path.display().to_string())
}

pub fn parse_indicator_tsv(content: &str, source: &str) -> Result<Vec<Indicator>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').collect();
        if parts.len() != 7 {
            bail!("{}:{} malformed TSV (expected 7 columns)", source, line_no);
        }
        let id = parts[0].trim();
        if id.is_empty() {
            bail!("{}:{} empty indicator id", source, line_no);
        }
        if !seen.insert(id.to_string()) {
            bail!("{}:{} duplicate indicator '{}'", source, line_no, id);
        }
        let domain = Domain::parse(parts[1].trim())
            .ok_or_else(|| anyhow::anyhow!("{}:{} unknown domain '{}'", source, line_no, parts[1]))?;
        let base_weight: f64 = parts[2]
            .trim()
            .parse()
            .with_context(|| format!("{}:{} invalid base_weight", source, line_no))?;
        if !(base_weight.is_finite() && base_weight > 0.0) {
            bail!("{}:{} base_weight must be positive", source, line_no);
        }
        let stream = Stream::parse(parts[3].trim())
            .ok_or_else(|| anyhow::anyhow!("{}:{} unknown stream '{}'", source, line_no, parts[3]))?;
        let directions = parse_condition_map(parts[4], source, line_no)?;
        for dir in directions.values() {
            if ![-1.0, 0.0, 0.5, 1.0].contains(dir) {
                bail!("{}:{} direction must be one of -1, 0, 0.5, 1", source, line_no);
            }
        }
        let effect_sizes = parse_condition_map(parts[5], source, line_no)?;

        out.push(Indicator {
            id: id.to_string(),
            domain,
            base_weight,
            stream,
            directions,
            effect_sizes,
            name: parts[6].trim().to_string(),
        });
    }

    if out.is_empty() {
        bail!("{}: no indicators defined", source);
    }
    Ok(out)
}

fn parse_condition_map(field: &str, source: &str, line_no: usize) -> Result<BTreeMap<Condition, f64>> {
    let mut map = BTreeMap::new();
    let field = field.trim();
    if field == "-" || field.is_empty() {
        return Ok(map);
    }
    for pair in field.split(',') {
        let (name, value) = pair
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("{}:{} malformed pair '{}'", source, line_no, pair))?;
        let condition = Condition::parse(name.trim()).ok_or_else(|| {
            anyhow::anyhow!("{}:{} unknown condition '{}'", source, line_no, name)
        })?;
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("{}:{} invalid value for '{}'", source, line_no, name))?;
        map.insert(condition, value);
    }
    Ok(map)
}

pub(crate) fn parse_topic_tsv(content: &str, source: &str) -> Result<TopicTable> {
    let mut table = TopicTable::default();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').collect();
        if parts.len() != 3 {
            bail!("{}:{} malformed TSV (expected 3 columns)", source, line_no);
        }
        let genre = parts[0].trim();
        let indicator = parts[1].trim();
        if genre.is_empty() || indicator.is_empty() {
            bail!("{}:{} empty field in TSV", source, line_no);
        }
        let value: f64 = parts[2]
            .trim()
            .parse()
            .with_context(|| format!("{}:{} invalid adjustment", source, line_no))?;
        table
            .genres
            .entry(genre.to_string())
            .or_default()
            .insert(indicator.to_string(), value);
    }
    Ok(table)
}
