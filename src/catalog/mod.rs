mod loader;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use loader::{load_builtin_v5, load_indicator_tsv, load_topic_tsv, parse_indicator_tsv};

/// The eleven cognitive/motor domains every indicator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Lexical,
    Syntactic,
    Semantic,
    Temporal,
    Memory,
    Discourse,
    Affective,
    Acoustic,
    PdMotor,
    Pragmatic,
    Executive,
}

impl Domain {
    pub const ALL: [Domain; 11] = [
        Domain::Lexical,
        Domain::Syntactic,
        Domain::Semantic,
        Domain::Temporal,
        Domain::Memory,
        Domain::Discourse,
        Domain::Affective,
        Domain::Acoustic,
        Domain::PdMotor,
        Domain::Pragmatic,
        Domain::Executive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Lexical => "lexical",
            Domain::Syntactic => "syntactic",
            Domain::Semantic => "semantic",
            Domain::Temporal => "temporal",
            Domain::Memory => "memory",
            Domain::Discourse => "discourse",
            Domain::Affective => "affective",
            Domain::Acoustic => "acoustic",
            Domain::PdMotor => "pd_motor",
            Domain::Pragmatic => "pragmatic",
            Domain::Executive => "executive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Domain::ALL.into_iter().find(|d| d.as_str() == value)
    }

    /// Composite weight. The eleven weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Domain::Semantic => 0.18,
            Domain::Lexical => 0.13,
            Domain::Temporal => 0.11,
            Domain::Acoustic => 0.11,
            Domain::Syntactic => 0.09,
            Domain::Memory => 0.09,
            Domain::PdMotor => 0.09,
            Domain::Pragmatic => 0.06,
            Domain::Discourse => 0.05,
            Domain::Executive => 0.05,
            Domain::Affective => 0.04,
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Domain::Acoustic | Domain::PdMotor)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditions the differential engine scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Alzheimer,
    Depression,
    Parkinson,
    NormalAging,
    Medication,
    Grief,
    Msa,
    Psp,
    Lbd,
    Ftd,
    Vci,
}

impl Condition {
    pub const ALL: [Condition; 11] = [
        Condition::Alzheimer,
        Condition::Depression,
        Condition::Parkinson,
        Condition::NormalAging,
        Condition::Medication,
        Condition::Grief,
        Condition::Msa,
        Condition::Psp,
        Condition::Lbd,
        Condition::Ftd,
        Condition::Vci,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Alzheimer => "alzheimer",
            Condition::Depression => "depression",
            Condition::Parkinson => "parkinson",
            Condition::NormalAging => "normal_aging",
            Condition::Medication => "medication",
            Condition::Grief => "grief",
            Condition::Msa => "msa",
            Condition::Psp => "psp",
            Condition::Lbd => "lbd",
            Condition::Ftd => "ftd",
            Condition::Vci => "vci",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Condition::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Pathological conditions: everything except normal aging and the
    /// situational explanations (medication, grief).
    pub fn is_disease(&self) -> bool {
        !matches!(
            self,
            Condition::NormalAging | Condition::Medication | Condition::Grief
        )
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acquisition channel an indicator is extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    Text,
    Meta,
    Audio,
    WhisperTemporal,
    Conversation,
    MicroTask,
}

impl Stream {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Stream::Text),
            "meta" => Some(Stream::Meta),
            "audio" => Some(Stream::Audio),
            "whisper_temporal" => Some(Stream::WhisperTemporal),
            "conversation" => Some(Stream::Conversation),
            "micro_task" => Some(Stream::MicroTask),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Indicator {
    pub id: String,
    pub domain: Domain,
    pub base_weight: f64,
    pub stream: Stream,
    /// +1 rises, -1 falls, 0 stable, 0.5 varies under the condition.
    pub directions: BTreeMap<Condition, f64>,
    pub effect_sizes: BTreeMap<Condition, f64>,
    pub name: String,
}

impl Indicator {
    /// Condition with the largest published effect size for this indicator.
    /// Ties keep the first condition in declaration order.
    pub fn dominant_condition(&self) -> Option<Condition> {
        let mut best: Option<(Condition, f64)> = None;
        for (condition, size) in &self.effect_sizes {
            match best {
                Some((_, current)) if *size <= current => {}
                _ => best = Some((*condition, *size)),
            }
        }
        best.map(|(c, _)| c)
    }

    /// True when a rise of the raw value is pathological, so the z-score
    /// has to be negated to keep "negative = decline".
    pub fn flips_sign(&self) -> bool {
        self.dominant_condition()
            .and_then(|c| self.directions.get(&c))
            .is_some_and(|d| *d == 1.0)
    }
}

/// Per-genre additive z-score offsets.
#[derive(Debug, Clone, Default)]
pub struct TopicTable {
    pub genres: BTreeMap<String, BTreeMap<String, f64>>,
}

impl TopicTable {
    pub fn genre(&self, genre: &str) -> Option<&BTreeMap<String, f64>> {
        self.genres.get(genre)
    }

    pub fn adjustment(&self, genre: &str, indicator: &str) -> f64 {
        self.genre(genre)
            .and_then(|g| g.get(indicator))
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub version: String,
    pub indicators: Vec<Indicator>,
    pub topics: TopicTable,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(version: &str, indicators: Vec<Indicator>, topics: TopicTable) -> Self {
        let index = indicators
            .iter()
            .enumerate()
            .map(|(i, ind)| (ind.id.clone(), i))
            .collect();
        Self {
            version: version.to_string(),
            indicators,
            topics,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Indicator> {
        self.index.get(id).map(|&i| &self.indicators[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn domain_members(&self, domain: Domain) -> impl Iterator<Item = &Indicator> {
        self.indicators.iter().filter(move |ind| ind.domain == domain)
    }

    pub fn audio_ids(&self) -> impl Iterator<Item = &str> {
        self.indicators
            .iter()
            .filter(|ind| ind.domain.is_audio())
            .map(|ind| ind.id.as_str())
    }
}

pub fn load_builtin() -> Result<Catalog> {
    load_builtin_v5()
}

pub fn load_user(indicators: &Path, topics: Option<&Path>) -> Result<Catalog> {
    let defs = load_indicator_tsv(indicators)?;
    let topics = match topics {
        Some(path) => load_topic_tsv(path)?,
        None => load_builtin_v5()?.topics,
    };
    Ok(Catalog::new("user", defs, topics))
}

/// Sentinel families and their indicator sets.
pub const SENTINELS: [(Condition, &[&str]); 5] = [
    (
        Condition::Alzheimer,
        &[
            "SEM_IDEA_DENSITY",
            "SEM_REF_COHERENCE",
            "LEX_PRONOUN_NOUN",
            "TMP_LPR",
            "MEM_CUED_RECALL",
            "SEM_EMBEDDING_COHERENCE",
            "TMP_WITHIN_CLAUSE",
            "TMP_PAUSE_BEFORE_NOUN",
            "PRA_NARRATIVE_STRUCTURE",
        ],
    ),
    (
        Condition::Depression,
        &[
            "AFF_SELF_PRONOUN",
            "AFF_NEG_VALENCE",
            "TMP_VARIABILITY",
            "AFF_HEDONIC",
            "TMP_RESPONSE_LATENCY",
            "ACU_MFCC2",
            "ACU_F0_SD",
        ],
    ),
    (
        Condition::Parkinson,
        &[
            "PDM_PPE",
            "PDM_RPDE",
            "PDM_DFA",
            "ACU_HNR",
            "ACU_F0_SD",
            "PDM_MONOPITCH",
            "PDM_DDK_RATE",
            "PDM_VSA",
            "ACU_JITTER",
            "ACU_SHIMMER",
            "ACU_TREMOR_FREQ",
        ],
    ),
    (
        Condition::Lbd,
        &[
            "TMP_VARIABILITY",
            "TMP_PAUSE_VARIABILITY",
            "PDM_PPE",
            "PDM_MONOPITCH",
            "ACU_F0_SD",
            "MEM_CUED_RECALL",
            "ACU_HNR",
            "EXE_TASK_SWITCHING",
        ],
    ),
    (
        Condition::Ftd,
        &[
            "PRA_INDIRECT_SPEECH",
            "PRA_HUMOR_IRONY",
            "PRA_PERSPECTIVE_TAKING",
            "EXE_INHIBITION",
            "EXE_COGNITIVE_FLEXIBILITY",
            "MEM_SEMANTIC_FLUENCY",
            "LEX_WORD_FREQ",
            "SEM_IDEA_DENSITY",
            "DIS_PERSEVERATION",
        ],
    ),
];

pub fn sentinels_for(condition: Condition) -> Option<&'static [&'static str]> {
    SENTINELS
        .iter()
        .find(|(c, _)| *c == condition)
        .map(|(_, ids)| *ids)
}
