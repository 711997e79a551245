//! The differential rule set. Each rule is a pure function from the
//! evaluation context to a score delta; the engine folds them in order.

use std::collections::BTreeMap;

use crate::catalog::{Condition, Domain};
use crate::differential::DifferentialContext;
use crate::differential::patterns::{
    PRAGMATIC_IDS, TemporalPattern, count_step_drops, detect_ad_cascade, detect_temporal_pattern,
    mean_present,
};
use crate::scores::confounder::Confounder;
use crate::scores::{DomainScores, ZScores, z_value};

pub struct RuleContext<'a> {
    pub domains: &'a DomainScores,
    pub z: &'a ZScores,
    pub ctx: &'a DifferentialContext,
    /// Scores accumulated by the rules that ran before this one.
    pub scores: &'a BTreeMap<Condition, f64>,
}

impl RuleContext<'_> {
    fn z(&self, id: &str) -> Option<f64> {
        z_value(self.z, id)
    }

    fn d(&self, domain: Domain) -> Option<f64> {
        self.domains.get(domain)
    }

    fn d0(&self, domain: Domain) -> f64 {
        self.domains.or_zero(domain)
    }

    fn below(&self, id: &str, threshold: f64) -> bool {
        self.z(id).is_some_and(|v| v < threshold)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreDelta {
    pub adds: Vec<(Condition, f64)>,
    pub scales: Vec<(Condition, f64)>,
    pub evidence: Vec<(Condition, String)>,
    pub flags: Vec<String>,
}

impl ScoreDelta {
    pub fn none() -> Self {
        Self::default()
    }

    fn add(mut self, condition: Condition, value: f64) -> Self {
        if value.is_finite() {
            self.adds.push((condition, value));
        }
        self
    }

    fn scale_where(mut self, pred: impl Fn(Condition) -> bool, factor: f64) -> Self {
        for c in Condition::ALL {
            if pred(c) {
                self.scales.push((c, factor));
            }
        }
        self
    }

    fn note(mut self, condition: Condition, text: impl Into<String>) -> Self {
        self.evidence.push((condition, text.into()));
        self
    }

    fn flag(mut self, name: &str) -> Self {
        self.flags.push(name.to_string());
        self
    }

    pub fn changes_scores(&self) -> bool {
        self.adds.iter().any(|(_, v)| *v != 0.0) || self.scales.iter().any(|(_, f)| *f != 1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.scales.is_empty() && self.evidence.is_empty() && self.flags.is_empty()
    }
}

pub struct Rule {
    pub id: u8,
    pub name: &'static str,
    pub apply: fn(&RuleContext<'_>) -> ScoreDelta,
}

use Condition::{
    Alzheimer as AD, Depression as DEP, Ftd as FTD, Grief as GRIEF, Lbd as LBD, Medication as MED,
    Msa as MSA, NormalAging as NA, Parkinson as PD, Psp as PSP, Vci as VCI,
};

pub const RULES: [Rule; 35] = [
    Rule { id: 1, name: "ad_cascade", apply: r01_ad_cascade },
    Rule { id: 2, name: "referential_coherence", apply: r02_referential_coherence },
    Rule { id: 3, name: "cued_recall", apply: r03_cued_recall },
    Rule { id: 4, name: "self_focus", apply: r04_self_focus },
    Rule { id: 5, name: "negative_valence", apply: r05_negative_valence },
    Rule { id: 6, name: "temporal_pattern", apply: r06_temporal_pattern },
    Rule { id: 7, name: "idea_density", apply: r07_idea_density },
    Rule { id: 8, name: "pause_location", apply: r08_pause_location },
    Rule { id: 9, name: "semantic_fluency_split", apply: r09_semantic_fluency_split },
    Rule { id: 10, name: "anhedonia", apply: r10_anhedonia },
    Rule { id: 11, name: "medication_change", apply: r11_medication_change },
    Rule { id: 12, name: "emotional_distress", apply: r12_emotional_distress },
    Rule { id: 13, name: "global_stability", apply: r13_global_stability },
    Rule { id: 14, name: "self_correction", apply: r14_self_correction },
    Rule { id: 15, name: "pd_acoustic_quartet", apply: r15_pd_acoustic },
    Rule { id: 16, name: "articulatory", apply: r16_articulatory },
    Rule { id: 17, name: "msa_profile", apply: r17_msa },
    Rule { id: 18, name: "psp_profile", apply: r18_psp },
    Rule { id: 19, name: "response_latency", apply: r19_response_latency },
    Rule { id: 20, name: "spectral_flattening", apply: r20_spectral },
    Rule { id: 21, name: "ruminative_language", apply: r21_ruminative },
    Rule { id: 22, name: "verbal_output", apply: r22_verbal_output },
    Rule { id: 23, name: "isolated_monopitch", apply: r23_monopitch },
    Rule { id: 24, name: "lbd_fluctuation", apply: r24_lbd_fluctuation },
    Rule { id: 25, name: "lbd_concurrent", apply: r25_lbd_concurrent },
    Rule { id: 26, name: "ftd_behavioral", apply: r26_ftd_behavioral },
    Rule { id: 27, name: "ftd_semantic", apply: r27_ftd_semantic },
    Rule { id: 28, name: "topic_dampening", apply: r28_topic },
    Rule { id: 29, name: "acoustic_linguistic_discrepancy", apply: r29_discrepancy },
    Rule { id: 30, name: "low_confidence_dampening", apply: r30_confidence },
    Rule { id: 31, name: "age_consistent", apply: r31_age_consistent },
    Rule { id: 32, name: "acceleration", apply: r32_acceleration },
    Rule { id: 33, name: "excess_decline", apply: r33_excess },
    Rule { id: 34, name: "vascular_step_wise", apply: r34_vascular_steps },
    Rule { id: 35, name: "vascular_executive", apply: r35_vascular_executive },
];

/// Domains whose decline characterises each condition.
const SIGNATURES: [(Condition, &[Domain]); 6] = [
    (
        AD,
        &[Domain::Semantic, Domain::Lexical, Domain::Memory, Domain::Syntactic],
    ),
    (PD, &[Domain::Acoustic, Domain::PdMotor]),
    (DEP, &[Domain::Affective]),
    (LBD, &[Domain::Executive, Domain::PdMotor, Domain::Memory]),
    (FTD, &[Domain::Pragmatic, Domain::Executive]),
    (VCI, &[Domain::Executive, Domain::Temporal]),
];

fn r01_ad_cascade(r: &RuleContext<'_>) -> ScoreDelta {
    let signal = detect_ad_cascade(r.domains);
    if !signal.detected {
        return ScoreDelta::none();
    }
    ScoreDelta::none().add(AD, 0.25 * signal.confidence).note(
        AD,
        format!(
            "AD cascade stage {} (confidence {:.0}%)",
            signal.stage,
            signal.confidence * 100.0
        ),
    )
}

fn r02_referential_coherence(r: &RuleContext<'_>) -> ScoreDelta {
    match r.z("SEM_REF_COHERENCE") {
        Some(v) if v < -0.5 => ScoreDelta::none()
            .add(AD, 0.20)
            .note(AD, format!("referential coherence degraded (z={:.2})", v)),
        Some(v) if v > -0.2 => ScoreDelta::none()
            .add(DEP, 0.15)
            .add(NA, 0.10)
            .note(DEP, format!("referential coherence preserved (z={:.2})", v)),
        _ => ScoreDelta::none(),
    }
}

fn r03_cued_recall(r: &RuleContext<'_>) -> ScoreDelta {
    let (Some(cued), Some(free)) = (r.z("MEM_CUED_RECALL"), r.z("MEM_FREE_RECALL")) else {
        return ScoreDelta::none();
    };
    let benefit = cued - free;
    if free < -0.5 && benefit > 0.3 {
        ScoreDelta::none()
            .add(DEP, 0.20)
            .note(DEP, format!("cued recall responsive (benefit={:.2})", benefit))
    } else if free < -0.5 && benefit < 0.15 {
        ScoreDelta::none()
            .add(AD, 0.20)
            .note(AD, format!("cued recall non-responsive (benefit={:.2})", benefit))
    } else {
        ScoreDelta::none()
    }
}

fn r04_self_focus(r: &RuleContext<'_>) -> ScoreDelta {
    if r.below("AFF_SELF_PRONOUN", -0.5) {
        return ScoreDelta::none()
            .add(DEP, 0.15)
            .note(DEP, "elevated self-focused pronoun use");
    }
    ScoreDelta::none()
}

fn r05_negative_valence(r: &RuleContext<'_>) -> ScoreDelta {
    if r.below("AFF_NEG_VALENCE", -0.4) {
        return ScoreDelta::none()
            .add(DEP, 0.15)
            .note(DEP, "negative valence shift");
    }
    ScoreDelta::none()
}

fn r06_temporal_pattern(r: &RuleContext<'_>) -> ScoreDelta {
    if r.ctx.timeline.len() < 7 {
        return ScoreDelta::none();
    }
    match detect_temporal_pattern(&r.ctx.timeline) {
        TemporalPattern::MonotonicDecline { weeks, .. } => ScoreDelta::none()
            .add(AD, 0.15)
            .note(AD, format!("monotonic decline over {} records", weeks)),
        TemporalPattern::Episodic { oscillations } => ScoreDelta::none()
            .add(DEP, 0.20)
            .note(DEP, format!("episodic fluctuation ({} reversals)", oscillations)),
        TemporalPattern::AcuteDrop { drop_at, .. } => ScoreDelta::none()
            .add(MED, 0.25)
            .note(MED, format!("acute drop at record {}", drop_at)),
        TemporalPattern::Stable { .. } => ScoreDelta::none()
            .add(NA, 0.25)
            .note(NA, "stable trajectory within normal variance"),
        TemporalPattern::InsufficientData | TemporalPattern::Unclear => ScoreDelta::none(),
    }
}

fn r07_idea_density(r: &RuleContext<'_>) -> ScoreDelta {
    match r.z("SEM_IDEA_DENSITY") {
        Some(v) if v < -0.5 => ScoreDelta::none()
            .add(AD, 0.15)
            .note(AD, format!("idea density declining (z={:.2})", v)),
        _ => ScoreDelta::none(),
    }
}

fn r08_pause_location(r: &RuleContext<'_>) -> ScoreDelta {
    if r.below("TMP_WITHIN_CLAUSE", -0.5) {
        return ScoreDelta::none()
            .add(AD, 0.10)
            .note(AD, "within-clause pauses elevated");
    }
    ScoreDelta::none()
}

fn r09_semantic_fluency_split(r: &RuleContext<'_>) -> ScoreDelta {
    let sem = r.d0(Domain::Semantic);
    let tmp = r.d0(Domain::Temporal);
    let lex = r.d0(Domain::Lexical);
    let mut delta = ScoreDelta::none();
    if tmp < -0.5 && sem > -0.2 && lex > -0.2 {
        delta = delta
            .add(PD, 0.20)
            .note(PD, format!("fluency-dominant decline (temporal={:.2})", tmp));
    }
    if sem < -0.5 && lex < -0.5 && tmp > -0.3 {
        delta = delta
            .add(AD, 0.10)
            .note(AD, "semantic and lexical decline with preserved fluency");
    }
    delta
}

fn r10_anhedonia(r: &RuleContext<'_>) -> ScoreDelta {
    let mut delta = ScoreDelta::none();
    if r.below("AFF_HEDONIC", -0.4) {
        delta = delta.add(DEP, 0.10).note(DEP, "reduced hedonic language");
    }
    if r.below("AFF_ENGAGEMENT", -0.4) {
        delta = delta.add(DEP, 0.10).note(DEP, "reduced conversational engagement");
    }
    delta
}

fn any_confounder(r: &RuleContext<'_>, wanted: Confounder) -> bool {
    r.ctx.confounders.iter().any(|flags| {
        flags
            .iter()
            .any(|(k, active)| *active && Confounder::parse(k) == Some(wanted))
    })
}

fn r11_medication_change(r: &RuleContext<'_>) -> ScoreDelta {
    if any_confounder(r, Confounder::MedicationChange) {
        return ScoreDelta::none()
            .add(MED, 0.20)
            .note(MED, "medication change reported in recent sessions");
    }
    ScoreDelta::none()
}

fn r12_emotional_distress(r: &RuleContext<'_>) -> ScoreDelta {
    if any_confounder(r, Confounder::EmotionalDistress) {
        return ScoreDelta::none()
            .add(GRIEF, 0.15)
            .note(GRIEF, "emotional distress reported");
    }
    ScoreDelta::none()
}

fn r13_global_stability(r: &RuleContext<'_>) -> ScoreDelta {
    if Domain::ALL.iter().all(|d| r.d(*d).is_none_or(|v| v > -0.3)) {
        return ScoreDelta::none()
            .add(NA, 0.30)
            .note(NA, "all domains within normal range");
    }
    ScoreDelta::none()
}

fn r14_self_correction(r: &RuleContext<'_>) -> ScoreDelta {
    match r.z("DIS_SELF_CORRECTION") {
        Some(v) if v < -0.5 => ScoreDelta::none()
            .add(AD, 0.10)
            .note(AD, "self-correction declining"),
        Some(_) => ScoreDelta::none()
            .add(DEP, 0.05)
            .add(NA, 0.05)
            .note(NA, "self-correction preserved"),
        None => ScoreDelta::none(),
    }
}

fn pd_acoustic_positive(r: &RuleContext<'_>) -> bool {
    r.below("PDM_PPE", -0.5) && r.below("PDM_RPDE", -0.5) && r.below("ACU_HNR", -0.5)
}

fn articulatory_involved(r: &RuleContext<'_>) -> bool {
    r.below("PDM_VSA", -0.5) || r.below("PDM_DDK_RATE", -0.5)
}

fn r15_pd_acoustic(r: &RuleContext<'_>) -> ScoreDelta {
    if pd_acoustic_positive(r) {
        return ScoreDelta::none()
            .add(PD, 0.30)
            .note(PD, "PPE, RPDE and HNR jointly degraded");
    }
    ScoreDelta::none()
}

fn r16_articulatory(r: &RuleContext<'_>) -> ScoreDelta {
    if articulatory_involved(r) {
        return ScoreDelta::none()
            .add(PD, 0.15)
            .note(PD, "articulatory involvement (VSA or DDK rate)");
    }
    ScoreDelta::none()
}

fn r17_msa(r: &RuleContext<'_>) -> ScoreDelta {
    let f0_sd_high = r.z("ACU_F0_SD").is_some_and(|v| v > 0.3);
    if pd_acoustic_positive(r)
        && f0_sd_high
        && r.below("ACU_SHIMMER", -0.5)
        && r.below("PDM_DDK_REG", -0.8)
    {
        return ScoreDelta::none()
            .add(MSA, 0.20)
            .add(PD, -0.10)
            .note(MSA, "pitch instability with irregular DDK");
    }
    ScoreDelta::none()
}

fn r18_psp(r: &RuleContext<'_>) -> ScoreDelta {
    if pd_acoustic_positive(r)
        && r.below("TMP_REPETITION", -0.8)
        && r.below("PDM_DDK_REG", -0.8)
        && articulatory_involved(r)
    {
        return ScoreDelta::none()
            .add(PSP, 0.15)
            .note(PSP, "repetitions with articulatory decay");
    }
    ScoreDelta::none()
}

fn r19_response_latency(r: &RuleContext<'_>) -> ScoreDelta {
    let dep = r.scores.get(&DEP).copied().unwrap_or(0.0);
    if dep > 0.2 && r.below("TMP_RESPONSE_LATENCY", -1.0) {
        return ScoreDelta::none()
            .note(DEP, "markedly prolonged response latency")
            .flag("mdd_vs_bipolar_noted");
    }
    ScoreDelta::none()
}

fn r20_spectral(r: &RuleContext<'_>) -> ScoreDelta {
    if r.below("ACU_MFCC2", -0.5) && r.below("ACU_SPECTRAL_HARM", -0.5) {
        return ScoreDelta::none()
            .add(DEP, 0.15)
            .note(DEP, "spectral flattening (MFCC2, harmonics)");
    }
    ScoreDelta::none()
}

fn r21_ruminative(r: &RuleContext<'_>) -> ScoreDelta {
    if r.below("LEX_DEATH_WORDS", -0.4) && r.below("LEX_RUMINATIVE", -0.4) {
        return ScoreDelta::none()
            .add(DEP, 0.10)
            .note(DEP, "death-related and ruminative language");
    }
    ScoreDelta::none()
}

fn r22_verbal_output(r: &RuleContext<'_>) -> ScoreDelta {
    if r.below("LEX_VERBAL_OUTPUT", -0.5) {
        return ScoreDelta::none()
            .add(DEP, 0.05)
            .add(PD, 0.05)
            .note(DEP, "reduced verbal output")
            .note(PD, "reduced verbal output");
    }
    ScoreDelta::none()
}

fn r23_monopitch(r: &RuleContext<'_>) -> ScoreDelta {
    if r.below("PDM_MONOPITCH", -0.4) && r.d0(Domain::PdMotor) > -0.2 {
        return ScoreDelta::none()
            .add(PD, 0.10)
            .note(PD, "isolated monopitch with preserved motor domain")
            .flag("prodromal_pd_rbd_flag");
    }
    ScoreDelta::none()
}

fn r24_lbd_fluctuation(r: &RuleContext<'_>) -> ScoreDelta {
    let motor = r.d0(Domain::PdMotor) < -0.3 || r.d0(Domain::Acoustic) < -0.3;
    let cognitive = r.d0(Domain::Semantic) < -0.3 || r.d0(Domain::Memory) < -0.3;
    if r.below("TMP_VARIABILITY", -0.8) && motor && cognitive {
        return ScoreDelta::none()
            .add(LBD, 0.25)
            .note(LBD, "fluctuating cognition with motor and cognitive decline");
    }
    ScoreDelta::none()
}

fn r25_lbd_concurrent(r: &RuleContext<'_>) -> ScoreDelta {
    let cognitive = r.d0(Domain::Semantic).min(r.d0(Domain::Memory));
    if r.d0(Domain::PdMotor) < -0.4 && cognitive < -0.4 {
        return ScoreDelta::none()
            .add(LBD, 0.20)
            .add(PD, -0.05)
            .note(LBD, "concurrent motor and cognitive decline");
    }
    ScoreDelta::none()
}

fn r26_ftd_behavioral(r: &RuleContext<'_>) -> ScoreDelta {
    let pragmatic = mean_present(r.z, &PRAGMATIC_IDS);
    if pragmatic.is_some_and(|p| p < -0.6) && r.d0(Domain::Memory) > -0.3 {
        return ScoreDelta::none()
            .add(FTD, 0.25)
            .note(FTD, "behavioral: pragmatic collapse with preserved memory");
    }
    ScoreDelta::none()
}

fn r27_ftd_semantic(r: &RuleContext<'_>) -> ScoreDelta {
    if r.below("LEX_WORD_FREQ", -0.8) && r.d0(Domain::Syntactic) > -0.2 {
        return ScoreDelta::none()
            .add(FTD, 0.20)
            .note(FTD, "semantic: naming failure with preserved syntax");
    }
    ScoreDelta::none()
}

fn r28_topic(r: &RuleContext<'_>) -> ScoreDelta {
    let Some(genre) = r.ctx.topic_genre.as_deref() else {
        return ScoreDelta::none();
    };
    if genre == "daily_routine" {
        return ScoreDelta::none();
    }
    let significant = r
        .ctx
        .topic_adjustments
        .values()
        .filter(|v| v.abs() > 0.05)
        .count();
    if significant > 5 {
        return ScoreDelta::none()
            .scale_where(|c| c != NA, 0.85)
            .add(NA, 0.05)
            .note(NA, format!("topic genre '{}' explains part of the shift", genre));
    }
    ScoreDelta::none()
}

fn r29_discrepancy(r: &RuleContext<'_>) -> ScoreDelta {
    let Some(acu) = r.d(Domain::Acoustic) else {
        return ScoreDelta::none();
    };
    let linguistic =
        (r.d0(Domain::Lexical) + r.d0(Domain::Syntactic) + r.d0(Domain::Semantic)) / 3.0;
    if acu < -0.5 && linguistic > -0.2 {
        return ScoreDelta::none()
            .add(PD, 0.10)
            .note(PD, "acoustic decline with intact language")
            .flag("acoustic_linguistic_discrepancy");
    }
    ScoreDelta::none()
}

fn r30_confidence(r: &RuleContext<'_>) -> ScoreDelta {
    let reduction: f64 = r
        .ctx
        .indicator_confidence
        .iter()
        .filter(|(_, conf)| **conf < 0.5)
        .filter_map(|(id, conf)| r.z(id).map(|z| (z, *conf)))
        .filter(|(z, _)| z.abs() > 0.5)
        .map(|(_, conf)| (1.0 - conf) * 0.02)
        .sum();
    if reduction > 0.05 {
        let factor = 1.0 - reduction.min(1.0);
        return ScoreDelta::none()
            .scale_where(|c| c != NA, factor)
            .flag("low_confidence_dampening");
    }
    ScoreDelta::none()
}

fn r31_age_consistent(r: &RuleContext<'_>) -> ScoreDelta {
    let consistent = r.ctx.decline_profile.as_ref().is_some_and(|p| p.age_consistent);
    if consistent {
        return ScoreDelta::none()
            .scale_where(|c| c.is_disease(), 0.6)
            .add(NA, 0.30)
            .note(NA, "decline rate consistent with age");
    }
    ScoreDelta::none()
}

/// Condition whose signature domains are worsening the most. A condition
/// qualifies when enough of its signature domains pass `is_bad`.
fn strongest_signature(
    values: &BTreeMap<Domain, f64>,
    is_bad: impl Fn(f64) -> bool,
) -> Vec<(Condition, f64)> {
    SIGNATURES
        .iter()
        .filter_map(|(cond, domains)| {
            let bad: Vec<f64> = domains
                .iter()
                .filter_map(|d| values.get(d).copied())
                .filter(|v| is_bad(*v))
                .collect();
            if bad.len() >= domains.len().min(2) {
                Some((*cond, bad.iter().map(|v| v.abs()).sum()))
            } else {
                None
            }
        })
        .collect()
}

fn r32_acceleration(r: &RuleContext<'_>) -> ScoreDelta {
    let Some(accel) = r.ctx.decline_profile.as_ref().and_then(|p| p.acceleration.as_ref()) else {
        return ScoreDelta::none();
    };
    let worsening = accel.values().filter(|a| **a < -0.001).count();
    if worsening == 0 {
        return ScoreDelta::none()
            .scale_where(|c| c.is_disease(), 0.9)
            .note(NA, "no domain is accelerating");
    }
    if worsening < 2 {
        return ScoreDelta::none();
    }
    let mut candidates = strongest_signature(accel, |a| a < -0.001);
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    match candidates.first() {
        Some((cond, _)) => ScoreDelta::none()
            .add(*cond, 0.10)
            .note(*cond, format!("accelerating decline across {} domains", worsening))
            .flag("accelerating_decline"),
        None => ScoreDelta::none().flag("accelerating_decline"),
    }
}

fn r33_excess(r: &RuleContext<'_>) -> ScoreDelta {
    let Some(excess) = r.ctx.decline_profile.as_ref().and_then(|p| p.excess_decline.as_ref()) else {
        return ScoreDelta::none();
    };
    if excess.is_empty() {
        return ScoreDelta::none();
    }
    if excess.values().all(|e| *e <= 0.001) {
        return ScoreDelta::none()
            .add(NA, 0.25)
            .note(NA, "no decline beyond the age-expected rate");
    }
    let mut delta = ScoreDelta::none();
    for (cond, _) in strongest_signature(excess, |e| e > 0.005) {
        delta = delta
            .add(cond, 0.10)
            .note(cond, "signature domains decline faster than age predicts");
    }
    delta
}

fn r34_vascular_steps(r: &RuleContext<'_>) -> ScoreDelta {
    let steps = count_step_drops(&r.ctx.timeline);
    if steps >= 1 {
        return ScoreDelta::none()
            .add(VCI, 0.25)
            .note(VCI, format!("step-wise decline ({} drop(s) followed by plateau)", steps));
    }
    ScoreDelta::none()
}

fn r35_vascular_executive(r: &RuleContext<'_>) -> ScoreDelta {
    if r.d0(Domain::Executive) < -0.5
        && r.d0(Domain::Memory) > -0.3
        && r.d0(Domain::Temporal) < -0.3
    {
        return ScoreDelta::none()
            .add(VCI, 0.20)
            .note(VCI, "executive slowing with relatively spared memory");
    }
    ScoreDelta::none()
}
