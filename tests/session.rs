use kira_neurovoice::catalog::{self, Catalog, Domain};
use kira_neurovoice::config::EngineConfig;
use kira_neurovoice::scores::baseline::{Baseline, compute_baseline};
use kira_neurovoice::scores::confounder::ConfounderFlags;
use kira_neurovoice::scores::session::{SessionContext, SessionInput, analyze_session, analyze_week};
use kira_neurovoice::scores::zscore::TopicContext;
use kira_neurovoice::scores::{AlertLevel, DomainScores, FeatureVector, HistoryRecord};

fn baseline(catalog: &Catalog, cfg: &EngineConfig) -> Baseline {
    let vectors: Vec<FeatureVector> = (0..14).map(|_| FeatureVector::uniform(catalog, 0.5)).collect();
    compute_baseline(catalog, &vectors, cfg)
}

#[test]
fn session_at_baseline_is_green() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let base = baseline(&catalog, &cfg);
    let vector = FeatureVector::uniform(&catalog, 0.5);

    let res = analyze_session(&catalog, &vector, &base, &SessionContext::default(), &cfg);
    assert!(res.composite.abs() < 1e-12);
    assert_eq!(res.alert_level, AlertLevel::Green);
    assert_eq!(res.indicator_count, 107);
    assert!(res.audio_available);
    assert!(res.acoustic_scores.is_some());
    assert!(res.decline_profile.is_none());
    assert!(res.sentinel_alerts.is_empty());
    assert_eq!(res.confounder_weight, 1.0);
    assert!(!res.topic_adjusted);
}

#[test]
fn text_only_session_has_no_voice_scores() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let base = baseline(&catalog, &cfg);
    let mut vector = FeatureVector::new();
    for ind in catalog.domain_members(Domain::Lexical) {
        vector.set(&ind.id, 0.5);
    }

    let res = analyze_session(&catalog, &vector, &base, &SessionContext::default(), &cfg);
    assert!(!res.audio_available);
    assert!(res.acoustic_scores.is_none());
    assert_eq!(res.domain_scores.get(Domain::Acoustic), None);
    assert_eq!(res.indicator_count, 17);
}

#[test]
fn context_layers_are_reported() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let base = baseline(&catalog, &cfg);
    let vector = FeatureVector::uniform(&catalog, 0.45);
    let mut flags = ConfounderFlags::new();
    flags.insert("poor_sleep".to_string(), true);
    let topic = TopicContext::new("narrative_travel", 1.0);
    let history = vec![
        HistoryRecord::new(0.0, DomainScores::uniform(0.0)),
        HistoryRecord::new(-0.1, DomainScores::uniform(-0.1)),
    ];
    let ctx = SessionContext {
        confounders: Some(&flags),
        topic: Some(&topic),
        age: Some(72.0),
        history: &history,
    };

    let res = analyze_session(&catalog, &vector, &base, &ctx, &cfg);
    assert_eq!(res.confounder_weight, 0.5);
    assert!(res.topic_adjusted);
    assert_eq!(res.topic_genre.as_deref(), Some("narrative_travel"));
    assert!(res.decline_profile.is_some());
    assert_eq!(res.patient_age, Some(72.0));
    let raw = res.raw_domain_scores.get(Domain::Memory).unwrap();
    let adjusted = res.domain_scores.get(Domain::Memory).unwrap();
    assert!((adjusted - raw * 0.5).abs() < 1e-9);
}

#[test]
fn week_aggregates_sessions() {
    let catalog = catalog::load_builtin().unwrap();
    let cfg = EngineConfig::default_v1();
    let base = baseline(&catalog, &cfg);
    let sessions: Vec<SessionInput> = (0..7)
        .map(|i| SessionInput::new(FeatureVector::uniform(&catalog, 0.5 - 0.01 * i as f64)))
        .collect();

    let week = analyze_week(&catalog, &sessions, &base, 1, None, &cfg).unwrap();
    assert_eq!(week.week_number, 1);
    assert_eq!(week.sessions_analyzed, 7);
    assert_eq!(week.session_composites.len(), 7);
    assert!(week.trend.is_finite());
    assert!(week.audio_available);

    assert!(analyze_week(&catalog, &[], &base, 2, None, &cfg).is_none());
}
