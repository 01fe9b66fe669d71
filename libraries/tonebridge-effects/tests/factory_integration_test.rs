//! Effect Factory Integration Tests
//!
//! End-to-end behavior of the factory over the reference engines:
//! capability gaps, binding rules, pipeline context lifecycle and the
//! preset-clearing rule as seen through live handles.

use std::sync::Arc;

use tonebridge_core::{
    BackendKind, EffectError, EffectType, EqualizerSettings, PresetSelection, SessionId,
    SettingsSnapshot,
};
use tonebridge_effects::reference::{ReferencePipelineEngine, ReferenceSessionEngine};
use tonebridge_effects::{
    CapabilityProbe, ContextParams, EffectFactory, EffectHandle, FactoryConfig, PipelineContext,
    PlayerHandle,
};

fn probe(session: ReferenceSessionEngine, pipeline: ReferencePipelineEngine) -> Arc<CapabilityProbe> {
    Arc::new(CapabilityProbe::new(Arc::new(session), Arc::new(pipeline)))
}

fn session(raw: i32) -> SessionId {
    SessionId::new(raw).unwrap()
}

#[test]
fn test_unsupported_visualizer_does_not_break_factory() {
    let probe = probe(
        ReferenceSessionEngine::new(),
        ReferencePipelineEngine::new().without(EffectType::Visualizer),
    );
    let factory = EffectFactory::new(probe, &FactoryConfig::default()).unwrap();

    let caps = factory.capabilities(EffectType::Visualizer).unwrap();
    assert!(!caps.supported);
    assert_eq!(caps.num_bands, 0);

    let err = factory.create(EffectType::Visualizer, session(5)).err().unwrap();
    assert!(err.is_permanent());

    for effect in [EffectType::Equalizer, EffectType::HqEqualizer, EffectType::BassBoost] {
        let mut handle = factory.create(effect, session(5)).unwrap();
        handle.set_enabled(true).unwrap();
        assert!(handle.is_enabled().unwrap());
    }
}

#[test]
fn test_context_release_lifecycle() {
    let engine = ReferencePipelineEngine::new();
    let stats = engine.stats();
    let context = PipelineContext::open(&engine, &ContextParams::default()).unwrap();
    let mut viz = context.create_effect(EffectType::Visualizer).unwrap();

    assert!(matches!(context.release(), Err(EffectError::IllegalState(_))));

    viz.release().unwrap();
    context.release().unwrap();
    context.release().unwrap();
    assert_eq!(stats.live_contexts(), 0);
    assert_eq!(stats.contexts_released(), 1);
}

#[test]
fn test_preset_cleared_by_band_edit_and_restored() {
    let probe = probe(ReferenceSessionEngine::new(), ReferencePipelineEngine::new());
    let factory = EffectFactory::new(probe, &FactoryConfig::default()).unwrap();
    let caps = factory.capabilities(EffectType::Equalizer).unwrap();
    let mut eq = factory.create(EffectType::Equalizer, session(3)).unwrap();

    eq.use_preset(2).unwrap();
    eq.set_band_level(1, -700).unwrap();
    let edited = eq.settings().unwrap();
    assert_eq!(edited.as_equalizer().unwrap().cur_preset(), PresetSelection::Custom);
    assert_eq!(edited.as_equalizer().unwrap().band_level(1), Some(-700));

    eq.use_preset(2).unwrap();
    let restored = eq.settings().unwrap();
    assert_eq!(Some(&restored), caps.preset(2).map(|p| &p.settings));
}

#[test]
fn test_settings_naming_a_preset_take_its_bands() {
    let probe = probe(ReferenceSessionEngine::new(), ReferencePipelineEngine::new());
    let factory = EffectFactory::new(probe, &FactoryConfig::default()).unwrap();
    let caps = factory.capabilities(EffectType::Equalizer).unwrap();
    let mut eq = factory.create(EffectType::Equalizer, session(5)).unwrap();

    let edited = SettingsSnapshot::Equalizer(EqualizerSettings::new(
        PresetSelection::Preset(3),
        vec![700; 5],
    ));
    eq.set_settings(&edited).unwrap();

    let applied = eq.settings().unwrap();
    assert_eq!(applied.as_equalizer().unwrap().cur_preset(), PresetSelection::Preset(3));
    assert_eq!(Some(&applied), caps.preset(3).map(|p| &p.settings));
}

#[test]
fn test_auxiliary_reverb_accepts_any_binding() {
    let probe = probe(ReferenceSessionEngine::new(), ReferencePipelineEngine::new());
    let factory = EffectFactory::new(probe, &FactoryConfig::default()).unwrap();
    let player = factory.create_player().unwrap();

    let reverb = factory.create(EffectType::EnvironmentalReverb, player).unwrap();
    assert_eq!(reverb.backend(), BackendKind::Session);
}

#[test]
fn test_player_from_another_factory_is_incompatible() {
    let first = EffectFactory::new(
        probe(ReferenceSessionEngine::new(), ReferencePipelineEngine::new()),
        &FactoryConfig::default(),
    )
    .unwrap();
    let second = EffectFactory::new(
        probe(ReferenceSessionEngine::new(), ReferencePipelineEngine::new()),
        &FactoryConfig::default(),
    )
    .unwrap();

    let foreign = first.create_player().unwrap();
    assert!(matches!(
        second.create(EffectType::PreAmp, foreign),
        Err(EffectError::IncompatibleBinding { .. })
    ));
    assert!(second.create(EffectType::PreAmp, PlayerHandle::platform(session(4))).is_err());
}

#[test]
fn test_instance_limit_is_transient() {
    let probe = probe(
        ReferenceSessionEngine::new().with_instance_limit(1),
        ReferencePipelineEngine::new(),
    );
    let factory = EffectFactory::new(probe, &FactoryConfig::default()).unwrap();

    let mut first = factory.create(EffectType::BassBoost, session(1)).unwrap();
    let err = factory.create(EffectType::Virtualizer, session(1)).err().unwrap();
    assert!(err.is_transient());

    first.release().unwrap();
    assert!(factory.create(EffectType::Virtualizer, session(1)).is_ok());
}

#[test]
fn test_released_handle_rejects_everything() {
    let probe = probe(ReferenceSessionEngine::new(), ReferencePipelineEngine::new());
    let factory = EffectFactory::new(probe, &FactoryConfig::default()).unwrap();

    for effect in [EffectType::Equalizer, EffectType::HqEqualizer] {
        let mut handle = factory.create(effect, session(2)).unwrap();
        handle.release().unwrap();

        assert!(handle.is_released());
        assert!(matches!(handle.set_enabled(true), Err(EffectError::IllegalState(_))));
        assert!(matches!(handle.settings(), Err(EffectError::IllegalState(_))));
        assert!(matches!(handle.use_preset(0), Err(EffectError::IllegalState(_))));
        assert!(matches!(handle.band_center_frequency(0), Err(EffectError::IllegalState(_))));
        assert!(matches!(handle.release(), Err(EffectError::IllegalState(_))));
    }
}

#[test]
fn test_factory_release_is_idempotent_and_frees_engine() {
    let pipeline = ReferencePipelineEngine::new();
    let session_engine = ReferenceSessionEngine::new();
    let pipeline_stats = pipeline.stats();
    let session_stats = session_engine.stats();
    let mut factory =
        EffectFactory::new(probe(session_engine, pipeline), &FactoryConfig::pipeline_only()).unwrap();

    let handles: Vec<Box<dyn EffectHandle>> = [EffectType::Equalizer, EffectType::PreAmp, EffectType::Visualizer]
        .into_iter()
        .map(|effect| factory.create(effect, session(1)).unwrap())
        .collect();
    assert!(handles.iter().all(|h| h.backend() == BackendKind::Pipeline));

    factory.release();
    factory.release();

    assert_eq!(pipeline_stats.live_effects(), 0);
    assert_eq!(pipeline_stats.live_contexts(), 0);
    assert_eq!(session_stats.effects_created(), 0);
    assert!(handles.iter().all(|h| h.is_enabled().is_err()));
}
