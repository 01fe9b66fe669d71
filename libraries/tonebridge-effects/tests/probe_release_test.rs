//! Probe Resource Discipline Tests
//!
//! A probe that fails halfway must still release every transient instance
//! and context it created before returning the error. The engines here are
//! mocks that fail at chosen points and expect exactly one release.

use std::sync::Arc;

use mockall::mock;
use tonebridge_core::{
    BackendKind, BassBoostSettings, EffectError, EffectType, EqualizerSettings, Result,
    SessionId, SettingsSnapshot,
};
use tonebridge_effects::{
    CapabilityProbe, ContextParams, EngineContext, EngineEffect, PipelineEngine, SessionEngine,
};

// ===== Mocks =====

mock! {
    Effect {}

    impl EngineEffect for Effect {
        fn set_enabled(&mut self, enabled: bool) -> Result<()>;
        fn enabled(&self) -> Result<bool>;
        fn settings(&self) -> Result<SettingsSnapshot>;
        fn set_settings(&mut self, settings: &SettingsSnapshot) -> Result<()>;
        fn num_presets(&self) -> Result<u16>;
        fn preset_name(&self, preset: u16) -> Result<String>;
        fn use_preset(&mut self, preset: u16) -> Result<()>;
        fn num_bands(&self) -> Result<u16>;
        fn center_freq(&self, band: u16) -> Result<u32>;
        fn band_level_range(&self) -> Result<(i16, i16)>;
        fn release(&mut self);
    }
}

mock! {
    Session {}

    impl SessionEngine for Session {
        fn create_effect(&self, effect: EffectType, session: SessionId) -> Result<Box<dyn EngineEffect>>;
    }
}

mock! {
    Context {}

    impl EngineContext for Context {
        fn create_effect(&mut self, effect: EffectType) -> Result<Box<dyn EngineEffect>>;
        fn open_player(&mut self) -> Result<SessionId>;
        fn release(&mut self);
    }
}

mock! {
    Pipeline {}

    impl PipelineEngine for Pipeline {
        fn open_context(&self, params: &ContextParams) -> Result<Box<dyn EngineContext>>;
    }
}

// ===== Helpers =====

/// Equalizer whose preset listing fails on the second preset
fn equalizer_failing_mid_probe() -> MockEffect {
    let mut effect = MockEffect::new();
    effect
        .expect_settings()
        .returning(|| Ok(SettingsSnapshot::Equalizer(EqualizerSettings::flat(5))));
    effect.expect_num_presets().returning(|| Ok(4));
    effect.expect_use_preset().returning(|preset| {
        if preset < 1 {
            Ok(())
        } else {
            Err(EffectError::ResourceExhausted("engine busy".into()))
        }
    });
    effect
        .expect_preset_name()
        .returning(|preset| Ok(format!("Preset {}", preset)));
    effect.expect_release().times(1).return_const(());
    effect
}

fn session_engine_yielding(effect: MockEffect) -> MockSession {
    let mut engine = MockSession::new();
    engine
        .expect_create_effect()
        .times(1)
        .return_once(move |_, _| Ok(Box::new(effect) as Box<dyn EngineEffect>));
    engine
}

fn unused_pipeline() -> MockPipeline {
    let mut engine = MockPipeline::new();
    engine.expect_open_context().never();
    engine
}

// ===== Tests =====

#[test]
fn test_session_probe_releases_instance_on_failure() {
    let probe = CapabilityProbe::new(
        Arc::new(session_engine_yielding(equalizer_failing_mid_probe())),
        Arc::new(unused_pipeline()),
    );

    let err = probe
        .capabilities(EffectType::Equalizer, BackendKind::Session)
        .unwrap_err();

    assert!(err.is_transient());
    assert!(!probe.is_cached(EffectType::Equalizer, BackendKind::Session));
}

#[test]
fn test_pipeline_probe_releases_context_when_effect_creation_fails() {
    let mut context = MockContext::new();
    context
        .expect_create_effect()
        .times(1)
        .returning(|_| Err(EffectError::ResourceExhausted("no free slot".into())));
    context.expect_release().times(1).return_const(());

    let mut pipeline = MockPipeline::new();
    pipeline
        .expect_open_context()
        .withf(|params| params.enables(EffectType::PreAmp) && params.effects.len() == 1)
        .times(1)
        .return_once(move |_| Ok(Box::new(context) as Box<dyn EngineContext>));

    let mut session = MockSession::new();
    session.expect_create_effect().never();

    let probe = CapabilityProbe::new(Arc::new(session), Arc::new(pipeline));
    let err = probe
        .capabilities(EffectType::PreAmp, BackendKind::Pipeline)
        .unwrap_err();

    assert!(err.is_transient());
}

#[test]
fn test_pipeline_probe_releases_effect_and_context_on_failure() {
    let mut context = MockContext::new();
    context
        .expect_create_effect()
        .times(1)
        .return_once(|_| Ok(Box::new(equalizer_failing_mid_probe()) as Box<dyn EngineEffect>));
    context.expect_release().times(1).return_const(());

    let mut pipeline = MockPipeline::new();
    pipeline
        .expect_open_context()
        .times(1)
        .return_once(move |_| Ok(Box::new(context) as Box<dyn EngineContext>));

    let probe = CapabilityProbe::new(Arc::new(MockSession::new()), Arc::new(pipeline));
    assert!(probe
        .capabilities(EffectType::HqEqualizer, BackendKind::Pipeline)
        .is_err());
}

#[test]
fn test_unsupported_is_cached_as_empty_table() {
    let mut session = MockSession::new();
    session
        .expect_create_effect()
        .times(1)
        .returning(|_, _| Err(EffectError::Unsupported("not on this device".into())));

    let probe = CapabilityProbe::new(Arc::new(session), Arc::new(unused_pipeline()));

    let first = probe
        .capabilities(EffectType::Virtualizer, BackendKind::Session)
        .unwrap();
    let second = probe
        .capabilities(EffectType::Virtualizer, BackendKind::Session)
        .unwrap();

    assert!(!first.supported);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_successful_probe_reads_full_table() {
    let mut effect = MockEffect::new();
    effect
        .expect_settings()
        .returning(|| Ok(SettingsSnapshot::BassBoost(BassBoostSettings { strength: 250 })));
    effect.expect_num_presets().returning(|| Ok(0));
    effect.expect_num_bands().returning(|| Ok(0));
    effect.expect_release().times(1).return_const(());

    let probe = CapabilityProbe::new(
        Arc::new(session_engine_yielding(effect)),
        Arc::new(unused_pipeline()),
    );
    let caps = probe
        .capabilities(EffectType::BassBoost, BackendKind::Session)
        .unwrap();

    assert!(caps.supported);
    assert!(caps.presets.is_empty());
    assert_eq!(caps.level_range, None);
    assert_eq!(
        caps.default_settings,
        Some(SettingsSnapshot::BassBoost(BassBoostSettings { strength: 250 }))
    );
}
