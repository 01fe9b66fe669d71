//! Effect Controller Tests
//!
//! Drives controllers against the reference engines and checks that every
//! edit lands in the store, the live instance and the notification channel.

use std::sync::{Arc, Mutex};

use tonebridge_core::{EffectError, EffectType, PresetSelection, SessionId};
use tonebridge_effects::reference::{ReferencePipelineEngine, ReferenceSessionEngine};
use tonebridge_effects::{CapabilityProbe, EffectFactory, FactoryConfig};
use tonebridge_events::{category, effect_event, Notification, NotificationChannel, Subscriber};
use tonebridge_state::{
    BassBoostStore, EffectController, EqualizerRecord, EqualizerStore, HqEqualizerStore,
    PreAmpStore, StateError,
};

// ===== Helpers =====

#[derive(Default)]
struct Observer {
    received: Mutex<Vec<Notification>>,
}

impl Observer {
    fn received(&self) -> Vec<Notification> {
        self.received.lock().unwrap().clone()
    }
}

impl Subscriber for Observer {
    fn on_notification(&self, notification: &Notification) {
        self.received.lock().unwrap().push(notification.clone());
    }
}

fn factory() -> EffectFactory {
    let probe = Arc::new(CapabilityProbe::new(
        Arc::new(ReferenceSessionEngine::new()),
        Arc::new(ReferencePipelineEngine::new()),
    ));
    EffectFactory::new(probe, &FactoryConfig::default()).unwrap()
}

fn session() -> SessionId {
    SessionId::new(5).unwrap()
}

/// Channel with `observer` registered on `category` and its suppressed
/// first delivery already consumed
fn primed_channel(observer: &Arc<Observer>, category: i32) -> Arc<NotificationChannel> {
    let channel = Arc::new(NotificationChannel::new());
    channel.register(observer, [category]);
    channel.post(&Notification::new(category, -1)).unwrap();
    channel
}

fn equalizer_controller(
    factory: &EffectFactory,
    channel: Arc<NotificationChannel>,
) -> EffectController<EqualizerRecord> {
    let caps = factory.capabilities(EffectType::Equalizer).unwrap();
    let mut controller = EffectController::new(EqualizerStore::new(caps).unwrap(), channel);
    controller
        .attach(factory.create(EffectType::Equalizer, session()).unwrap())
        .unwrap();
    controller
}

// ===== Tests =====

#[test]
fn test_band_edit_reaches_handle_and_observer() {
    let factory = factory();
    let observer = Arc::new(Observer::default());
    let channel = primed_channel(&observer, category::NOTIFY_EQUALIZER);
    let mut controller = equalizer_controller(&factory, channel);

    controller.set_enabled(true).unwrap();
    controller.set_band_level(0, 0.6).unwrap();

    let received = observer.received();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].event, effect_event::ENABLED_STATE_UPDATED);
    assert_eq!(received[0].arg1, 1);
    assert_eq!(received[1].event, effect_event::BAND_LEVEL_UPDATED);
    assert_eq!(received[1].arg1, 0);
    assert_eq!(received[1].arg2_f32(), 0.6);

    assert_eq!(controller.store().cur_preset(), PresetSelection::Custom);
    let handle = controller.detach().unwrap();
    assert!(handle.is_enabled().unwrap());
    let settings = handle.settings().unwrap();
    let eq = settings.as_equalizer().unwrap();
    assert_eq!(eq.band_level(0), Some(300));
    assert_eq!(eq.cur_preset(), PresetSelection::Custom);
}

#[test]
fn test_preset_selection_overwrites_bands() {
    let factory = factory();
    let observer = Arc::new(Observer::default());
    let channel = primed_channel(&observer, category::NOTIFY_EQUALIZER);
    let mut controller = equalizer_controller(&factory, channel);

    controller.set_band_level(2, 1.0).unwrap();
    controller.use_preset(3).unwrap();

    assert_eq!(controller.store().cur_preset(), PresetSelection::Preset(3));
    assert_eq!(controller.store().record().settings.band_levels(), &[0, 0, 0, 0, 0]);
    let last = observer.received().pop().unwrap();
    assert_eq!(last.event, effect_event::PRESET_UPDATED);
    assert_eq!(last.arg1, 3);

    let handle = controller.detach().unwrap();
    assert_eq!(handle.settings().unwrap(), controller.store().settings());
}

#[test]
fn test_refused_edit_leaves_store_untouched() {
    let mut factory = factory();
    let caps = factory.capabilities(EffectType::HqEqualizer).unwrap();
    let channel = Arc::new(NotificationChannel::new());
    let mut controller = EffectController::new(HqEqualizerStore::new(caps).unwrap(), channel);

    let player = factory.create_player().unwrap();
    controller
        .attach(factory.create(EffectType::HqEqualizer, &player).unwrap())
        .unwrap();
    let before = controller.store().clone();

    // releasing the factory invalidates every pipeline-bound instance
    factory.release();
    let err = controller.set_band_level(4, 0.9).unwrap_err();

    assert!(matches!(err, StateError::Effect(EffectError::IllegalState(_))));
    assert_eq!(controller.store(), &before);
}

#[test]
fn test_attach_checks_effect_type() {
    let factory = factory();
    let caps = factory.capabilities(EffectType::Equalizer).unwrap();
    let mut controller = EffectController::new(
        EqualizerStore::new(caps).unwrap(),
        Arc::new(NotificationChannel::new()),
    );

    let bass = factory.create(EffectType::BassBoost, session()).unwrap();
    assert_eq!(
        controller.attach(bass).unwrap_err(),
        StateError::EffectMismatch {
            expected: EffectType::Equalizer,
            found: EffectType::BassBoost,
        }
    );
    assert!(!controller.is_attached());
}

#[test]
fn test_attach_pushes_stored_state() {
    let factory = factory();
    let caps = factory.capabilities(EffectType::BassBoost).unwrap();
    let mut store = BassBoostStore::new(caps).unwrap();
    store.set_enabled(true);
    store.set_strength(0.75).unwrap();

    let mut controller = EffectController::new(store, Arc::new(NotificationChannel::new()));
    controller
        .attach(factory.create(EffectType::BassBoost, session()).unwrap())
        .unwrap();

    let handle = controller.detach().unwrap();
    assert!(handle.is_enabled().unwrap());
    assert_eq!(handle.settings().unwrap(), controller.store().settings());
}

#[test]
fn test_detached_controller_still_notifies() {
    let factory = factory();
    let observer = Arc::new(Observer::default());
    let channel = primed_channel(&observer, category::NOTIFY_PRE_AMP);
    let caps = factory.capabilities(EffectType::PreAmp).unwrap();
    let mut controller = EffectController::new(PreAmpStore::new(caps).unwrap(), channel);

    controller.set_ui_level(0.5).unwrap();

    assert!((controller.store().level() - 0.1).abs() < 1e-6);
    let received = observer.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].event, effect_event::LEVEL_UPDATED);
    assert_eq!(received[0].arg2_f32(), 0.5);
}
