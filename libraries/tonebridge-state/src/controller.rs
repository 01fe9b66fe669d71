//! Store-to-engine controller
//!
//! An [`EffectController`] owns a store and, while an effect instance is
//! alive, the handle realizing it. Every mutation is applied to a copy of
//! the store, pushed to the handle, committed, and then announced on the
//! effect's notify category. A handle that refuses the new settings leaves
//! the store untouched.

use std::sync::Arc;

use tracing::{debug, info};

use tonebridge_core::{MeasurementMode, ReverbParam, ReverbPreset, ScalingMode, WindowType};
use tonebridge_effects::EffectHandle;
use tonebridge_events::{effect_event, notify_category, visualizer_event, Notification, NotificationChannel};

use crate::error::{Result, StateError};
use crate::record::{
    BandRecord, CaptureRecord, EnvironmentalReverbRecord, HqVisualizerRecord, LoudnessEnhancerRecord,
    PreAmpRecord, PresetReverbRecord, StateRecord, StrengthRecord, VisualizerRecord,
};
use crate::store::StateStore;

/// Keeps a store, an optional live handle and observers in step
pub struct EffectController<R: StateRecord> {
    store: StateStore<R>,
    handle: Option<Box<dyn EffectHandle>>,
    channel: Arc<NotificationChannel>,
}

impl<R: StateRecord> EffectController<R> {
    pub fn new(store: StateStore<R>, channel: Arc<NotificationChannel>) -> Self {
        Self {
            store,
            handle: None,
            channel,
        }
    }

    pub fn store(&self) -> &StateStore<R> {
        &self.store
    }

    pub fn into_store(self) -> StateStore<R> {
        self.store
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Bind a live instance and bring it to the stored state. On failure
    /// the handle is dropped, which releases it.
    pub fn attach(&mut self, mut handle: Box<dyn EffectHandle>) -> Result<()> {
        if handle.effect_type() != R::EFFECT {
            return Err(StateError::EffectMismatch {
                expected: R::EFFECT,
                found: handle.effect_type(),
            });
        }

        handle.set_settings(&self.store.settings())?;
        handle.set_enabled(self.store.is_enabled())?;
        info!(effect = %R::EFFECT, backend = %handle.backend(), "Attached effect instance");

        // the previous instance, if any, is released on drop
        self.handle = Some(handle);
        Ok(())
    }

    /// Unbind the live instance without releasing it.
    pub fn detach(&mut self) -> Option<Box<dyn EffectHandle>> {
        let handle = self.handle.take();
        if handle.is_some() {
            debug!(effect = %R::EFFECT, "Detached effect instance");
        }
        handle
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if let Some(handle) = self.handle.as_mut() {
            handle.set_enabled(enabled)?;
        }
        self.store.set_enabled(enabled);
        self.notify(
            Notification::new(notify_category(R::EFFECT), effect_event::ENABLED_STATE_UPDATED)
                .with_arg1(i32::from(enabled)),
        )
    }

    /// Apply `edit` to the store, push the result to the live instance and
    /// post `event` on the effect's notify category.
    ///
    /// The store and handle are already updated when posting fails.
    pub fn update<F>(&mut self, edit: F, event: Notification) -> Result<()>
    where
        F: FnOnce(&mut StateStore<R>) -> Result<()>,
    {
        let mut next = self.store.clone();
        edit(&mut next)?;

        let settings = next.settings();
        if settings != self.store.settings() {
            if let Some(handle) = self.handle.as_mut() {
                handle.set_settings(&settings)?;
            }
        }
        self.store = next;
        self.notify(event)
    }

    fn event(&self, event: i32) -> Notification {
        Notification::new(notify_category(R::EFFECT), event)
    }

    fn notify(&self, notification: Notification) -> Result<()> {
        let delivered = self.channel.post(&notification)?;
        debug!(
            category = notification.category,
            event = notification.event,
            delivered,
            "Effect state change posted"
        );
        Ok(())
    }
}

impl<R: StateRecord> std::fmt::Debug for EffectController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectController")
            .field("effect", &R::EFFECT)
            .field("enabled", &self.store.is_enabled())
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl<R: BandRecord> EffectController<R> {
    pub fn set_band_level(&mut self, band: usize, value: f32) -> Result<()> {
        let event = self
            .event(effect_event::BAND_LEVEL_UPDATED)
            .with_arg1(band as i32)
            .with_arg2_f32(value);
        self.update(|store| store.set_band_level(band, value), event)
    }

    pub fn use_preset(&mut self, id: u16) -> Result<()> {
        let event = self.event(effect_event::PRESET_UPDATED).with_arg1(i32::from(id));
        self.update(|store| store.use_preset(id), event)
    }
}

impl<R: StrengthRecord> EffectController<R> {
    pub fn set_strength(&mut self, value: f32) -> Result<()> {
        let event = self.event(effect_event::STRENGTH_UPDATED).with_arg2_f32(value);
        self.update(|store| store.set_strength(value), event)
    }
}

impl EffectController<LoudnessEnhancerRecord> {
    pub fn set_target_gain(&mut self, value: f32) -> Result<()> {
        let event = self.event(effect_event::TARGET_GAIN_UPDATED).with_arg2_f32(value);
        self.update(|store| store.set_target_gain(value), event)
    }
}

impl EffectController<PreAmpRecord> {
    pub fn set_ui_level(&mut self, ui: f32) -> Result<()> {
        let event = self.event(effect_event::LEVEL_UPDATED).with_arg2_f32(ui);
        self.update(|store| store.set_ui_level(ui), event)
    }
}

impl EffectController<EnvironmentalReverbRecord> {
    pub fn set_param(&mut self, param: ReverbParam, value: f32) -> Result<()> {
        let event = self
            .event(effect_event::PARAMETER_UPDATED)
            .with_arg1(param as i32)
            .with_arg2_f32(value);
        self.update(|store| store.set_param(param, value), event)
    }

    pub fn use_environment(&mut self, index: u16) -> Result<()> {
        let event = self
            .event(effect_event::PARAMETER_UPDATED)
            .with_arg1(effect_event::PARAM_INDEX_ALL);
        self.update(|store| store.use_environment(index), event)
    }
}

impl EffectController<PresetReverbRecord> {
    pub fn set_preset(&mut self, preset: ReverbPreset) -> Result<()> {
        let event = self
            .event(effect_event::PRESET_UPDATED)
            .with_arg1(i32::from(preset.to_raw()));
        self.update(
            |store| {
                store.set_preset(preset);
                Ok(())
            },
            event,
        )
    }
}

impl<R: CaptureRecord> EffectController<R> {
    pub fn set_capture_waveform(&mut self, enabled: bool) -> Result<()> {
        let event = self
            .event(visualizer_event::WAVEFORM_ENABLED_STATE_UPDATED)
            .with_arg1(i32::from(enabled));
        self.update(
            |store| {
                store.set_capture_waveform(enabled);
                Ok(())
            },
            event,
        )
    }

    pub fn set_capture_fft(&mut self, enabled: bool) -> Result<()> {
        let event = self
            .event(visualizer_event::FFT_ENABLED_STATE_UPDATED)
            .with_arg1(i32::from(enabled));
        self.update(
            |store| {
                store.set_capture_fft(enabled);
                Ok(())
            },
            event,
        )
    }
}

impl EffectController<VisualizerRecord> {
    pub fn set_scaling_mode(&mut self, mode: ScalingMode) -> Result<()> {
        let event = self
            .event(visualizer_event::SCALING_MODE_UPDATED)
            .with_arg1(mode.to_raw());
        self.update(
            |store| {
                store.set_scaling_mode(mode);
                Ok(())
            },
            event,
        )
    }

    pub fn set_measurement_mode(&mut self, mode: MeasurementMode) -> Result<()> {
        let event = self
            .event(visualizer_event::MEASUREMENT_MODE_UPDATED)
            .with_arg1(mode.to_raw());
        self.update(
            |store| {
                store.set_measurement_mode(mode);
                Ok(())
            },
            event,
        )
    }
}

impl EffectController<HqVisualizerRecord> {
    pub fn set_window(&mut self, window: WindowType) -> Result<()> {
        let event = self
            .event(visualizer_event::WINDOW_TYPE_UPDATED)
            .with_arg1(window.to_raw());
        self.update(
            |store| {
                store.set_window(window);
                Ok(())
            },
            event,
        )
    }
}
