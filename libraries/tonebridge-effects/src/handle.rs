//! Effect handle abstraction
//!
//! [`EffectHandle`] is the single interface exposed for every effect,
//! whichever engine realizes it. Two variants implement it:
//! [`SessionEffect`](crate::SessionEffect), bound to an audio session on
//! the platform engine, and [`PipelineEffect`](crate::PipelineEffect),
//! bound to the shared pipeline context.

use tonebridge_core::{BackendKind, EffectError, EffectType, Result, SettingsSnapshot};

/// A live effect instance.
///
/// Every operation fails with `IllegalState` once [`EffectHandle::release`]
/// has been called.
pub trait EffectHandle: Send {
    fn effect_type(&self) -> EffectType;

    fn backend(&self) -> BackendKind;

    fn set_enabled(&mut self, enabled: bool) -> Result<()>;

    fn is_enabled(&self) -> Result<bool>;

    fn settings(&self) -> Result<SettingsSnapshot>;

    /// Apply a full snapshot of this handle's effect type.
    fn set_settings(&mut self, settings: &SettingsSnapshot) -> Result<()>;

    /// Select a factory preset, overwriting every band.
    fn use_preset(&mut self, preset: u16) -> Result<()>;

    /// Center frequency of `band` in milli-hertz
    fn band_center_frequency(&self, band: u16) -> Result<u32>;

    fn release(&mut self) -> Result<()>;

    fn is_released(&self) -> bool;

    /// Edit one band level; the selected preset becomes custom.
    fn set_band_level(&mut self, band: u16, level: i16) -> Result<()> {
        let mut settings = self.settings()?;
        let eq = settings.as_equalizer_mut().ok_or_else(|| {
            EffectError::Unsupported(format!("{} has no bands", self.effect_type()))
        })?;
        eq.set_band_level(usize::from(band), level)?;
        self.set_settings(&settings)
    }
}

pub(crate) fn released_error(effect: EffectType) -> EffectError {
    EffectError::IllegalState(format!("{} handle already released", effect))
}

/// Reject snapshots of another effect type.
pub(crate) fn check_settings_type(effect: EffectType, settings: &SettingsSnapshot) -> Result<()> {
    if settings.effect_type() == effect {
        Ok(())
    } else {
        Err(EffectError::IllegalArgument(format!(
            "{} settings passed to a {} handle",
            settings.effect_type(),
            effect
        )))
    }
}
