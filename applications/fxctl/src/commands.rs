//! Command implementations
//!
//! Every command runs against the in-process reference engines and returns
//! a JSON value or a string for `main` to print.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use tonebridge_core::{CapabilityTable, EffectType};
use tonebridge_effects::reference::{ReferencePipelineEngine, ReferenceSessionEngine};
use tonebridge_effects::{CapabilityProbe, EffectFactory, FactoryConfig};
use tonebridge_state::{
    peek_effect, BassBoostRecord, EnvironmentalReverbRecord, EqualizerRecord, HqEqualizerRecord,
    HqVisualizerRecord, LoudnessEnhancerRecord, PreAmpRecord, PresetReverbRecord, StateRecord,
    StateStore, VirtualizerRecord, VisualizerRecord,
};

use crate::error::{CliError, Result};

/// Run `$func::<Record>(args)` for the record type of `$effect`.
macro_rules! dispatch_record {
    ($effect:expr, $func:ident($($arg:expr),*)) => {
        match $effect {
            EffectType::BassBoost => $func::<BassBoostRecord>($($arg),*),
            EffectType::Equalizer => $func::<EqualizerRecord>($($arg),*),
            EffectType::Virtualizer => $func::<VirtualizerRecord>($($arg),*),
            EffectType::Visualizer => $func::<VisualizerRecord>($($arg),*),
            EffectType::LoudnessEnhancer => $func::<LoudnessEnhancerRecord>($($arg),*),
            EffectType::PresetReverb => $func::<PresetReverbRecord>($($arg),*),
            EffectType::EnvironmentalReverb => $func::<EnvironmentalReverbRecord>($($arg),*),
            EffectType::HqEqualizer => $func::<HqEqualizerRecord>($($arg),*),
            EffectType::HqVisualizer => $func::<HqVisualizerRecord>($($arg),*),
            EffectType::PreAmp => $func::<PreAmpRecord>($($arg),*),
        }
    };
}

/// Factory over fresh reference engines
pub fn reference_factory(config: &FactoryConfig) -> Result<EffectFactory> {
    let probe = Arc::new(CapabilityProbe::new(
        Arc::new(ReferenceSessionEngine::new()),
        Arc::new(ReferencePipelineEngine::new()),
    ));
    Ok(EffectFactory::new(probe, config)?)
}

/// Capability tables of `effect`, or of every effect type
pub fn caps(config: &FactoryConfig, effect: Option<EffectType>) -> Result<Value> {
    let factory = reference_factory(config)?;
    let effects: Vec<EffectType> = match effect {
        Some(effect) => vec![effect],
        None => EffectType::ALL.to_vec(),
    };

    let mut tables = Vec::with_capacity(effects.len());
    for effect in effects {
        let table = factory.capabilities(effect)?;
        debug!(effect = %effect, supported = table.supported, "Probed capabilities");
        tables.push(table);
    }
    info!(count = tables.len(), "Capability dump complete");
    let tables: Vec<&CapabilityTable> = tables.iter().map(Arc::as_ref).collect();
    Ok(serde_json::to_value(tables)?)
}

/// Persisted default state of `effect`, base64-encoded
pub fn defaults(config: &FactoryConfig, effect: EffectType) -> Result<String> {
    let factory = reference_factory(config)?;
    let caps = factory.capabilities(effect)?;
    let bytes = dispatch_record!(effect, default_record(caps))?;
    Ok(STANDARD.encode(bytes))
}

fn default_record<R: StateRecord>(caps: Arc<CapabilityTable>) -> Result<Vec<u8>> {
    Ok(StateStore::<R>::new(caps)?.serialize())
}

/// Decode a base64 persisted record of `effect` into JSON.
pub fn inspect(config: &FactoryConfig, effect: EffectType, encoded: &str) -> Result<Value> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CliError::Input(format!("invalid base64: {}", e)))?;

    let found = peek_effect(&bytes)?;
    if found != effect {
        return Err(CliError::Input(format!(
            "record holds {} state, not {}",
            found, effect
        )));
    }

    let factory = reference_factory(config)?;
    let caps = factory.capabilities(effect)?;
    dispatch_record!(effect, describe_record(&bytes, caps))
}

fn describe_record<R>(bytes: &[u8], caps: Arc<CapabilityTable>) -> Result<Value>
where
    R: StateRecord + Serialize,
{
    let store = StateStore::<R>::deserialize(bytes, caps)?;
    Ok(json!({
        "effect": R::EFFECT,
        "backend": store.capabilities().backend,
        "enabled": store.is_enabled(),
        "record": serde_json::to_value(store.record())?,
        "settings": store.settings().to_string(),
    }))
}
