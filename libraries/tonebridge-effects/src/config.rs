//! Factory and pipeline-context configuration
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tonebridge_core::{BackendKind, EffectError, EffectType, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FactoryConfig {
    #[serde(default)]
    pub policy: PolicyPreset,

    /// Per-effect backend choice that wins over the preset
    #[serde(default)]
    pub overrides: BTreeMap<EffectType, BackendKind>,

    #[serde(default = "default_context")]
    pub context: ContextParams,
}

/// Parameters of the shared pipeline context
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContextParams {
    /// Effects the context is prepared to host
    #[serde(default = "default_pipeline_effects")]
    pub effects: BTreeSet<EffectType>,

    #[serde(default = "default_stream_type")]
    pub stream_type: i32,

    #[serde(default = "default_short_fade_ms")]
    pub short_fade_ms: u32,

    #[serde(default = "default_long_fade_ms")]
    pub long_fade_ms: u32,

    #[serde(default)]
    pub resampler_quality: ResamplerQuality,

    #[serde(default)]
    pub hq_equalizer_impl: HqEqualizerImpl,

    #[serde(default)]
    pub sink_backend: SinkBackend,

    #[serde(default)]
    pub use_low_latency: bool,

    #[serde(default = "default_use_floating_point")]
    pub use_floating_point: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    /// Platform engine where it can bind to a session, pipeline for the rest
    #[default]
    Hybrid,
    /// Everything on the pipeline
    PipelineOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplerQuality {
    Low,
    #[default]
    Middle,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HqEqualizerImpl {
    #[default]
    BasicPeakingFilter,
    FlatGainResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkBackend {
    #[default]
    Opensl,
    AudioTrack,
}

impl ContextParams {
    /// Minimal context hosting only `effect`, used for capability probes
    pub fn for_probe(effect: EffectType) -> Self {
        Self {
            effects: BTreeSet::from([effect]),
            ..default_context()
        }
    }

    pub fn enables(&self, effect: EffectType) -> bool {
        self.effects.contains(&effect)
    }
}

impl FactoryConfig {
    /// Resolved per-effect backend table
    pub fn backend_policy(&self) -> BackendPolicy {
        let mut policy = match self.policy {
            PolicyPreset::Hybrid => BackendPolicy::hybrid(),
            PolicyPreset::PipelineOnly => BackendPolicy::pipeline_only(),
        };
        for (effect, backend) in &self.overrides {
            policy.set(*effect, Some(*backend));
        }
        policy
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.context.short_fade_ms > self.context.long_fade_ms {
            return Err(EffectError::IllegalArgument(format!(
                "short fade ({} ms) exceeds long fade ({} ms)",
                self.context.short_fade_ms, self.context.long_fade_ms
            )));
        }

        let policy = self.backend_policy();
        for effect in EffectType::ALL {
            if policy.backend_for(effect) == Some(BackendKind::Pipeline)
                && !self.context.enables(effect)
            {
                return Err(EffectError::IllegalArgument(format!(
                    "{} is routed to the pipeline but not enabled in the context",
                    effect
                )));
            }
        }

        Ok(())
    }
}

/// Declarative effect -> backend table. `None` means no backend offers the
/// effect under this policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPolicy {
    table: BTreeMap<EffectType, Option<BackendKind>>,
}

impl BackendPolicy {
    pub fn hybrid() -> Self {
        use BackendKind::{Pipeline, Session};
        Self::from_pairs([
            (EffectType::BassBoost, Some(Session)),
            (EffectType::Equalizer, Some(Session)),
            (EffectType::Virtualizer, Some(Session)),
            (EffectType::LoudnessEnhancer, Some(Session)),
            (EffectType::PresetReverb, Some(Session)),
            (EffectType::EnvironmentalReverb, Some(Session)),
            (EffectType::Visualizer, Some(Pipeline)),
            (EffectType::HqEqualizer, Some(Pipeline)),
            (EffectType::HqVisualizer, Some(Pipeline)),
            (EffectType::PreAmp, Some(Pipeline)),
        ])
    }

    pub fn pipeline_only() -> Self {
        let mut policy = Self::from_pairs(
            EffectType::ALL.map(|effect| (effect, Some(BackendKind::Pipeline))),
        );
        policy.set(EffectType::LoudnessEnhancer, None);
        policy
    }

    fn from_pairs(pairs: impl IntoIterator<Item = (EffectType, Option<BackendKind>)>) -> Self {
        Self {
            table: pairs.into_iter().collect(),
        }
    }

    pub fn set(&mut self, effect: EffectType, backend: Option<BackendKind>) {
        self.table.insert(effect, backend);
    }

    pub fn backend_for(&self, effect: EffectType) -> Option<BackendKind> {
        self.table.get(&effect).copied().flatten()
    }
}

impl Default for BackendPolicy {
    fn default() -> Self {
        Self::hybrid()
    }
}

// Default values
fn default_context() -> ContextParams {
    ContextParams {
        effects: default_pipeline_effects(),
        stream_type: default_stream_type(),
        short_fade_ms: default_short_fade_ms(),
        long_fade_ms: default_long_fade_ms(),
        resampler_quality: ResamplerQuality::default(),
        hq_equalizer_impl: HqEqualizerImpl::default(),
        sink_backend: SinkBackend::default(),
        use_low_latency: false,
        use_floating_point: default_use_floating_point(),
    }
}

fn default_pipeline_effects() -> BTreeSet<EffectType> {
    BTreeSet::from([
        EffectType::Visualizer,
        EffectType::HqEqualizer,
        EffectType::HqVisualizer,
        EffectType::PreAmp,
    ])
}

fn default_stream_type() -> i32 {
    // music stream
    3
}

fn default_short_fade_ms() -> u32 {
    15
}

fn default_long_fade_ms() -> u32 {
    1500
}

fn default_use_floating_point() -> bool {
    true
}

impl Default for ContextParams {
    fn default() -> Self {
        default_context()
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            policy: PolicyPreset::default(),
            overrides: BTreeMap::new(),
            context: default_context(),
        }
    }
}

impl FactoryConfig {
    /// Pipeline-only configuration with every pipeline effect enabled
    pub fn pipeline_only() -> Self {
        let mut context = default_context();
        context.effects = EffectType::ALL
            .into_iter()
            .filter(|effect| *effect != EffectType::LoudnessEnhancer)
            .collect();
        Self {
            policy: PolicyPreset::PipelineOnly,
            overrides: BTreeMap::new(),
            context,
        }
    }
}
