//! Effect factory
//!
//! Routes every effect type to exactly one backend through the declarative
//! [`BackendPolicy`] table, checks the probed capabilities before touching
//! an engine, and owns the single pipeline context used by pipeline-bound
//! effects.

use std::sync::Arc;

use tonebridge_core::{
    BackendKind, CapabilityTable, EffectError, EffectType, Result, SessionId,
};
use tracing::{debug, info, warn};

use crate::config::{BackendPolicy, FactoryConfig};
use crate::handle::EffectHandle;
use crate::pipeline::PipelineContext;
use crate::player::PlayerHandle;
use crate::probe::CapabilityProbe;
use crate::session::SessionEffect;

/// What an effect is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Session(SessionId),
    Player(PlayerHandle),
}

impl From<SessionId> for Binding {
    fn from(session: SessionId) -> Self {
        Binding::Session(session)
    }
}

impl From<PlayerHandle> for Binding {
    fn from(player: PlayerHandle) -> Self {
        Binding::Player(player)
    }
}

impl From<&PlayerHandle> for Binding {
    fn from(player: &PlayerHandle) -> Self {
        Binding::Player(*player)
    }
}

enum ContextSlot {
    Open(PipelineContext),
    /// The pipeline could not be set up; surfaced when a pipeline-bound
    /// effect or player is requested.
    Unavailable(EffectError),
    Released,
}

/// Creates effect handles on the backend chosen by policy
pub struct EffectFactory {
    probe: Arc<CapabilityProbe>,
    policy: BackendPolicy,
    context: ContextSlot,
}

impl EffectFactory {
    /// Build a factory and open its pipeline context.
    ///
    /// A pipeline that is unsupported on this device does not fail
    /// construction; pipeline-bound requests fail later with `Unsupported`.
    pub fn new(probe: Arc<CapabilityProbe>, config: &FactoryConfig) -> Result<Self> {
        config.validate()?;

        let context = match PipelineContext::open(probe.pipeline_engine(), &config.context) {
            Ok(context) => ContextSlot::Open(context),
            Err(EffectError::Unsupported(reason)) => {
                warn!(reason = %reason, "Pipeline unavailable, pipeline-bound effects disabled");
                ContextSlot::Unavailable(EffectError::Unsupported(reason))
            }
            Err(err) => return Err(err),
        };

        info!(policy = ?config.policy, overrides = config.overrides.len(), "Effect factory created");
        Ok(Self {
            probe,
            policy: config.backend_policy(),
            context,
        })
    }

    /// Backend `effect` is routed to, `None` when no backend offers it
    pub fn backend_for(&self, effect: EffectType) -> Option<BackendKind> {
        self.policy.backend_for(effect)
    }

    /// Capabilities of `effect` on its routed backend.
    ///
    /// Safe to call before any effect exists. Effects with no backend get
    /// an unsupported table.
    pub fn capabilities(&self, effect: EffectType) -> Result<Arc<CapabilityTable>> {
        match self.backend_for(effect) {
            Some(backend) => self.probe.capabilities(effect, backend),
            None => Ok(Arc::new(CapabilityTable::unsupported(effect, BackendKind::Session))),
        }
    }

    /// Start a player inside the pipeline context.
    pub fn create_player(&self) -> Result<PlayerHandle> {
        let context = self.context()?;
        let session = context.open_player()?;
        let player = PlayerHandle::pipeline(session, context.id());
        info!(player = player.id(), session = session.get(), "Created pipeline player");
        Ok(player)
    }

    /// Create `effect` attached to `binding`.
    ///
    /// Session-bound effects take the session of the binding (auxiliary
    /// reverbs always attach to the global mix). Pipeline-bound effects live
    /// in the factory's context; a player from anywhere else is an
    /// `IncompatibleBinding`.
    pub fn create(&self, effect: EffectType, binding: impl Into<Binding>) -> Result<Box<dyn EffectHandle>> {
        let binding = binding.into();
        if self.is_released() {
            return Err(EffectError::IllegalState("effect factory already released".into()));
        }

        let backend = self.backend_for(effect).ok_or_else(|| {
            EffectError::Unsupported(format!("{} has no backend under the current policy", effect))
        })?;
        self.probe.capabilities(effect, backend)?.ensure_supported()?;

        let handle: Box<dyn EffectHandle> = match backend {
            BackendKind::Session => {
                let session = if effect.is_auxiliary() {
                    SessionId::GLOBAL_MIX
                } else {
                    match binding {
                        Binding::Session(session) => session,
                        Binding::Player(player) => player.session(),
                    }
                };
                Box::new(SessionEffect::create(self.probe.session_engine(), effect, session)?)
            }
            BackendKind::Pipeline => {
                let context = self.context()?;
                if let Binding::Player(player) = binding {
                    if player.context_id() != Some(context.id()) {
                        return Err(EffectError::IncompatibleBinding {
                            effect,
                            required: BackendKind::Pipeline,
                        });
                    }
                }
                Box::new(context.create_effect(effect)?)
            }
        };

        debug!(effect = %effect, backend = %backend, binding = ?binding, "Created effect");
        Ok(handle)
    }

    /// Release the pipeline context, invalidating every pipeline-bound
    /// handle created through this factory. Calling it again is a no-op.
    pub fn release(&mut self) {
        match std::mem::replace(&mut self.context, ContextSlot::Released) {
            ContextSlot::Open(context) => {
                context.invalidate_all();
                info!(context = context.id(), "Effect factory released");
            }
            ContextSlot::Unavailable(_) => info!("Effect factory released"),
            ContextSlot::Released => {}
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self.context, ContextSlot::Released)
    }

    fn context(&self) -> Result<&PipelineContext> {
        match &self.context {
            ContextSlot::Open(context) => Ok(context),
            ContextSlot::Unavailable(err) => Err(err.clone()),
            ContextSlot::Released => Err(EffectError::IllegalState(
                "effect factory already released".into(),
            )),
        }
    }
}

impl Drop for EffectFactory {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for EffectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let context = match &self.context {
            ContextSlot::Open(context) => Some(context.id()),
            _ => None,
        };
        f.debug_struct("EffectFactory")
            .field("policy", &self.policy)
            .field("context", &context)
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferencePipelineEngine, ReferenceSessionEngine};

    fn factory_with(session: ReferenceSessionEngine, pipeline: ReferencePipelineEngine) -> EffectFactory {
        let probe = Arc::new(CapabilityProbe::new(Arc::new(session), Arc::new(pipeline)));
        EffectFactory::new(probe, &FactoryConfig::default()).unwrap()
    }

    fn factory() -> EffectFactory {
        factory_with(ReferenceSessionEngine::new(), ReferencePipelineEngine::new())
    }

    fn session(raw: i32) -> SessionId {
        SessionId::new(raw).unwrap()
    }

    #[test]
    fn test_routes_by_policy() {
        let factory = factory();

        let eq = factory.create(EffectType::Equalizer, session(5)).unwrap();
        assert_eq!(eq.backend(), BackendKind::Session);

        let preamp = factory.create(EffectType::PreAmp, session(5)).unwrap();
        assert_eq!(preamp.backend(), BackendKind::Pipeline);
    }

    #[test]
    fn test_session_effects_share_a_session() {
        let factory = factory();
        let mut first = factory.create(EffectType::BassBoost, session(5)).unwrap();
        let second = factory.create(EffectType::BassBoost, session(5)).unwrap();

        first.release().unwrap();
        assert!(second.is_enabled().is_ok());
    }

    #[test]
    fn test_pipeline_player_binds_pipeline_effects() {
        let factory = factory();
        let player = factory.create_player().unwrap();

        let viz = factory.create(EffectType::Visualizer, player).unwrap();
        assert_eq!(viz.backend(), BackendKind::Pipeline);

        // session-bound effects use the player's session
        let boost = factory.create(EffectType::BassBoost, player).unwrap();
        assert_eq!(boost.backend(), BackendKind::Session);
    }

    #[test]
    fn test_platform_player_cannot_bind_pipeline_effect() {
        let factory = factory();
        let player = PlayerHandle::platform(session(9));

        assert_eq!(
            factory.create(EffectType::HqEqualizer, player).err(),
            Some(EffectError::IncompatibleBinding {
                effect: EffectType::HqEqualizer,
                required: BackendKind::Pipeline,
            })
        );
    }

    #[test]
    fn test_unsupported_effect_leaves_factory_usable() {
        let factory = factory_with(
            ReferenceSessionEngine::new(),
            ReferencePipelineEngine::new().without(EffectType::Visualizer),
        );

        let err = factory.create(EffectType::Visualizer, session(5)).err().unwrap();
        assert!(matches!(err, EffectError::Unsupported(_)));

        assert!(factory.create(EffectType::PreAmp, session(5)).is_ok());
        assert!(factory.create(EffectType::Equalizer, session(5)).is_ok());
    }

    #[test]
    fn test_unavailable_pipeline_is_deferred() {
        let factory = factory_with(
            ReferenceSessionEngine::new(),
            ReferencePipelineEngine::new().unavailable(),
        );

        assert!(factory.create(EffectType::Equalizer, session(1)).is_ok());
        assert!(matches!(
            factory.create(EffectType::PreAmp, session(1)),
            Err(EffectError::Unsupported(_))
        ));
        assert!(matches!(factory.create_player(), Err(EffectError::Unsupported(_))));
    }

    #[test]
    fn test_release_invalidates_pipeline_handles() {
        let pipeline = ReferencePipelineEngine::new();
        let stats = pipeline.stats();
        let mut factory = factory_with(ReferenceSessionEngine::new(), pipeline);
        let preamp = factory.create(EffectType::PreAmp, session(1)).unwrap();

        factory.release();
        assert!(factory.is_released());
        assert!(matches!(preamp.is_enabled(), Err(EffectError::IllegalState(_))));
        assert_eq!(stats.live_effects(), 0);
        assert_eq!(stats.live_contexts(), 0);

        factory.release();
        assert!(matches!(
            factory.create(EffectType::Equalizer, session(1)),
            Err(EffectError::IllegalState(_))
        ));
    }

    #[test]
    fn test_capabilities_without_backend() {
        let probe = Arc::new(CapabilityProbe::new(
            Arc::new(ReferenceSessionEngine::new()),
            Arc::new(ReferencePipelineEngine::new()),
        ));
        let factory = EffectFactory::new(probe, &FactoryConfig::pipeline_only()).unwrap();

        let caps = factory.capabilities(EffectType::LoudnessEnhancer).unwrap();
        assert!(!caps.supported);
        assert!(matches!(
            factory.create(EffectType::LoudnessEnhancer, session(1)),
            Err(EffectError::Unsupported(_))
        ));
    }
}
