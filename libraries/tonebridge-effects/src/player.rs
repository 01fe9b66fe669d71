//! Player handles
//!
//! A player is the thing effects attach to. Players started by the factory
//! live inside its pipeline context and carry that context's id; players
//! owned elsewhere (a platform media player, for instance) only expose
//! their audio session.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tonebridge_core::{BackendKind, SessionId};

static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum PlayerBinding {
    Platform,
    Pipeline { context_id: u64 },
}

/// Reference to a running player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerHandle {
    id: u64,
    session: SessionId,
    binding: PlayerBinding,
}

impl PlayerHandle {
    /// Player owned outside the pipeline, identified by its audio session
    pub fn platform(session: SessionId) -> Self {
        Self {
            id: NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed),
            session,
            binding: PlayerBinding::Platform,
        }
    }

    pub(crate) fn pipeline(session: SessionId, context_id: u64) -> Self {
        Self {
            id: NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed),
            session,
            binding: PlayerBinding::Pipeline { context_id },
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Backend the player runs on
    pub fn backend(&self) -> BackendKind {
        match self.binding {
            PlayerBinding::Platform => BackendKind::Session,
            PlayerBinding::Pipeline { .. } => BackendKind::Pipeline,
        }
    }

    /// Pipeline context hosting the player, if any
    pub fn context_id(&self) -> Option<u64> {
        match self.binding {
            PlayerBinding::Platform => None,
            PlayerBinding::Pipeline { context_id } => Some(context_id),
        }
    }
}
