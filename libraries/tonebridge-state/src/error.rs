/// State store and persistence errors
use thiserror::Error;
use tonebridge_core::{EffectError, EffectType, SettingsParseError};
use tonebridge_events::ChannelError;

pub type Result<T> = std::result::Result<T, StateError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Record written by an unknown format revision
    #[error("unsupported state format version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown effect tag {0}")]
    UnknownEffectTag(u8),

    /// Record or table belongs to another effect type
    #[error("expected {expected} state, found {found}")]
    EffectMismatch {
        expected: EffectType,
        found: EffectType,
    },

    #[error("record truncated: needed {needed} bytes, {remaining} left")]
    Truncated { needed: usize, remaining: usize },

    #[error("settings string is not valid UTF-8")]
    InvalidUtf8,

    #[error("{0} unexpected bytes after record")]
    TrailingBytes(usize),

    /// Fixed-width field outside its domain
    #[error("invalid value {value} for field '{field}'")]
    InvalidField { field: &'static str, value: i64 },

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Settings(#[from] SettingsParseError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}
