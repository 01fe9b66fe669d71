/// Core error types for Tonebridge
use thiserror::Error;

use crate::types::{BackendKind, EffectType};

/// Result type alias using `EffectError`
pub type Result<T> = std::result::Result<T, EffectError>;

/// Error taxonomy shared by every effect component
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    /// Operation on a released or uninitialized object
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Backend or device lacks the capability for the lifetime of the process
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Backend refused because of concurrent-instance limits
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Normalizer constructed with `min >= max`
    #[error("Invalid range: min {min} must be less than max {max}")]
    InvalidRange { min: i32, max: i32 },

    /// Malformed argument (negative session id, band out of range, ...)
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    /// A pipeline context already hosts a live instance of this effect
    #[error("{0} already exists in this pipeline context")]
    AlreadyExists(EffectType),

    /// Player handle bound to a backend the effect cannot use
    #[error("{effect} requires a {required} binding")]
    IncompatibleBinding {
        effect: EffectType,
        required: BackendKind,
    },

    /// Backend settings string could not be parsed
    #[error(transparent)]
    Settings(#[from] SettingsParseError),
}

impl EffectError {
    /// Whether the caller may retry after releasing other instances.
    pub fn is_transient(&self) -> bool {
        matches!(self, EffectError::ResourceExhausted(_))
    }

    /// Whether the failure holds for the rest of the process lifetime.
    pub fn is_permanent(&self) -> bool {
        matches!(self, EffectError::Unsupported(_))
    }
}

/// Failure modes of the typed settings-string parser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsParseError {
    /// Input was empty or whitespace only
    #[error("empty settings string")]
    Empty,

    /// Leading tag names another effect
    #[error("expected {expected} settings, found '{found}'")]
    WrongTag { expected: &'static str, found: String },

    /// Field present but not the one expected at this position
    #[error("expected key '{expected}', found '{found}'")]
    UnexpectedKey { expected: String, found: String },

    /// Input ended before a required field
    #[error("missing field '{0}'")]
    MissingField(String),

    /// Field value not parseable or outside its legal domain
    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },

    /// Extra fields after the last expected one
    #[error("unexpected trailing field '{0}'")]
    TrailingField(String),
}
