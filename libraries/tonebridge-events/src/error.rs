use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChannelError>;

/// Notification channel errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// A subscriber posted into the category it is being notified on
    #[error("reentrant post into category {category} during its own delivery")]
    Reentrant { category: i32 },
}
