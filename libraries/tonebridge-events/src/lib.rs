//! Tonebridge Events
//!
//! Synchronous publish/subscribe for effect and player state changes.
//!
//! - **Channel**: [`NotificationChannel`] with weakly held subscribers and
//!   category filters
//! - **Payload**: [`Notification`], four integers plus optional string
//!   extras
//! - **Catalogue**: category and event ids shared by posters and observers

#![forbid(unsafe_code)]

pub mod catalog;
pub mod channel;
pub mod error;
pub mod notification;

pub use catalog::{category, control_category, effect_event, notify_category, player_event, visualizer_event};
pub use channel::{NotificationChannel, Subscriber, SubscriptionId};
pub use error::{ChannelError, Result};
pub use notification::{arg_to_f32, f32_to_arg, Notification};
