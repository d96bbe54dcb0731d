//! Message bus — queues and event types connecting the Telegram channel to
//! the relay loop.

pub mod queue;
pub mod types;

pub use queue::MessageBus;
pub use types::{InboundMessage, OutboundMessage};
