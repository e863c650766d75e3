//! Sink implementations
//!
//! Contains LogSink and ChannelSink.

mod channel;
mod log;

pub use self::channel::{ChannelSink, Delivery};
pub use self::log::LogSink;
