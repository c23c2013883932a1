//! HTTP conversation backend with server-sent-event answer streams.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::{BackendOptions, HttpConversationBackend};
