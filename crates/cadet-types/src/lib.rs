//! Shared domain types for cadet.
//!
//! This crate contains the data shapes exchanged between the flag resolver,
//! the conversation backend and the chat loop: evaluation contexts, flag
//! values, conversation sessions, streamed answer fragments, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod flag;
