//! Business logic and port trait definitions for cadet.
//!
//! This crate defines the "ports" (flag provider, conversation backend,
//! input source) that the infrastructure layer implements, plus the logic
//! that ties them together. It depends only on `cadet-types` -- never on
//! `cadet-infra` or any HTTP crate.

pub mod chat;
pub mod flags;

#[cfg(test)]
pub(crate) mod testing;
