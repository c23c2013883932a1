//! Infrastructure layer for cadet.
//!
//! Contains implementations of the ports defined in `cadet-core`: the
//! DevCycle flag provider and the HTTP conversation backend, plus the
//! config-file loader and environment lookups used at startup.

pub mod config;
pub mod conversation;
pub mod devcycle;
pub mod env;
