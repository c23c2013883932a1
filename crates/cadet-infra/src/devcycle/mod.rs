//! DevCycle feature-flag provider.

pub mod client;
pub mod types;

pub use client::{DevCycleOptions, DevCycleProvider};
