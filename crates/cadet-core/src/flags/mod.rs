//! Remote configuration through a feature-flag provider.
//!
//! - `FlagProvider`: trait for concrete flag services
//! - `readiness`: bounded wait for the provider to finish initializing
//! - `ConfigResolver`: typed resolution that always yields a value

pub mod provider;
pub mod readiness;
pub mod resolver;
