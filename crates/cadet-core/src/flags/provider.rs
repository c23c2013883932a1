//! FlagProvider trait definition.
//!
//! This is the abstraction every remote flag service implements. Uses
//! RPITIT for the async operations, like the other ports in this crate.

use cadet_types::flag::{EvaluationContext, FlagError, FlagKind, FlagValue};

/// Trait for feature-flag backends (DevCycle, static test providers, ...).
///
/// Implementations live in cadet-infra (e.g., `DevCycleProvider`).
pub trait FlagProvider: Send + Sync {
    /// Human-readable provider name (e.g., "devcycle").
    fn name(&self) -> &str;

    /// Whether the provider finished its initialization.
    fn is_ready(&self) -> bool;

    /// Evaluate one flag for the given context.
    ///
    /// `kind` is the type the caller expects; providers may use it to pick an
    /// endpoint but the caller still checks the kind of the returned value.
    fn resolve(
        &self,
        key: &str,
        kind: FlagKind,
        context: &EvaluationContext,
    ) -> impl std::future::Future<Output = Result<FlagValue, FlagError>> + Send;

    /// Stop background work and release connections.
    fn close(&self) -> impl std::future::Future<Output = ()> + Send;
}
