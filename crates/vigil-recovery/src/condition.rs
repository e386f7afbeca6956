//! Recovery-condition capability
//!
//! A recovery condition answers one question: is recovery currently
//! authorized for a given resource? The protected resource depends only on
//! this trait, never on a concrete policy, so the bound policy can be
//! swapped at runtime without touching the state machine.

use std::sync::Arc;
use vigil_core::ResourceId;

/// Pluggable rule deciding whether ownership transfer is currently
/// authorized.
///
/// Implementations are shared objects with their own lifetimes; mutation of
/// condition-internal state is the condition's exclusive responsibility, and
/// resources only ever read through [`is_authorized`](Self::is_authorized).
pub trait RecoveryCondition: Send + Sync {
    /// Whether recovery is currently authorized for `resource`.
    ///
    /// A pure read of current policy state. Callers must query at the moment
    /// of use; results are never valid to cache.
    fn is_authorized(&self, resource: ResourceId) -> bool;

    /// Short label identifying the policy, recorded when a resource swaps
    /// conditions.
    fn kind(&self) -> &'static str;
}

/// Blanket implementation for Arc<T> where T: RecoveryCondition
impl<T: RecoveryCondition + ?Sized> RecoveryCondition for Arc<T> {
    fn is_authorized(&self, resource: ResourceId) -> bool {
        (**self).is_authorized(resource)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}
