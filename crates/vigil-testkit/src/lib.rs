//! # Vigil Testkit
//!
//! Test instrumentation for the vigil recovery protocol: a simulated time
//! source, an in-memory fact sink, a static recovery condition, and
//! deterministic identity fixtures. Dev-dependency only; nothing here
//! belongs in production wiring.

#![allow(missing_docs)]
#![forbid(unsafe_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use vigil_core::{IdentityId, ResourceId, TimeSource};
use vigil_recovery::{FactSink, RecoveryCondition, RecoveryFact};

/// Simulated time source for timing tests.
///
/// Starts at a chosen instant and only moves when told to, so cooldown and
/// timeout windows can be crossed exactly.
#[derive(Debug, Clone)]
pub struct SimulatedTimeSource {
    current: Arc<Mutex<u64>>,
}

impl SimulatedTimeSource {
    /// Create a simulated source starting at `start_secs`.
    pub fn new(start_secs: u64) -> Self {
        Self {
            current: Arc::new(Mutex::new(start_secs)),
        }
    }

    /// Create a simulated source starting at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(0)
    }

    /// Advance simulated time by `secs`.
    pub fn advance(&self, secs: u64) {
        *self.current.lock() += secs;
    }

    /// Set the absolute simulated time.
    pub fn set(&self, secs: u64) {
        *self.current.lock() = secs;
    }
}

impl Default for SimulatedTimeSource {
    fn default() -> Self {
        Self::at_epoch()
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now_secs(&self) -> u64 {
        *self.current.lock()
    }
}

/// Fact sink collecting everything in memory for assertions.
#[derive(Debug, Clone, Default)]
pub struct MemoryFactSink {
    facts: Arc<Mutex<Vec<RecoveryFact>>>,
}

impl MemoryFactSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All facts recorded so far, oldest first.
    pub fn facts(&self) -> Vec<RecoveryFact> {
        self.facts.lock().clone()
    }

    /// The most recently recorded fact.
    pub fn last(&self) -> Option<RecoveryFact> {
        self.facts.lock().last().cloned()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<RecoveryFact> {
        std::mem::take(&mut *self.facts.lock())
    }

    /// Number of facts recorded so far.
    pub fn len(&self) -> usize {
        self.facts.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.facts.lock().is_empty()
    }
}

impl FactSink for MemoryFactSink {
    fn record(&self, fact: RecoveryFact) {
        self.facts.lock().push(fact);
    }
}

/// Recovery condition answering a configured boolean, flippable at runtime.
///
/// Stands in for an arbitrary policy when a test only cares about the
/// answer, not how a real policy arrives at it.
#[derive(Debug, Default)]
pub struct StaticCondition {
    authorized: Mutex<bool>,
}

impl StaticCondition {
    /// Create a condition that answers `authorized`.
    pub fn new(authorized: bool) -> Self {
        Self {
            authorized: Mutex::new(authorized),
        }
    }

    /// Change the configured answer.
    pub fn set_authorized(&self, authorized: bool) {
        *self.authorized.lock() = authorized;
    }
}

impl RecoveryCondition for StaticCondition {
    fn is_authorized(&self, _resource: ResourceId) -> bool {
        *self.authorized.lock()
    }

    fn kind(&self) -> &'static str {
        "static"
    }
}

/// Deterministic identity derived from a label, stable across runs.
pub fn named_identity(label: &str) -> IdentityId {
    IdentityId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, label.as_bytes()))
}

/// Deterministic resource id derived from a label, stable across runs.
pub fn named_resource(label: &str) -> ResourceId {
    ResourceId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, label.as_bytes()))
}
