//! Recovery domain facts
//!
//! Every externally observable event in the protocol is a [`RecoveryFact`].
//! Components record facts through the [`FactSink`] seam after an operation
//! commits; a failed operation records nothing. The production sink emits
//! structured tracing events; tests collect facts in memory through the
//! testkit sink.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vigil_core::{IdentityId, ResourceId};

/// Facts emitted over the lifecycle of a recovery.
///
/// All timestamps are Unix seconds, sampled from the component's time source
/// inside the operation that produced the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryFact {
    /// A recovery was started, nominating a successor
    RecoveryStarted {
        resource: ResourceId,
        successor: IdentityId,
        timestamp: u64,
    },
    /// The owner cancelled the in-progress recovery
    RecoveryCancelled { resource: ResourceId, timestamp: u64 },
    /// A recovery was finalised and ownership transferred
    RecoveryFinalised {
        resource: ResourceId,
        new_owner: IdentityId,
        timestamp: u64,
    },
    /// The resource's bound condition was swapped
    RecoveryConditionUpdated {
        resource: ResourceId,
        condition_kind: String,
        cooldown_secs: u64,
        timestamp: u64,
    },
    /// A guardian flipped the switch condition
    RecoveryTriggered {
        guardian: IdentityId,
        resource: ResourceId,
        timestamp: u64,
    },
    /// The maintainer refreshed the watchdog heartbeat
    HeartbeatUpdated {
        maintainer: IdentityId,
        counter: u64,
        timestamp: u64,
    },
    /// A guardian triggered the watchdog after its timeout lapsed
    WatchdogTriggered {
        guardian: IdentityId,
        resource: ResourceId,
        maintainer: IdentityId,
        elapsed_secs: u64,
        timestamp: u64,
    },
    /// The maintainer changed the watchdog timeout
    TimeoutUpdated { timeout_secs: u64, timestamp: u64 },
}

impl RecoveryFact {
    /// Get the timestamp from any fact variant.
    pub fn timestamp(&self) -> u64 {
        match self {
            RecoveryFact::RecoveryStarted { timestamp, .. }
            | RecoveryFact::RecoveryCancelled { timestamp, .. }
            | RecoveryFact::RecoveryFinalised { timestamp, .. }
            | RecoveryFact::RecoveryConditionUpdated { timestamp, .. }
            | RecoveryFact::RecoveryTriggered { timestamp, .. }
            | RecoveryFact::HeartbeatUpdated { timestamp, .. }
            | RecoveryFact::WatchdogTriggered { timestamp, .. }
            | RecoveryFact::TimeoutUpdated { timestamp, .. } => *timestamp,
        }
    }

    /// Short label for the fact variant.
    pub fn kind(&self) -> &'static str {
        match self {
            RecoveryFact::RecoveryStarted { .. } => "recovery_started",
            RecoveryFact::RecoveryCancelled { .. } => "recovery_cancelled",
            RecoveryFact::RecoveryFinalised { .. } => "recovery_finalised",
            RecoveryFact::RecoveryConditionUpdated { .. } => "recovery_condition_updated",
            RecoveryFact::RecoveryTriggered { .. } => "recovery_triggered",
            RecoveryFact::HeartbeatUpdated { .. } => "heartbeat_updated",
            RecoveryFact::WatchdogTriggered { .. } => "watchdog_triggered",
            RecoveryFact::TimeoutUpdated { .. } => "timeout_updated",
        }
    }
}

/// Destination for recovery facts.
pub trait FactSink: Send + Sync {
    /// Record a committed fact.
    fn record(&self, fact: RecoveryFact);
}

/// Blanket implementation for Arc<T> where T: FactSink
impl<T: FactSink + ?Sized> FactSink for Arc<T> {
    fn record(&self, fact: RecoveryFact) {
        (**self).record(fact);
    }
}

/// Production sink emitting each fact as a structured tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFactSink;

impl TracingFactSink {
    /// Create a new tracing sink
    pub fn new() -> Self {
        Self
    }
}

impl FactSink for TracingFactSink {
    fn record(&self, fact: RecoveryFact) {
        match &fact {
            RecoveryFact::RecoveryStarted {
                resource,
                successor,
                timestamp,
            } => {
                tracing::info!(%resource, %successor, timestamp, "recovery started");
            }
            RecoveryFact::RecoveryCancelled {
                resource,
                timestamp,
            } => {
                tracing::info!(%resource, timestamp, "recovery cancelled");
            }
            RecoveryFact::RecoveryFinalised {
                resource,
                new_owner,
                timestamp,
            } => {
                tracing::info!(%resource, %new_owner, timestamp, "recovery finalised");
            }
            RecoveryFact::RecoveryConditionUpdated {
                resource,
                condition_kind,
                cooldown_secs,
                timestamp,
            } => {
                tracing::info!(
                    %resource,
                    %condition_kind,
                    cooldown_secs,
                    timestamp,
                    "recovery condition updated"
                );
            }
            RecoveryFact::RecoveryTriggered {
                guardian,
                resource,
                timestamp,
            } => {
                tracing::warn!(%guardian, %resource, timestamp, "recovery triggered by guardian");
            }
            RecoveryFact::HeartbeatUpdated {
                maintainer,
                counter,
                timestamp,
            } => {
                tracing::debug!(%maintainer, counter, timestamp, "heartbeat updated");
            }
            RecoveryFact::WatchdogTriggered {
                guardian,
                resource,
                maintainer,
                elapsed_secs,
                timestamp,
            } => {
                tracing::warn!(
                    %guardian,
                    %resource,
                    %maintainer,
                    elapsed_secs,
                    timestamp,
                    "watchdog triggered after heartbeat lapse"
                );
            }
            RecoveryFact::TimeoutUpdated {
                timeout_secs,
                timestamp,
            } => {
                tracing::info!(timeout_secs, timestamp, "watchdog timeout updated");
            }
        }
    }
}
