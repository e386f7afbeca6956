//! Guardian-triggered switch condition
//!
//! The simplest trust policy: a single trusted guardian flips a flag, and
//! from then on recovery is authorized. The flag is process-wide state of
//! this condition instance, not scoped per resource — any resource queried
//! after a trigger sees authorization. A deployment guarding several
//! resources should therefore bind one switch per resource. The flag never
//! auto-resets; clearing it means replacing the condition (or swapping the
//! bound resource to a fresh one).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vigil_core::{IdentityId, ResourceId, TimeSource, VigilError, VigilResult};

use crate::condition::RecoveryCondition;
use crate::facts::{FactSink, RecoveryFact};

/// Trust policy where one guardian identity authorizes recovery by direct
/// action.
pub struct GuardianSwitchCondition {
    guardian: IdentityId,
    triggered: AtomicBool,
    clock: Arc<dyn TimeSource>,
    facts: Arc<dyn FactSink>,
}

impl GuardianSwitchCondition {
    /// Create a switch trusting `guardian`.
    pub fn new(
        guardian: IdentityId,
        clock: Arc<dyn TimeSource>,
        facts: Arc<dyn FactSink>,
    ) -> Self {
        Self {
            guardian,
            triggered: AtomicBool::new(false),
            clock,
            facts,
        }
    }

    /// Authorize recovery.
    ///
    /// Guardian only. Idempotent: repeat calls succeed without further
    /// effect. The `resource` argument is recorded for observability and is
    /// not validated against anything — any identity may be passed.
    pub fn trigger(&self, caller: IdentityId, resource: ResourceId) -> VigilResult<()> {
        if caller != self.guardian {
            return Err(VigilError::unauthorized(
                "only the trusted guardian can trigger recovery",
            ));
        }

        self.triggered.store(true, Ordering::SeqCst);

        self.facts.record(RecoveryFact::RecoveryTriggered {
            guardian: self.guardian,
            resource,
            timestamp: self.clock.now_secs(),
        });
        Ok(())
    }

    /// The trusted guardian identity.
    pub fn guardian(&self) -> IdentityId {
        self.guardian
    }

    /// Whether the switch has been flipped.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl RecoveryCondition for GuardianSwitchCondition {
    fn is_authorized(&self, _resource: ResourceId) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    fn kind(&self) -> &'static str {
        "guardian-switch"
    }
}
