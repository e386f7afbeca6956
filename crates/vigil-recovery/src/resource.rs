//! Protected-resource recovery state machine
//!
//! ## Lifecycle
//!
//! ```text
//! Inactive -> Active -> { Inactive, Cancelled }
//! Cancelled -> Active
//! ```
//!
//! Fully cyclic: a successful finalise returns the machine to `Inactive`, so
//! a resource supports unlimited recovery cycles.
//!
//! ## Key Properties
//!
//! - Only the owner starts or cancels; only the nominated successor
//!   finalises; only the bound condition authorizes
//! - `finalise_recovery` re-queries the condition at the instant of the
//!   call, never from a snapshot taken at start time
//! - Condition swaps are cooldown-gated, and both a swap and a finalise
//!   reset the cooldown clock: a freshly compromised owner key cannot
//!   immediately replace the policy that guards it

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use vigil_core::{IdentityId, ResourceId, TimeSource, VigilError, VigilResult};

use crate::condition::RecoveryCondition;
use crate::facts::{FactSink, RecoveryFact};

/// Lifecycle status of a resource's recovery process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryStatus {
    /// No recovery in progress
    Inactive,
    /// A recovery has been started and may be cancelled or finalised
    Active,
    /// The owner cancelled the in-progress recovery
    Cancelled,
}

impl std::fmt::Display for RecoveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoveryStatus::Inactive => write!(f, "inactive"),
            RecoveryStatus::Active => write!(f, "active"),
            RecoveryStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Construction-time parameters for a protected resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Minimum seconds that must elapse between two sensitive
    /// reconfiguration events (condition swap or finalise, then swap)
    pub cooldown_secs: u64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 24 * 60 * 60, // one day
        }
    }
}

/// An entity whose ownership identity is guarded by the recovery protocol.
///
/// The resource exclusively owns its own fields; the bound condition is a
/// shared object read through [`RecoveryCondition::is_authorized`] only.
pub struct ProtectedResource {
    id: ResourceId,
    owner: IdentityId,
    pending_successor: Option<IdentityId>,
    status: RecoveryStatus,
    cooldown_secs: u64,
    condition: Arc<dyn RecoveryCondition>,
    last_reconfigure_at: u64,
    clock: Arc<dyn TimeSource>,
    facts: Arc<dyn FactSink>,
}

impl ProtectedResource {
    /// Create a resource owned by `owner` and guarded by `condition`.
    ///
    /// The cooldown clock starts at construction time, so the first
    /// condition swap only becomes possible one full cooldown later.
    pub fn new(
        owner: IdentityId,
        condition: Arc<dyn RecoveryCondition>,
        config: ResourceConfig,
        clock: Arc<dyn TimeSource>,
        facts: Arc<dyn FactSink>,
    ) -> Self {
        Self::with_id(ResourceId::new(), owner, condition, config, clock, facts)
    }

    /// Create with a pre-allocated id.
    ///
    /// Deployment wiring allocates the id first when a condition (such as a
    /// resource-bound watchdog) must be constructed against it before the
    /// resource itself exists.
    pub fn with_id(
        id: ResourceId,
        owner: IdentityId,
        condition: Arc<dyn RecoveryCondition>,
        config: ResourceConfig,
        clock: Arc<dyn TimeSource>,
        facts: Arc<dyn FactSink>,
    ) -> Self {
        let now = clock.now_secs();
        Self {
            id,
            owner,
            pending_successor: None,
            status: RecoveryStatus::Inactive,
            cooldown_secs: config.cooldown_secs,
            condition,
            last_reconfigure_at: now,
            clock,
            facts,
        }
    }

    /// Create with the default configuration.
    pub fn with_defaults(
        owner: IdentityId,
        condition: Arc<dyn RecoveryCondition>,
        clock: Arc<dyn TimeSource>,
        facts: Arc<dyn FactSink>,
    ) -> Self {
        Self::new(owner, condition, ResourceConfig::default(), clock, facts)
    }

    // =========================================================================
    // RECOVERY LIFECYCLE
    // =========================================================================

    /// Start a recovery, nominating `successor` as the receiving party.
    ///
    /// Owner only. Allowed from `Inactive` or `Cancelled`. The successor is
    /// accepted as-is: it may equal the current owner or be the nil
    /// identity; nominating a sane successor is the caller's responsibility.
    /// No condition query happens here — authorization is checked only at
    /// finalise time.
    pub fn start_recovery(
        &mut self,
        caller: IdentityId,
        successor: IdentityId,
    ) -> VigilResult<()> {
        if caller != self.owner {
            return Err(VigilError::unauthorized("only the owner can start recovery"));
        }
        if self.status == RecoveryStatus::Active {
            return Err(VigilError::invalid_state("recovery already active"));
        }

        self.pending_successor = Some(successor);
        self.status = RecoveryStatus::Active;

        self.facts.record(RecoveryFact::RecoveryStarted {
            resource: self.id,
            successor,
            timestamp: self.clock.now_secs(),
        });
        Ok(())
    }

    /// Cancel the in-progress recovery.
    ///
    /// Owner only; requires `Active`. The pending successor is left set but
    /// inert until a new `start_recovery` overwrites it.
    pub fn cancel_recovery(&mut self, caller: IdentityId) -> VigilResult<()> {
        if caller != self.owner {
            return Err(VigilError::unauthorized(
                "only the owner can cancel recovery",
            ));
        }
        if self.status != RecoveryStatus::Active {
            return Err(VigilError::invalid_state("no active recovery"));
        }

        self.status = RecoveryStatus::Cancelled;

        self.facts.record(RecoveryFact::RecoveryCancelled {
            resource: self.id,
            timestamp: self.clock.now_secs(),
        });
        Ok(())
    }

    /// Consummate the recovery, transferring ownership to the nominated
    /// successor.
    ///
    /// Only the pending successor may call. The bound condition is
    /// re-queried synchronously at this instant; an authorization observed
    /// at start time is worthless here. On success the machine returns to
    /// `Inactive` and the cooldown clock resets. Returns the new owner.
    pub fn finalise_recovery(&mut self, caller: IdentityId) -> VigilResult<IdentityId> {
        // There is no successor to authorize against outside Active, so the
        // state check necessarily precedes the caller check here.
        if self.status != RecoveryStatus::Active {
            return Err(VigilError::invalid_state("recovery not active"));
        }
        let successor = match self.pending_successor {
            Some(successor) => successor,
            None => return Err(VigilError::invalid_state("recovery not active")),
        };
        if caller != successor {
            return Err(VigilError::unauthorized(
                "only the pending successor can finalise",
            ));
        }
        if !self.condition.is_authorized(self.id) {
            return Err(VigilError::condition_not_met("recovery condition not met"));
        }

        let now = self.clock.now_secs();
        self.owner = successor;
        self.pending_successor = None;
        self.status = RecoveryStatus::Inactive;
        self.last_reconfigure_at = now;

        self.facts.record(RecoveryFact::RecoveryFinalised {
            resource: self.id,
            new_owner: successor,
            timestamp: now,
        });
        Ok(successor)
    }

    /// Swap the bound recovery condition.
    ///
    /// Owner only, and gated by the cooldown: at least `cooldown_secs` must
    /// have elapsed since the last swap or finalise.
    pub fn update_recovery_condition(
        &mut self,
        caller: IdentityId,
        new_condition: Arc<dyn RecoveryCondition>,
    ) -> VigilResult<()> {
        if caller != self.owner {
            return Err(VigilError::unauthorized(
                "only the owner can update the recovery condition",
            ));
        }
        let now = self.clock.now_secs();
        if now.saturating_sub(self.last_reconfigure_at) < self.cooldown_secs {
            return Err(VigilError::timing("cooldown not passed"));
        }

        let condition_kind = new_condition.kind().to_string();
        self.condition = new_condition;
        self.last_reconfigure_at = now;

        self.facts.record(RecoveryFact::RecoveryConditionUpdated {
            resource: self.id,
            condition_kind,
            cooldown_secs: self.cooldown_secs,
            timestamp: now,
        });
        Ok(())
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    /// This resource's identifier.
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Current owner.
    pub fn owner(&self) -> IdentityId {
        self.owner
    }

    /// Nominated successor, if a recovery has been started and not yet
    /// finalised.
    pub fn pending_successor(&self) -> Option<IdentityId> {
        self.pending_successor
    }

    /// Current recovery status.
    pub fn status(&self) -> RecoveryStatus {
        self.status
    }

    /// Configured cooldown between sensitive reconfigurations.
    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    /// Timestamp of the last sensitive event (condition swap or finalise).
    pub fn last_reconfigure_at(&self) -> u64 {
        self.last_reconfigure_at
    }

    /// Seconds until a condition swap becomes possible; zero once the
    /// cooldown has elapsed.
    pub fn cooldown_remaining(&self) -> u64 {
        let elapsed = self.clock.now_secs().saturating_sub(self.last_reconfigure_at);
        self.cooldown_secs.saturating_sub(elapsed)
    }

    /// The currently bound condition.
    pub fn condition(&self) -> Arc<dyn RecoveryCondition> {
        Arc::clone(&self.condition)
    }

    /// Label of the currently bound condition policy.
    pub fn condition_kind(&self) -> &'static str {
        self.condition.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use proptest::prelude::*;

    /// Settable clock local to these tests; integration tests use the
    /// testkit's simulated source instead.
    struct TestClock(Mutex<u64>);

    impl TestClock {
        fn at(start: u64) -> Arc<Self> {
            Arc::new(Self(Mutex::new(start)))
        }

        fn advance(&self, secs: u64) {
            *self.0.lock() += secs;
        }
    }

    impl TimeSource for TestClock {
        fn now_secs(&self) -> u64 {
            *self.0.lock()
        }
    }

    struct TestSink(Mutex<Vec<RecoveryFact>>);

    impl TestSink {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Vec::new())))
        }

        fn facts(&self) -> Vec<RecoveryFact> {
            self.0.lock().clone()
        }
    }

    impl FactSink for TestSink {
        fn record(&self, fact: RecoveryFact) {
            self.0.lock().push(fact);
        }
    }

    struct FixedCondition(bool);

    impl RecoveryCondition for FixedCondition {
        fn is_authorized(&self, _resource: ResourceId) -> bool {
            self.0
        }

        fn kind(&self) -> &'static str {
            "fixed"
        }
    }

    fn resource_with(
        authorized: bool,
        cooldown_secs: u64,
    ) -> (ProtectedResource, IdentityId, Arc<TestClock>, Arc<TestSink>) {
        let owner = IdentityId::new();
        let clock = TestClock::at(1_000);
        let sink = TestSink::new();
        let resource = ProtectedResource::new(
            owner,
            Arc::new(FixedCondition(authorized)),
            ResourceConfig { cooldown_secs },
            clock.clone(),
            sink.clone(),
        );
        (resource, owner, clock, sink)
    }

    #[test]
    fn failed_operations_leave_state_untouched() {
        let (mut resource, owner, _clock, sink) = resource_with(true, 86_400);
        let successor = IdentityId::new();
        let outsider = IdentityId::new();

        assert!(resource.start_recovery(outsider, successor).is_err());
        assert_eq!(resource.status(), RecoveryStatus::Inactive);
        assert_eq!(resource.pending_successor(), None);

        resource
            .start_recovery(owner, successor)
            .expect("owner starts recovery");
        assert!(resource.finalise_recovery(outsider).is_err());
        assert_eq!(resource.status(), RecoveryStatus::Active);
        assert_eq!(resource.owner(), owner);
        assert_eq!(resource.pending_successor(), Some(successor));

        // Only the successful start is on record.
        assert_eq!(sink.facts().len(), 1);
    }

    #[test]
    fn finalise_resets_the_cooldown_clock() {
        let (mut resource, owner, clock, _sink) = resource_with(true, 100);
        let successor = IdentityId::new();

        clock.advance(150);
        resource
            .start_recovery(owner, successor)
            .expect("owner starts recovery");
        resource
            .finalise_recovery(successor)
            .expect("successor finalises");

        // The finalise just consumed the cooldown window.
        let err = resource
            .update_recovery_condition(successor, Arc::new(FixedCondition(false)))
            .expect_err("cooldown should gate the swap");
        assert!(matches!(err, VigilError::Timing { .. }));

        clock.advance(100);
        resource
            .update_recovery_condition(successor, Arc::new(FixedCondition(false)))
            .expect("swap succeeds after cooldown");
    }

    // Model-based sequence test: replay arbitrary operation sequences against
    // a trivial mirror of the specified transitions and compare observable
    // state after every call.
    #[derive(Debug, Clone)]
    enum Op {
        Start { caller: usize, successor: usize },
        Cancel { caller: usize },
        Finalise { caller: usize },
        Swap { caller: usize, advance: u64 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..4usize, 0..4usize).prop_map(|(caller, successor)| Op::Start { caller, successor }),
            (0..4usize).prop_map(|caller| Op::Cancel { caller }),
            (0..4usize).prop_map(|caller| Op::Finalise { caller }),
            (0..4usize, 0..200u64).prop_map(|(caller, advance)| Op::Swap { caller, advance }),
        ]
    }

    proptest! {
        #[test]
        fn sequences_preserve_state_machine_invariants(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let identities: Vec<IdentityId> = (0..4).map(|_| IdentityId::new()).collect();
            let owner = identities[0];
            let clock = TestClock::at(1_000);
            let sink = TestSink::new();
            let cooldown = 100u64;
            let mut resource = ProtectedResource::new(
                owner,
                Arc::new(FixedCondition(true)),
                ResourceConfig { cooldown_secs: cooldown },
                clock.clone(),
                sink.clone(),
            );

            // Mirror of the specified machine.
            let mut m_owner = owner;
            let mut m_pending: Option<IdentityId> = None;
            let mut m_status = RecoveryStatus::Inactive;
            let mut m_last = 1_000u64;

            for op in ops {
                match op {
                    Op::Start { caller, successor } => {
                        let caller = identities[caller];
                        let successor = identities[successor];
                        let ok = resource.start_recovery(caller, successor).is_ok();
                        let expect = caller == m_owner && m_status != RecoveryStatus::Active;
                        prop_assert_eq!(ok, expect);
                        if expect {
                            m_pending = Some(successor);
                            m_status = RecoveryStatus::Active;
                        }
                    }
                    Op::Cancel { caller } => {
                        let caller = identities[caller];
                        let ok = resource.cancel_recovery(caller).is_ok();
                        let expect = caller == m_owner && m_status == RecoveryStatus::Active;
                        prop_assert_eq!(ok, expect);
                        if expect {
                            m_status = RecoveryStatus::Cancelled;
                        }
                    }
                    Op::Finalise { caller } => {
                        let caller = identities[caller];
                        let ok = resource.finalise_recovery(caller).is_ok();
                        let expect = m_status == RecoveryStatus::Active && Some(caller) == m_pending;
                        prop_assert_eq!(ok, expect);
                        if expect {
                            m_owner = caller;
                            m_pending = None;
                            m_status = RecoveryStatus::Inactive;
                            m_last = clock.now_secs();
                        }
                    }
                    Op::Swap { caller, advance } => {
                        clock.advance(advance);
                        let caller = identities[caller];
                        let ok = resource
                            .update_recovery_condition(caller, Arc::new(FixedCondition(true)))
                            .is_ok();
                        let expect = caller == m_owner
                            && clock.now_secs().saturating_sub(m_last) >= cooldown;
                        prop_assert_eq!(ok, expect);
                        if expect {
                            m_last = clock.now_secs();
                        }
                    }
                }

                prop_assert_eq!(resource.owner(), m_owner);
                prop_assert_eq!(resource.status(), m_status);
                prop_assert_eq!(resource.pending_successor(), m_pending);
                prop_assert_eq!(resource.last_reconfigure_at(), m_last);
                if resource.status() == RecoveryStatus::Active {
                    prop_assert!(resource.pending_successor().is_some());
                }
            }
        }
    }
}
