//! Maintainer-heartbeat watchdog condition
//!
//! A liveness-based trust policy. The maintainer proves liveness by
//! periodically updating an opaque counter; each accepted heartbeat restarts
//! the timeout window and clears any pending trigger. Once the window lapses
//! without a heartbeat, the trusted guardian may declare recovery
//! authorized. The triggered state is sticky: authorization, once granted,
//! is never silently revoked by more time passing — only a heartbeat or an
//! explicit reset clears it.
//!
//! ## State
//!
//! ```text
//! Live (triggered = false)  <->  Triggered (triggered = true)
//! ```
//!
//! The `Live -> Triggered` edge is gated by the derived predicate
//! "timeout exceeded": `now - last_heartbeat_at >= timeout_secs`.
//!
//! ## Variants
//!
//! Two reset-authorization behaviors exist in the wild; [`WatchdogMode`]
//! selects between them, defaulting to the defensive one. See the mode
//! documentation for the exact differences.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use vigil_core::{IdentityId, ResourceId, TimeSource, VigilError, VigilResult};

use crate::condition::RecoveryCondition;
use crate::facts::{FactSink, RecoveryFact};

/// Reset and reconfigure authorization variants for the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WatchdogMode {
    /// Defensive reference behavior: only the bound resource may reset, and
    /// every maintainer configuration change clears any pending trigger and
    /// refreshes the liveness clock — a maintainer reconfiguring the
    /// watchdog is itself evidence of liveness.
    #[default]
    ResourceBound,
    /// Compatibility behavior: only the maintainer may reset, and
    /// configuration changes leave trigger and liveness state untouched.
    MaintainerManaged,
}

/// Construction-time parameters for a watchdog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Seconds without a heartbeat before the guardian may trigger
    pub timeout_secs: u64,
    /// Reset/reconfigure authorization variant
    pub mode: WatchdogMode,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 7 * 24 * 60 * 60, // seven days
            mode: WatchdogMode::ResourceBound,
        }
    }
}

/// Origin of a watchdog reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOrigin {
    /// The protected resource the watchdog is bound to, presenting its id
    Resource(ResourceId),
    /// An identity; accepted only from the maintainer in
    /// [`WatchdogMode::MaintainerManaged`]
    Identity(IdentityId),
}

/// Fields that must commit together under one lock acquisition.
#[derive(Debug)]
struct WatchdogState {
    guardian: IdentityId,
    maintainer: IdentityId,
    pulse: u64,
    last_heartbeat_at: u64,
    timeout_secs: u64,
    triggered: bool,
}

impl WatchdogState {
    fn timeout_exceeded(&self, now: u64) -> bool {
        now.saturating_sub(self.last_heartbeat_at) >= self.timeout_secs
    }

    fn require_maintainer(&self, caller: IdentityId) -> VigilResult<()> {
        if caller != self.maintainer {
            return Err(VigilError::unauthorized(
                "only the maintainer can update the watchdog",
            ));
        }
        Ok(())
    }
}

/// Liveness watchdog serving exactly one protected resource.
///
/// The binding to that resource is fixed at construction; it matters only
/// for authorizing [`reset`](Self::reset) calls in the default mode, and for
/// observability elsewhere.
pub struct HeartbeatWatchdogCondition {
    bound_resource: ResourceId,
    mode: WatchdogMode,
    state: Mutex<WatchdogState>,
    clock: Arc<dyn TimeSource>,
    facts: Arc<dyn FactSink>,
}

impl HeartbeatWatchdogCondition {
    /// Create a watchdog bound to `bound_resource`, trusting `guardian` to
    /// trigger and `maintainer` to heartbeat.
    ///
    /// Construction counts as the first liveness proof: the timeout window
    /// starts now.
    pub fn new(
        guardian: IdentityId,
        maintainer: IdentityId,
        bound_resource: ResourceId,
        config: WatchdogConfig,
        clock: Arc<dyn TimeSource>,
        facts: Arc<dyn FactSink>,
    ) -> Self {
        let now = clock.now_secs();
        Self {
            bound_resource,
            mode: config.mode,
            state: Mutex::new(WatchdogState {
                guardian,
                maintainer,
                pulse: 0,
                last_heartbeat_at: now,
                timeout_secs: config.timeout_secs,
                triggered: false,
            }),
            clock,
            facts,
        }
    }

    /// Create with the default configuration.
    pub fn with_defaults(
        guardian: IdentityId,
        maintainer: IdentityId,
        bound_resource: ResourceId,
        clock: Arc<dyn TimeSource>,
        facts: Arc<dyn FactSink>,
    ) -> Self {
        Self::new(
            guardian,
            maintainer,
            bound_resource,
            WatchdogConfig::default(),
            clock,
            facts,
        )
    }

    // =========================================================================
    // LIVENESS
    // =========================================================================

    /// Record a liveness pulse.
    ///
    /// Maintainer only. The counter content is opaque; only the update
    /// matters. A heartbeat unconditionally clears any pending or completed
    /// trigger and restarts the timeout window.
    pub fn heartbeat(&self, caller: IdentityId, counter: u64) -> VigilResult<()> {
        let maintainer;
        let now = self.clock.now_secs();
        {
            let mut state = self.state.lock();
            state.require_maintainer(caller)?;
            state.pulse = counter;
            state.last_heartbeat_at = now;
            state.triggered = false;
            maintainer = state.maintainer;
        }

        self.facts.record(RecoveryFact::HeartbeatUpdated {
            maintainer,
            counter,
            timestamp: now,
        });
        Ok(())
    }

    /// Whether a trigger would currently be accepted: the timeout window has
    /// lapsed and no trigger is pending. Pure predicate.
    pub fn can_trigger(&self) -> bool {
        let state = self.state.lock();
        !state.triggered && state.timeout_exceeded(self.clock.now_secs())
    }

    /// Declare recovery authorized after a heartbeat lapse.
    ///
    /// Guardian only. Fails distinguishably: a pending trigger reports
    /// "already triggered", an open window reports "timeout not exceeded".
    /// The `resource` and `maintainer_ref` arguments are recorded for
    /// observability.
    pub fn trigger(
        &self,
        caller: IdentityId,
        resource: ResourceId,
        maintainer_ref: IdentityId,
    ) -> VigilResult<()> {
        let guardian;
        let elapsed;
        let now = self.clock.now_secs();
        {
            let mut state = self.state.lock();
            if caller != state.guardian {
                return Err(VigilError::unauthorized(
                    "only the trusted guardian can trigger recovery",
                ));
            }
            if state.triggered {
                return Err(VigilError::invalid_state("already triggered"));
            }
            if !state.timeout_exceeded(now) {
                return Err(VigilError::timing("timeout not exceeded"));
            }
            state.triggered = true;
            guardian = state.guardian;
            elapsed = now.saturating_sub(state.last_heartbeat_at);
        }

        self.facts.record(RecoveryFact::WatchdogTriggered {
            guardian,
            resource,
            maintainer: maintainer_ref,
            elapsed_secs: elapsed,
            timestamp: now,
        });
        Ok(())
    }

    /// Clear the triggered state, independent of the timeout window.
    ///
    /// Authorization depends on the configured [`WatchdogMode`]: the default
    /// accepts only the bound resource, the compatibility variant only the
    /// maintainer.
    pub fn reset(&self, origin: ResetOrigin) -> VigilResult<()> {
        let mut state = self.state.lock();
        match (self.mode, origin) {
            (WatchdogMode::ResourceBound, ResetOrigin::Resource(id))
                if id == self.bound_resource => {}
            (WatchdogMode::ResourceBound, _) => {
                return Err(VigilError::unauthorized("only the bound resource can reset"));
            }
            (WatchdogMode::MaintainerManaged, ResetOrigin::Identity(id))
                if id == state.maintainer => {}
            (WatchdogMode::MaintainerManaged, _) => {
                return Err(VigilError::unauthorized("only the maintainer can reset"));
            }
        }
        state.triggered = false;
        Ok(())
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    /// Change the timeout window. Maintainer only.
    pub fn update_timeout(&self, caller: IdentityId, timeout_secs: u64) -> VigilResult<()> {
        let now = self.clock.now_secs();
        {
            let mut state = self.state.lock();
            state.require_maintainer(caller)?;
            state.timeout_secs = timeout_secs;
            self.absorb_reconfigure(&mut state, now);
        }

        self.facts.record(RecoveryFact::TimeoutUpdated {
            timeout_secs,
            timestamp: now,
        });
        Ok(())
    }

    /// Replace the trusted guardian. Maintainer only; nil rejected.
    pub fn update_guardian(&self, caller: IdentityId, new_guardian: IdentityId) -> VigilResult<()> {
        let now = self.clock.now_secs();
        let mut state = self.state.lock();
        state.require_maintainer(caller)?;
        if new_guardian.is_nil() {
            return Err(VigilError::invalid("guardian cannot be the nil identity"));
        }
        state.guardian = new_guardian;
        self.absorb_reconfigure(&mut state, now);
        Ok(())
    }

    /// Hand the maintainer role to a new identity. Maintainer only; nil
    /// rejected.
    pub fn update_maintainer(
        &self,
        caller: IdentityId,
        new_maintainer: IdentityId,
    ) -> VigilResult<()> {
        let now = self.clock.now_secs();
        let mut state = self.state.lock();
        state.require_maintainer(caller)?;
        if new_maintainer.is_nil() {
            return Err(VigilError::invalid("maintainer cannot be the nil identity"));
        }
        state.maintainer = new_maintainer;
        self.absorb_reconfigure(&mut state, now);
        Ok(())
    }

    /// In the defensive mode a maintainer-initiated configuration change is
    /// itself liveness evidence: clear any pending trigger and restart the
    /// timeout window. The compatibility mode leaves both untouched.
    fn absorb_reconfigure(&self, state: &mut WatchdogState, now: u64) {
        if self.mode == WatchdogMode::ResourceBound {
            state.triggered = false;
            state.last_heartbeat_at = now;
        }
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    /// The resource this watchdog serves.
    pub fn bound_resource(&self) -> ResourceId {
        self.bound_resource
    }

    /// The configured reset/reconfigure variant.
    pub fn mode(&self) -> WatchdogMode {
        self.mode
    }

    /// The trusted guardian identity.
    pub fn guardian(&self) -> IdentityId {
        self.state.lock().guardian
    }

    /// The maintainer identity.
    pub fn maintainer(&self) -> IdentityId {
        self.state.lock().maintainer
    }

    /// The current timeout window in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.state.lock().timeout_secs
    }

    /// The last counter value the maintainer supplied.
    pub fn pulse(&self) -> u64 {
        self.state.lock().pulse
    }

    /// Whether a trigger is pending.
    pub fn is_triggered(&self) -> bool {
        self.state.lock().triggered
    }

    /// Whether the timeout window has lapsed.
    pub fn is_timeout_exceeded(&self) -> bool {
        self.state.lock().timeout_exceeded(self.clock.now_secs())
    }

    /// Seconds since the last accepted heartbeat (or construction).
    pub fn time_since_last_heartbeat(&self) -> u64 {
        self.clock
            .now_secs()
            .saturating_sub(self.state.lock().last_heartbeat_at)
    }

    /// Seconds until the guardian could trigger; zero once the window has
    /// lapsed.
    pub fn time_until_triggerable(&self) -> u64 {
        let state = self.state.lock();
        let elapsed = self.clock.now_secs().saturating_sub(state.last_heartbeat_at);
        state.timeout_secs.saturating_sub(elapsed)
    }
}

impl RecoveryCondition for HeartbeatWatchdogCondition {
    fn is_authorized(&self, _resource: ResourceId) -> bool {
        self.state.lock().triggered
    }

    fn kind(&self) -> &'static str {
        "heartbeat-watchdog"
    }
}
