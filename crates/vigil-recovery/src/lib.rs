//! # Vigil Recovery - Delegated Ownership Recovery
//!
//! This crate implements the guarded ownership-recovery protocol for
//! protected resources.
//!
//! ## Purpose
//!
//! A [`ProtectedResource`] has a single owner. Ownership never transfers
//! directly; it moves through a multi-step recovery protocol that separates
//! three powers held by three principals:
//!
//! - the **owner** may start or cancel a recovery and nominate a successor
//! - a **recovery condition** (pluggable policy) decides whether recovery is
//!   currently authorized
//! - the nominated **successor** alone may finalise, and authorization is
//!   re-queried from the condition at that instant
//!
//! Compromise of any single principal therefore cannot complete a transfer
//! alone: a stolen owner key can start and cancel but never self-authorize;
//! a stolen guardian or maintainer identity can authorize but cannot
//! nominate or receive.
//!
//! ## What Belongs Here
//!
//! - The [`RecoveryCondition`] capability trait
//! - The [`ProtectedResource`] recovery state machine
//! - The two concrete condition policies: [`GuardianSwitchCondition`] and
//!   [`HeartbeatWatchdogCondition`]
//! - Recovery facts and the [`FactSink`] observability seam
//!
//! ## What Does NOT Belong Here
//!
//! - Deployment wiring that instantiates and connects these pieces
//! - Simulated clocks and in-memory sinks (vigil-testkit)
//!
//! ## Design Principles
//!
//! - Every operation is synchronous and atomic: it commits fully or mutates
//!   nothing
//! - Authorization checks come before state checks, which come before timing
//!   and policy checks
//! - Time and authorization are sampled inside the operation that uses them,
//!   never cached from an earlier call
//! - Conditions are shared objects behind `Arc<dyn RecoveryCondition>`;
//!   swapping one is gated by a cooldown so a freshly compromised owner key
//!   cannot immediately disable the safety net

#![allow(missing_docs)]
#![forbid(unsafe_code)]

/// Recovery-condition capability trait
pub mod condition;

/// Recovery domain facts and the fact-sink observability seam
pub mod facts;

/// Guardian-triggered switch condition
pub mod guardian_switch;

/// Protected-resource recovery state machine
pub mod resource;

/// Maintainer-heartbeat watchdog condition
pub mod watchdog;

// Core error and identifier types
pub use vigil_core::{IdentityId, ResourceId, VigilError, VigilResult};

// Re-export the capability seam
pub use condition::RecoveryCondition;

// Re-export facts for sink implementations
pub use facts::{FactSink, RecoveryFact, TracingFactSink};

// Re-export the state machine
pub use resource::{ProtectedResource, RecoveryStatus, ResourceConfig};

// Re-export condition policies
pub use guardian_switch::GuardianSwitchCondition;
pub use watchdog::{HeartbeatWatchdogCondition, ResetOrigin, WatchdogConfig, WatchdogMode};
