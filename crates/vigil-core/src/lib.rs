//! # Vigil Core
//!
//! Foundation types for the vigil ownership-recovery protocol.
//!
//! ## Purpose
//!
//! This crate provides the building blocks shared by every other vigil crate:
//! - Identifier types for principals and protected resources
//! - The time-source capability used by all timing decisions
//! - The unified error type and result alias
//!
//! ## What Does NOT Belong Here
//!
//! - The recovery state machine and condition policies (vigil-recovery)
//! - Test doubles and simulated clocks (vigil-testkit)

#![allow(missing_docs)]
#![forbid(unsafe_code)]

pub mod errors;
pub mod identifiers;
pub mod time;

pub use errors::{VigilError, VigilResult};
pub use identifiers::{IdentityId, ResourceId};
pub use time::{SystemTimeSource, TimeSource};
