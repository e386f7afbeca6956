//! Unified error system for vigil
//!
//! A single error type covers every operation in the workspace. Variants map
//! onto the failure classes of the recovery protocol: authorization, state,
//! timing, policy, and input validation. Every failure is terminal for the
//! call that produced it; callers correct the triggering condition and
//! resubmit the whole operation.

use serde::{Deserialize, Serialize};

/// Unified error type for all vigil operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum VigilError {
    /// Caller identity does not match the required role
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Which role check the caller failed
        message: String,
    },

    /// Operation invoked from a disallowed status
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Which state requirement was violated
        message: String,
    },

    /// A cooldown or timeout window has not elapsed
    #[error("Timing: {message}")]
    Timing {
        /// Which window is still open
        message: String,
    },

    /// The recovery condition refused authorization
    #[error("Condition not met: {message}")]
    ConditionNotMet {
        /// Policy refusal description
        message: String,
    },

    /// Invalid input, such as a nil identity where a real one is required
    #[error("Invalid: {message}")]
    Invalid {
        /// What was wrong with the input
        message: String,
    },
}

impl VigilError {
    /// Create an authorization error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a state-invariant error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a timing error
    pub fn timing(message: impl Into<String>) -> Self {
        Self::Timing {
            message: message.into(),
        }
    }

    /// Create a policy error
    pub fn condition_not_met(message: impl Into<String>) -> Self {
        Self::ConditionNotMet {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// The message carried by any variant
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message }
            | Self::InvalidState { message }
            | Self::Timing { message }
            | Self::ConditionNotMet { message }
            | Self::Invalid { message } => message,
        }
    }
}

/// Result alias used across the vigil workspace
pub type VigilResult<T> = Result<T, VigilError>;
