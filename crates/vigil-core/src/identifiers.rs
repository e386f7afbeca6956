//! Core identifier types used across the vigil workspace
//!
//! Principals (owners, successors, guardians, maintainers) are identified by
//! [`IdentityId`]; protected-resource instances by [`ResourceId`]. Both are
//! opaque uuid newtypes. The nil value stands in for "no identity" where the
//! protocol permits one to be supplied; the protocol itself never treats nil
//! specially except where a mutator explicitly rejects it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier for a principal that can hold or receive ownership, or act as
/// a guardian or maintainer under a recovery condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    /// Create a new random identity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil identity, standing in for "no identity"
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the nil identity
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "identity-{}", self.0)
    }
}

impl FromStr for IdentityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("identity-").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

impl From<Uuid> for IdentityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<IdentityId> for Uuid {
    fn from(id: IdentityId) -> Self {
        id.0
    }
}

/// Identifier for a protected-resource instance
///
/// Conditions receive this as an opaque argument for observability and, in
/// the watchdog policy, to authenticate reset calls from the one resource
/// the watchdog is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub Uuid);

impl ResourceId {
    /// Create a new random resource ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource-{}", self.0)
    }
}

impl FromStr for ResourceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("resource-").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

impl From<Uuid> for ResourceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ResourceId> for Uuid {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_identity_is_detected() {
        assert!(IdentityId::nil().is_nil());
        assert!(!IdentityId::new().is_nil());
    }

    #[test]
    fn display_and_parse_round_trip() {
        let id = IdentityId::new();
        let parsed: IdentityId = id.to_string().parse().expect("display form should parse");
        assert_eq!(parsed, id);

        let resource = ResourceId::new();
        let parsed: ResourceId = resource
            .to_string()
            .parse()
            .expect("display form should parse");
        assert_eq!(parsed, resource);
    }

    #[test]
    fn bare_uuid_strings_parse() {
        let uuid = Uuid::new_v4();
        let id: IdentityId = uuid.to_string().parse().expect("bare uuid should parse");
        assert_eq!(id.uuid(), uuid);
    }
}
