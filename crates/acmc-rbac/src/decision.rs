//! Access decisions
//!
//! The outcome of an adjudicated request. `Deny` is an ordinary result, never
//! an error: errors mean the request could not be adjudicated at all.

use serde::{Deserialize, Serialize};

/// Outcome of a permission check.
///
/// # Examples
///
/// ```
/// use acmc_rbac::Decision;
///
/// assert_eq!(Decision::from_allowed(true), Decision::Permit);
/// assert_eq!(Decision::Deny.as_str(), "Deny");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The requester's role holds the permission
    Permit,
    /// The permission is absent, or the signature failed
    Deny,
}

impl Decision {
    /// Map a policy lookup result to a decision.
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed {
            Self::Permit
        } else {
            Self::Deny
        }
    }

    /// Check if access was granted.
    pub fn is_permit(&self) -> bool {
        matches!(self, Self::Permit)
    }

    /// Wire representation (`"Permit"` or `"Deny"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permit => "Permit",
            Self::Deny => "Deny",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_serde_matches_wire_form() {
        assert_eq!(serde_json::to_string(&Decision::Permit).unwrap(), "\"Permit\"");
        assert_eq!(serde_json::from_str::<Decision>("\"Deny\"").unwrap(), Decision::Deny);
        assert!(serde_json::from_str::<Decision>("\"permit\"").is_err());
    }

    #[test]
    fn test_is_permit() {
        assert!(Decision::Permit.is_permit());
        assert!(!Decision::Deny.is_permit());
    }
}
