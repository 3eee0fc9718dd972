//! Per-request user identity.
//!
//! Identity arrives on each request as a single header value and lives only
//! for the lifetime of that request. The transport layer builds an
//! [`IdentityContext`] and threads it into every service call — there is no
//! process-global identity slot, so concurrent requests can never observe
//! each other's identity.
//!
//! Some upstream platforms forward an unresolved template placeholder
//! (`{{user_id}}`) instead of a real identity when their substitution step
//! is misconfigured. Such values are normalized to "absent" rather than
//! accepted: fail open to anonymous, never to a wrong user.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque, non-empty string uniquely identifying the requesting user.
///
/// Never persisted beyond the request. Construct via [`UserIdentity::parse`],
/// which rejects empty and placeholder values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(String);

impl UserIdentity {
    /// Parse a raw header value into an identity.
    ///
    /// Returns `None` for values that mean "no identity": empty or
    /// whitespace-only strings, and unresolved `{{...}}` template sentinels.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with("{{") && trimmed.ends_with("}}") {
            tracing::warn!(
                value = %trimmed,
                "identity header is an unresolved template placeholder, treating as anonymous"
            );
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-request identity handle.
///
/// Created once by the identity middleware and passed into every file-storage
/// service operation. `require()` is the single gate every operation goes
/// through before any path resolution or I/O.
#[derive(Debug, Clone, Default)]
pub struct IdentityContext {
    identity: Option<UserIdentity>,
}

impl IdentityContext {
    /// Context with no identity (missing or sentinel header).
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    /// Context for an authenticated user.
    pub fn authenticated(identity: UserIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Build a context from a raw header value, normalizing sentinels to absent.
    pub fn from_header_value(raw: Option<&str>) -> Self {
        Self {
            identity: raw.and_then(UserIdentity::parse),
        }
    }

    /// The active identity, if any.
    pub fn current(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    /// The active identity, or `AuthRequired` if absent.
    pub fn require(&self) -> Result<&UserIdentity> {
        self.identity.as_ref().ok_or_else(|| {
            Error::AuthRequired(
                "no user identity in request context; set the identity header".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_identity() {
        let id = UserIdentity::parse("u-12345").unwrap();
        assert_eq!(id.as_str(), "u-12345");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id = UserIdentity::parse("  alice  ").unwrap();
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(UserIdentity::parse("").is_none());
        assert!(UserIdentity::parse("   ").is_none());
    }

    #[test]
    fn test_parse_rejects_template_sentinel() {
        assert!(UserIdentity::parse("{{user_id}}").is_none());
        assert!(UserIdentity::parse("{{CURRENT_USER_ID}}").is_none());
    }

    #[test]
    fn test_parse_accepts_braces_inside_value() {
        // Only the full {{...}} wrapper is a sentinel.
        assert!(UserIdentity::parse("user{{1}}x").is_some());
    }

    #[test]
    fn test_context_require_present() {
        let ctx = IdentityContext::authenticated(UserIdentity::parse("u1").unwrap());
        assert_eq!(ctx.require().unwrap().as_str(), "u1");
    }

    #[test]
    fn test_context_require_absent() {
        let ctx = IdentityContext::anonymous();
        match ctx.require() {
            Err(Error::AuthRequired(_)) => {}
            other => panic!("expected AuthRequired, got {:?}", other),
        }
    }

    #[test]
    fn test_context_from_header_value() {
        assert!(IdentityContext::from_header_value(None).current().is_none());
        assert!(IdentityContext::from_header_value(Some("{{user_id}}"))
            .current()
            .is_none());
        assert_eq!(
            IdentityContext::from_header_value(Some("bob"))
                .current()
                .unwrap()
                .as_str(),
            "bob"
        );
    }

    #[test]
    fn test_default_is_anonymous() {
        assert!(IdentityContext::default().current().is_none());
    }
}
