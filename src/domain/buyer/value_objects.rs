use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Buyer Value Objects
// ============================================================================

/// Internal user id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a raw identifier that has the internal id shape
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the ordering party.
///
/// Resolution precedence:
/// - notifications are addressed to the external subject when present,
///   falling back to the internal id
/// - order history lookups try the internal id first, then the external
///   subject, then identity resolution of the external subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerRef {
    pub internal: Option<UserId>,
    pub external: Option<String>,
}

impl BuyerRef {
    pub fn new(internal: Option<UserId>, external: Option<String>) -> Self {
        let external = external
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { internal, external }
    }

    pub fn internal(id: UserId) -> Self {
        Self::new(Some(id), None)
    }

    pub fn external(subject: impl Into<String>) -> Self {
        Self::new(None, Some(subject.into()))
    }

    /// Classify a raw identifier by shape: a UUID is an internal id, anything
    /// else is taken as an external subject
    pub fn parse(raw: &str) -> Self {
        match UserId::parse(raw) {
            Some(id) => Self::internal(id),
            None => Self::external(raw),
        }
    }

    pub fn with_external(self, subject: impl Into<String>) -> Self {
        Self::new(self.internal, Some(subject.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_none() && self.external.is_none()
    }

    /// Key used to address notifications (external preferred)
    pub fn notification_key(&self) -> Option<String> {
        self.external
            .clone()
            .or_else(|| self.internal.map(|id| id.to_string()))
    }
}

impl fmt::Display for BuyerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.internal, &self.external) {
            (Some(id), Some(ext)) => write!(f, "{} ({})", id, ext),
            (Some(id), None) => write!(f, "{}", id),
            (None, Some(ext)) => write!(f, "{}", ext),
            (None, None) => write!(f, "<unknown>"),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_is_internal() {
        let id = UserId::new();
        let buyer = BuyerRef::parse(&id.to_string());
        assert_eq!(buyer.internal, Some(id));
        assert_eq!(buyer.external, None);
    }

    #[test]
    fn test_parse_subject_is_external() {
        let buyer = BuyerRef::parse("auth0|abc123");
        assert_eq!(buyer.internal, None);
        assert_eq!(buyer.external.as_deref(), Some("auth0|abc123"));
    }

    #[test]
    fn test_notification_key_prefers_external() {
        let id = UserId::new();
        let buyer = BuyerRef::new(Some(id), Some("auth0|abc".to_string()));
        assert_eq!(buyer.notification_key().as_deref(), Some("auth0|abc"));

        let buyer = BuyerRef::internal(id);
        assert_eq!(buyer.notification_key(), Some(id.to_string()));

        let buyer = BuyerRef::new(None, None);
        assert_eq!(buyer.notification_key(), None);
    }

    #[test]
    fn test_blank_external_is_dropped() {
        let buyer = BuyerRef::new(None, Some("   ".to_string()));
        assert!(buyer.is_empty());
    }
}
