//! Identifier types for duplex-chat.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a message.
///
/// Opaque and server-assigned; clients never parse or construct these from
/// their own data. Stored as the exact string the backend returned.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new random MessageId (mock servers and tests only;
    /// real ids are assigned by the backend).
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// View the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

/// A unique identifier for a user.
///
/// Opaque and server-assigned, like [`MessageId`]. The peer side of a
/// conversation is identified solely by its `UserId`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new random UserId (mock servers and tests only).
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// View the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_preserves_server_string() {
        let id = MessageId::from("6745a1b2c3d4e5f678901234");
        assert_eq!(id.as_str(), "6745a1b2c3d4e5f678901234");
        assert_eq!(id.to_string(), "6745a1b2c3d4e5f678901234");
    }

    #[test]
    fn random_ids_are_unique() {
        assert_ne!(MessageId::random(), MessageId::random());
        assert_ne!(UserId::random(), UserId::random());
    }

    #[test]
    fn id_serializes_as_bare_string() {
        let id = UserId::from("user-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user-1\"");

        let restored: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }
}
