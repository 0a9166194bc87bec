//! The chat data model: users, messages, and send drafts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MessageId, UserId};

/// A chat participant, as returned by the list-peers operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned user id.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Avatar URL, if the user has set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

/// A single chat message.
///
/// Invariant: a message as originally created has `text` and/or `image`
/// non-empty. `content` is absent until the first edit; once present it is
/// the authoritative display text (see [`Message::display_text`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned message id.
    pub id: MessageId,
    /// The user who sent the message.
    pub sender_id: UserId,
    /// The user the message was sent to.
    pub receiver_id: UserId,
    /// Original text body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image attachment as a data-URI string, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Edited text; supersedes `text` once present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Creation time, assigned by the server. Immutable.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The text to display for this message: the edited `content` when
    /// present, otherwise the original `text`.
    pub fn display_text(&self) -> Option<&str> {
        self.content.as_deref().or(self.text.as_deref())
    }

    /// The other participant, from `me`'s point of view.
    pub fn peer_of(&self, me: &UserId) -> &UserId {
        if &self.sender_id == me {
            &self.receiver_id
        } else {
            &self.sender_id
        }
    }
}

/// Payload for sending a new message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    /// Text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image attachment as a data-URI string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl MessageDraft {
    /// Create a text-only draft.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    /// Create an image-only draft.
    pub fn image(image: impl Into<String>) -> Self {
        Self {
            text: None,
            image: Some(image.into()),
        }
    }

    /// True when the draft has neither non-blank text nor an image.
    /// Empty drafts are rejected before any network call.
    pub fn is_empty(&self) -> bool {
        let has_text = self
            .text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);
        !has_text && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: Option<&str>, content: Option<&str>) -> Message {
        Message {
            id: MessageId::from("m1"),
            sender_id: UserId::from("alice"),
            receiver_id: UserId::from("bob"),
            text: text.map(String::from),
            image: None,
            content: content.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn display_text_prefers_edited_content() {
        let original = message(Some("hello"), None);
        assert_eq!(original.display_text(), Some("hello"));

        let edited = message(Some("hello"), Some("hello, world"));
        assert_eq!(edited.display_text(), Some("hello, world"));
    }

    #[test]
    fn peer_of_picks_the_other_participant() {
        let msg = message(Some("hi"), None);
        assert_eq!(msg.peer_of(&UserId::from("alice")).as_str(), "bob");
        assert_eq!(msg.peer_of(&UserId::from("bob")).as_str(), "alice");
    }

    #[test]
    fn draft_emptiness() {
        assert!(MessageDraft::default().is_empty());
        assert!(MessageDraft::text("").is_empty());
        assert!(MessageDraft::text("   \n\t").is_empty());
        assert!(!MessageDraft::text("hi").is_empty());
        assert!(!MessageDraft::image("data:image/png;base64,AAAA").is_empty());
    }

    #[test]
    fn message_uses_camel_case_wire_names() {
        let msg = message(Some("hi"), None);
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value.get("senderId").is_some());
        assert!(value.get("receiverId").is_some());
        assert!(value.get("createdAt").is_some());
        // Absent optionals are omitted entirely, not serialized as null.
        assert!(value.get("content").is_none());
        assert!(value.get("image").is_none());
    }

    #[test]
    fn message_roundtrips_through_json() {
        let msg = message(Some("hi"), Some("hi!"));
        let json = serde_json::to_string(&msg).unwrap();
        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, msg);
    }
}
