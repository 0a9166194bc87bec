//! Push-channel events.
//!
//! Three event kinds flow over the sync channel, with deliberately
//! asymmetric payload shapes: created and edited carry the full message
//! record, deleted carries the bare message id.

use serde::{Deserialize, Serialize};

use crate::{Message, MessageId, WireError};

/// An event on the sync channel.
///
/// Encoded as `{"event": "<name>", "data": <payload>}` — for `deleteMessage`
/// the data is the id as a plain JSON string, not a wrapped object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChannelEvent {
    /// A message was created.
    #[serde(rename = "newMessage")]
    NewMessage(Message),
    /// A message's content was edited. Carries the full updated record.
    #[serde(rename = "editMessage")]
    EditMessage(Message),
    /// A message was deleted. Carries only the id.
    #[serde(rename = "deleteMessage")]
    DeleteMessage(MessageId),
}

impl ChannelEvent {
    /// Serialize to JSON bytes for the channel.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON bytes received on the channel.
    ///
    /// This is the validation boundary: malformed frames are rejected here
    /// and never reach the store. Beyond the schema itself, payloads that
    /// violate the data-model invariants are refused.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let event: Self = serde_json::from_slice(bytes).map_err(WireError::Deserialization)?;
        event.validate()?;
        Ok(event)
    }

    /// The message id this event refers to.
    pub fn message_id(&self) -> &MessageId {
        match self {
            Self::NewMessage(m) | Self::EditMessage(m) => &m.id,
            Self::DeleteMessage(id) => id,
        }
    }

    fn validate(&self) -> Result<(), WireError> {
        match self {
            Self::NewMessage(m) => {
                let has_text = m.text.as_deref().map(|t| !t.is_empty()).unwrap_or(false);
                let has_image = m.image.as_deref().map(|i| !i.is_empty()).unwrap_or(false);
                if !has_text && !has_image {
                    return Err(WireError::InvalidPayload(
                        "created event carries neither text nor image".into(),
                    ));
                }
            }
            Self::EditMessage(m) => {
                if m.content.is_none() {
                    return Err(WireError::InvalidPayload(
                        "edited event carries no content".into(),
                    ));
                }
            }
            Self::DeleteMessage(id) => {
                if id.as_str().is_empty() {
                    return Err(WireError::InvalidPayload(
                        "deleted event carries an empty id".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}
