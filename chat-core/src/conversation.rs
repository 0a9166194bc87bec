//! The active conversation and its reconciliation rules.
//!
//! A conversation is a view over messages filtered by peer; there is no
//! persisted conversation entity. The client holds at most one at a time,
//! and the list is append/remove only - never reordered.

use chat_types::{ChannelEvent, Message, MessageId, UserId};

/// The ordered message list for exactly one peer.
///
/// Reconciliation is pure and synchronous; the I/O layer decides when to
/// call it. Edit and delete application is idempotent by id: applying the
/// same event twice leaves the list identical to applying it once. This
/// matters because the session that performs a mutation also publishes its
/// own notification and may later receive the server's echo of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    peer: UserId,
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation with the given peer.
    pub fn new(peer: UserId) -> Self {
        Self {
            peer,
            messages: Vec::new(),
        }
    }

    /// Create a conversation from a freshly loaded message list.
    pub fn with_messages(peer: UserId, messages: Vec<Message>) -> Self {
        Self { peer, messages }
    }

    /// The peer this conversation is with.
    pub fn peer(&self) -> &UserId {
        &self.peer
    }

    /// The messages, in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages currently held.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when no messages are held.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True when a message with the given id is present.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| &m.id == id)
    }

    /// Replace the whole list (full reload on conversation switch).
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Append a message to the tail (successful local send).
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Apply an inbound channel event. Returns whether the list changed.
    ///
    /// Created events are applied only when the sender is this
    /// conversation's peer; events for other conversations are silently
    /// dropped. Edited and deleted events are applied unconditionally,
    /// matched by id alone - messages outside the active conversation are
    /// simply never found. This asymmetry is inherited from the source
    /// system; see DESIGN.md before changing it.
    pub fn apply_event(&mut self, event: ChannelEvent) -> bool {
        match event {
            ChannelEvent::NewMessage(message) => self.apply_created(message),
            ChannelEvent::EditMessage(message) => {
                let content = message.content.unwrap_or_default();
                self.apply_edited(&message.id, &content)
            }
            ChannelEvent::DeleteMessage(id) => self.apply_deleted(&id),
        }
    }

    /// Apply a created event: append when the sender is our peer.
    pub fn apply_created(&mut self, message: Message) -> bool {
        if message.sender_id != self.peer {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Apply an edited event: set `content` on the matching entry.
    /// Unknown id is a no-op, not an error.
    pub fn apply_edited(&mut self, id: &MessageId, content: &str) -> bool {
        match self.messages.iter_mut().find(|m| &m.id == id) {
            Some(message) => {
                let changed = message.content.as_deref() != Some(content);
                message.content = Some(content.to_string());
                changed
            }
            None => false,
        }
    }

    /// Apply a deleted event: remove the matching entry, keeping the
    /// relative order of everything else. Unknown id is a no-op.
    pub fn apply_deleted(&mut self, id: &MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| &m.id != id);
        self.messages.len() != before
    }
}
