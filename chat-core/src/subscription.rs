//! Subscription lifecycle state machine.
//!
//! This module provides a pure, side-effect-free state machine for the
//! channel subscription of the active conversation. The state machine takes
//! events as input and produces a new state plus a list of actions to
//! execute.
//!
//! The actual work (attaching and releasing the channel consumer) is
//! performed by chat-client's session layer, not by this module. This
//! enables instant unit testing without channel mocks.

use chat_types::UserId;

/// Subscription state machine - NO I/O, just state transitions.
///
/// Lifecycle: `Unsubscribed -> Subscribed(peer) -> Unsubscribed`, driven by
/// conversation selection changes and session teardown. A transition always
/// fully releases the previous subscription before establishing a new one,
/// so handlers are never attached twice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    /// No channel consumer attached.
    #[default]
    Unsubscribed,
    /// Consuming events for one conversation.
    Subscribed {
        /// The peer whose conversation is being consumed.
        peer: UserId,
    },
}

impl SubscriptionState {
    /// Create a new state machine in the Unsubscribed state.
    pub fn new() -> Self {
        Self::Unsubscribed
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (the session)
    /// is responsible for executing the returned actions in order.
    pub fn on_event(self, event: SubscriptionEvent) -> (Self, Vec<SubscriptionAction>) {
        match (self, event) {
            (Self::Unsubscribed, SubscriptionEvent::SubscribeRequested { peer }) => (
                Self::Subscribed { peer: peer.clone() },
                vec![SubscriptionAction::Attach { peer }],
            ),

            // Re-subscribing (same or different peer) detaches first; a
            // second set of handlers must never stack on the first.
            (Self::Subscribed { .. }, SubscriptionEvent::SubscribeRequested { peer }) => (
                Self::Subscribed { peer: peer.clone() },
                vec![
                    SubscriptionAction::Detach,
                    SubscriptionAction::Attach { peer },
                ],
            ),

            (Self::Subscribed { .. }, SubscriptionEvent::UnsubscribeRequested)
            | (Self::Subscribed { .. }, SubscriptionEvent::SessionClosed) => {
                (Self::Unsubscribed, vec![SubscriptionAction::Detach])
            }

            // Unsubscribing while not subscribed is a no-op.
            (Self::Unsubscribed, SubscriptionEvent::UnsubscribeRequested)
            | (Self::Unsubscribed, SubscriptionEvent::SessionClosed) => {
                (Self::Unsubscribed, vec![])
            }
        }
    }

    /// Check if currently subscribed.
    pub fn is_subscribed(&self) -> bool {
        matches!(self, Self::Subscribed { .. })
    }

    /// The subscribed peer, if any.
    pub fn peer(&self) -> Option<&UserId> {
        match self {
            Self::Subscribed { peer } => Some(peer),
            Self::Unsubscribed => None,
        }
    }
}

/// Events that drive the subscription lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// The active conversation changed to this peer.
    SubscribeRequested {
        /// The newly selected peer.
        peer: UserId,
    },
    /// The active conversation was closed.
    UnsubscribeRequested,
    /// The whole session is being torn down.
    SessionClosed,
}

/// Actions to be executed by the session layer.
///
/// These are instructions, not side effects. The session interprets them
/// and performs the actual attach/release work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionAction {
    /// Attach a channel consumer for this peer.
    Attach {
        /// The peer to consume events for.
        peer: UserId,
    },
    /// Release the current channel consumer.
    Detach,
}
