//! Conversation session: binds the channel consumer to the active
//! conversation.

use tokio::task::JoinHandle;

use chat_core::{SubscriptionAction, SubscriptionEvent, SubscriptionState};
use chat_types::{ChannelEvent, UserId};

use crate::api::RemoteApi;
use crate::channel::{ChannelError, SyncChannel};
use crate::store::{MessageStore, StoreError};

/// A held channel subscription.
///
/// This is a scoped capability: dropping it aborts the consumer task, so
/// release is guaranteed on conversation change and session teardown - there
/// is no detach call to forget.
struct Subscription {
    task: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Manages the channel subscription lifecycle as the active conversation
/// changes, and reconciles inbound events into the store.
///
/// Exactly one subscription is live at a time. Transitions are driven
/// through the pure [`SubscriptionState`] machine, and re-subscribing always
/// releases the previous consumer before attaching a new one, so handlers
/// never stack.
///
/// Inbound created events are applied only when their sender is the
/// subscribed peer; edited and deleted events are passed through and
/// matched by id alone. See chat-core for why that asymmetry exists.
pub struct ConversationSession<A, C> {
    store: MessageStore<A, C>,
    state: SubscriptionState,
    subscription: Option<Subscription>,
}

impl<A, C> ConversationSession<A, C>
where
    A: RemoteApi + 'static,
    C: SyncChannel + 'static,
{
    /// Create a session over the given store (and its channel).
    pub fn new(store: MessageStore<A, C>) -> Self {
        Self {
            store,
            state: SubscriptionState::new(),
            subscription: None,
        }
    }

    /// The store this session reconciles into.
    pub fn store(&self) -> &MessageStore<A, C> {
        &self.store
    }

    /// Whether a subscription is currently live.
    pub fn is_subscribed(&self) -> bool {
        self.state.is_subscribed()
    }

    /// The subscribed peer, if any.
    pub fn subscribed_peer(&self) -> Option<&UserId> {
        self.state.peer()
    }

    /// Start consuming events for the conversation with `peer`.
    ///
    /// Idempotent: calling while already subscribed releases the previous
    /// consumer first. Must be called from within a tokio runtime.
    pub fn subscribe(&mut self, peer: &UserId) {
        self.drive(SubscriptionEvent::SubscribeRequested { peer: peer.clone() });
    }

    /// Stop consuming events. No-op when not subscribed; the channel
    /// connection itself stays open.
    pub fn unsubscribe(&mut self) {
        self.drive(SubscriptionEvent::UnsubscribeRequested);
    }

    /// Tear the session down, releasing any subscription.
    pub fn close(&mut self) {
        self.drive(SubscriptionEvent::SessionClosed);
    }

    /// Switch the active conversation: select, re-subscribe, reload.
    ///
    /// Once this returns, a still-in-flight load for the previous
    /// conversation can no longer commit (see
    /// [`MessageStore::load_messages`]).
    pub async fn switch_to(&mut self, peer: &UserId) -> Result<(), StoreError> {
        self.store.select_conversation(peer).await;
        self.subscribe(peer);
        self.store.load_messages(peer).await
    }

    fn drive(&mut self, event: SubscriptionEvent) {
        let (next, actions) = self.state.clone().on_event(event);
        self.state = next;
        for action in actions {
            match action {
                SubscriptionAction::Detach => {
                    self.subscription = None;
                }
                SubscriptionAction::Attach { peer } => {
                    self.subscription = Some(self.spawn_consumer(peer));
                }
            }
        }
    }

    fn spawn_consumer(&self, peer: UserId) -> Subscription {
        let store = self.store.clone();
        let channel = self.store.channel();
        let task = tokio::spawn(async move {
            loop {
                match channel.recv().await {
                    Ok(frame) => match ChannelEvent::from_bytes(&frame) {
                        // Created events are filtered to the subscribed
                        // conversation; everything else in the background
                        // stays invisible (no unread tracking).
                        Ok(ChannelEvent::NewMessage(message)) if message.sender_id != peer => {
                            tracing::debug!(
                                "ignoring created event from {} while subscribed to {}",
                                message.sender_id,
                                peer
                            );
                        }
                        Ok(event) => {
                            store.apply_event(event).await;
                        }
                        Err(e) => {
                            tracing::warn!("dropping malformed channel frame: {e}");
                        }
                    },
                    Err(ChannelError::ConnectionClosed) => {
                        tracing::debug!("sync channel closed, consumer exiting");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!("sync channel receive failed: {e}");
                        break;
                    }
                }
            }
        });
        Subscription { task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockRemoteApi;
    use crate::channel::MockChannel;
    use chat_types::{Message, MessageDraft, MessageId};
    use chrono::Utc;
    use std::time::Duration;

    fn message(id: &str, sender: &str, receiver: &str, text: &str) -> Message {
        Message {
            id: MessageId::from(id),
            sender_id: UserId::from(sender),
            receiver_id: UserId::from(receiver),
            text: Some(text.to_string()),
            image: None,
            content: None,
            created_at: Utc::now(),
        }
    }

    fn created_frame(msg: Message) -> Vec<u8> {
        ChannelEvent::NewMessage(msg).to_bytes().unwrap()
    }

    async fn session() -> (
        ConversationSession<MockRemoteApi, MockChannel>,
        MockRemoteApi,
        MockChannel,
    ) {
        let api = MockRemoteApi::new(UserId::from("me"));
        let channel = MockChannel::new();
        channel.connect("ws://test").await.unwrap();
        let store = MessageStore::new(api.clone(), channel.clone());
        (ConversationSession::new(store), api, channel)
    }

    /// Poll the store until the message snapshot satisfies the predicate.
    async fn wait_for<F>(store: &MessageStore<MockRemoteApi, MockChannel>, mut pred: F)
    where
        F: FnMut(&[Message]) -> bool,
    {
        for _ in 0..500 {
            let messages = store.messages().await;
            if pred(&messages) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("store never reached the expected state");
    }

    /// Give the consumer task time to (not) act.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn created_events_from_the_peer_are_applied() {
        let (mut session, _, channel) = session().await;
        let bob = UserId::from("bob");
        session.switch_to(&bob).await.unwrap();

        channel.queue_frame(created_frame(message("m1", "bob", "me", "hi")));

        wait_for(session.store(), |m| m.len() == 1).await;
        assert_eq!(
            session.store().messages().await[0].display_text(),
            Some("hi")
        );
    }

    #[tokio::test]
    async fn created_events_from_other_peers_are_dropped() {
        // Subscribed to B; events from C, D and E are dropped, then one
        // from B is appended.
        let (mut session, _, channel) = session().await;
        let b = UserId::from("B");
        session.switch_to(&b).await.unwrap();

        channel.queue_frame(created_frame(message("m1", "C", "me", "spam")));
        channel.queue_frame(created_frame(message("m2", "D", "me", "noise")));
        channel.queue_frame(created_frame(message("m3", "E", "me", "cross-talk")));
        channel.queue_frame(created_frame(message("m4", "B", "me", "hi")));

        // The queue is ordered, so once B's event has landed the earlier
        // two have already been processed (and dropped).
        wait_for(session.store(), |m| m.len() == 1).await;
        let messages = session.store().messages().await;
        assert_eq!(messages[0].sender_id, UserId::from("B"));
        assert_eq!(messages[0].display_text(), Some("hi"));
    }

    #[tokio::test]
    async fn edited_and_deleted_events_apply_by_id_regardless_of_sender() {
        let (mut session, api, channel) = session().await;
        let bob = UserId::from("bob");
        // A message we sent ourselves - sender is "me", not the peer.
        api.seed_conversation(&bob, vec![message("m1", "me", "bob", "mine")]);
        session.switch_to(&bob).await.unwrap();

        let mut edited = message("m1", "me", "bob", "mine");
        edited.content = Some("mine, edited".into());
        channel.queue_frame(ChannelEvent::EditMessage(edited).to_bytes().unwrap());

        wait_for(session.store(), |m| {
            m.first().and_then(|m| m.display_text()) == Some("mine, edited")
        })
        .await;

        channel.queue_frame(
            ChannelEvent::DeleteMessage(MessageId::from("m1"))
                .to_bytes()
                .unwrap(),
        );
        wait_for(session.store(), |m| m.is_empty()).await;
    }

    #[tokio::test]
    async fn unsubscribe_stops_application_but_keeps_the_connection() {
        let (mut session, _, channel) = session().await;
        let bob = UserId::from("bob");
        session.switch_to(&bob).await.unwrap();

        channel.queue_frame(created_frame(message("m1", "bob", "me", "first")));
        wait_for(session.store(), |m| m.len() == 1).await;

        session.unsubscribe();
        assert!(!session.is_subscribed());

        channel.queue_frame(created_frame(message("m2", "bob", "me", "second")));
        settle().await;

        assert_eq!(session.store().messages().await.len(), 1);
        // The channel connection itself is still open.
        assert!(channel.is_connected());
    }

    #[tokio::test]
    async fn double_subscribe_does_not_duplicate_application() {
        let (mut session, _, channel) = session().await;
        let bob = UserId::from("bob");
        session.switch_to(&bob).await.unwrap();
        session.subscribe(&bob);
        session.subscribe(&bob);

        channel.queue_frame(created_frame(message("m1", "bob", "me", "once")));

        wait_for(session.store(), |m| m.len() == 1).await;
        settle().await;
        assert_eq!(session.store().messages().await.len(), 1);
    }

    #[tokio::test]
    async fn malformed_frames_are_dropped_and_the_consumer_survives() {
        let (mut session, _, channel) = session().await;
        let bob = UserId::from("bob");
        session.switch_to(&bob).await.unwrap();

        channel.queue_frame(b"not json at all".to_vec());
        channel.queue_frame(br#"{"event":"newMessage","data":{"bogus":true}}"#.to_vec());
        channel.queue_frame(created_frame(message("m1", "bob", "me", "valid")));

        wait_for(session.store(), |m| m.len() == 1).await;
        assert_eq!(
            session.store().messages().await[0].display_text(),
            Some("valid")
        );
    }

    #[tokio::test]
    async fn switching_rebinds_the_subscription_to_the_new_peer() {
        let (mut session, api, channel) = session().await;
        let a = UserId::from("a");
        let b = UserId::from("b");
        api.seed_conversation(&a, vec![]);
        api.seed_conversation(&b, vec![]);

        session.switch_to(&a).await.unwrap();
        assert_eq!(session.subscribed_peer(), Some(&a));

        // While on a, an event from b is dropped.
        channel.queue_frame(created_frame(message("m1", "b", "me", "early")));
        settle().await;
        assert!(session.store().messages().await.is_empty());

        session.switch_to(&b).await.unwrap();
        assert_eq!(session.subscribed_peer(), Some(&b));

        channel.queue_frame(created_frame(message("m2", "b", "me", "now")));
        wait_for(session.store(), |m| m.len() == 1).await;
        assert_eq!(session.store().messages().await[0].id, MessageId::from("m2"));
    }

    #[tokio::test]
    async fn close_releases_the_subscription() {
        let (mut session, _, channel) = session().await;
        let bob = UserId::from("bob");
        session.switch_to(&bob).await.unwrap();
        assert!(session.is_subscribed());

        session.close();
        assert!(!session.is_subscribed());

        channel.queue_frame(created_frame(message("m1", "bob", "me", "late")));
        settle().await;
        assert!(session.store().messages().await.is_empty());
    }

    #[tokio::test]
    async fn own_edit_echo_is_idempotent_end_to_end() {
        // This session edits a message (which publishes an event); the
        // server echoes the same event back to us. Applying the echo must
        // leave state identical.
        let (mut session, api, channel) = session().await;
        let bob = UserId::from("bob");
        api.seed_conversation(&bob, vec![message("m1", "bob", "me", "hi")]);
        session.switch_to(&bob).await.unwrap();

        session
            .store()
            .edit_message(&MessageId::from("m1"), "hi, edited")
            .await
            .unwrap();

        // Feed our own published frame back in, as a broadcasting server
        // would.
        let echo = channel.last_sent().unwrap();
        channel.queue_frame(echo);
        settle().await;

        let messages = session.store().messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].display_text(), Some("hi, edited"));
    }

    #[tokio::test]
    async fn send_then_inbound_events_keep_insertion_order() {
        let (mut session, api, channel) = session().await;
        let bob = UserId::from("bob");
        api.seed_conversation(&bob, vec![]);
        session.switch_to(&bob).await.unwrap();

        session
            .store()
            .send_message(&MessageDraft::text("from me"))
            .await
            .unwrap();
        channel.queue_frame(created_frame(message("m2", "bob", "me", "reply")));

        wait_for(session.store(), |m| m.len() == 2).await;
        let messages = session.store().messages().await;
        assert_eq!(messages[0].display_text(), Some("from me"));
        assert_eq!(messages[1].display_text(), Some("reply"));
    }
}
