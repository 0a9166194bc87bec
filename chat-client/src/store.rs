//! The message store: state for the one active conversation.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use chat_core::Conversation;
use chat_types::{ChannelEvent, Message, MessageDraft, MessageId, User, UserId, WireError};

use crate::api::{ApiError, RemoteApi};
use crate::channel::{ChannelError, SyncChannel};

/// Store errors.
///
/// All of these are local and recoverable; the store remains usable after
/// any single failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The draft has neither non-blank text nor an image. Rejected before
    /// any network call; no state change.
    #[error("message is empty")]
    EmptyDraft,

    /// No conversation is selected.
    #[error("no conversation selected")]
    NoActiveConversation,

    /// RemoteAPI failure. Store state is exactly as before the call.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Channel failure while publishing a notification.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Wire encoding failure.
    #[error(transparent)]
    Wire(#[from] WireError),
}

#[derive(Debug)]
struct StoreState {
    users: Vec<User>,
    selected_peer: Option<UserId>,
    conversation: Option<Conversation>,
    users_loading: bool,
    messages_loading: bool,
}

/// Client-held state for the active conversation, plus the CRUD actions
/// that keep it consistent with the backend.
///
/// The store holds its collaborators - a [`RemoteApi`] and a
/// [`SyncChannel`] - supplied at construction, so tests substitute doubles
/// freely. Cloning is cheap and every clone shares the same state.
///
/// Mutations are atomic: state is only touched under the lock, and network
/// calls suspend outside it, so no two operations interleave mid-mutation.
/// Two in-flight sends still race at the network layer and land in
/// completion order, not issuance order; that nondeterminism is accepted.
pub struct MessageStore<A, C> {
    api: Arc<A>,
    channel: Arc<C>,
    state: Arc<Mutex<StoreState>>,
}

impl<A, C> Clone for MessageStore<A, C> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            channel: Arc::clone(&self.channel),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A, C> MessageStore<A, C>
where
    A: RemoteApi,
    C: SyncChannel,
{
    /// Create a store over the given collaborators.
    pub fn new(api: A, channel: C) -> Self {
        Self {
            api: Arc::new(api),
            channel: Arc::new(channel),
            state: Arc::new(Mutex::new(StoreState {
                users: Vec::new(),
                selected_peer: None,
                conversation: None,
                users_loading: false,
                messages_loading: false,
            })),
        }
    }

    /// The channel this store publishes on.
    pub fn channel(&self) -> Arc<C> {
        Arc::clone(&self.channel)
    }

    /// Mark `peer` as the selected conversation. The message list itself is
    /// only replaced once [`load_messages`](Self::load_messages) commits.
    pub async fn select_conversation(&self, peer: &UserId) {
        self.state.lock().await.selected_peer = Some(peer.clone());
    }

    /// The currently selected peer, if any.
    pub async fn selected_peer(&self) -> Option<UserId> {
        self.state.lock().await.selected_peer.clone()
    }

    /// The peer of the loaded conversation, if one is loaded.
    pub async fn active_peer(&self) -> Option<UserId> {
        self.state
            .lock()
            .await
            .conversation
            .as_ref()
            .map(|c| c.peer().clone())
    }

    /// Snapshot of the known users.
    pub async fn users(&self) -> Vec<User> {
        self.state.lock().await.users.clone()
    }

    /// Snapshot of the active conversation's messages, in insertion order.
    pub async fn messages(&self) -> Vec<Message> {
        self.state
            .lock()
            .await
            .conversation
            .as_ref()
            .map(|c| c.messages().to_vec())
            .unwrap_or_default()
    }

    /// Whether a user list load is in flight.
    pub async fn is_users_loading(&self) -> bool {
        self.state.lock().await.users_loading
    }

    /// Whether a conversation load is in flight.
    pub async fn is_messages_loading(&self) -> bool {
        self.state.lock().await.messages_loading
    }

    /// Fetch the peer list and replace `users`.
    ///
    /// On failure the previous list is left untouched and the error is
    /// surfaced; the loading flag always clears.
    pub async fn load_users(&self) -> Result<(), StoreError> {
        self.state.lock().await.users_loading = true;

        let result = self.api.fetch_peers().await;

        let mut state = self.state.lock().await;
        state.users_loading = false;
        match result {
            Ok(users) => {
                state.users = users;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch the conversation with `peer` and replace the message list.
    ///
    /// The result commits only if `peer` still equals the selected peer at
    /// response time: a conversation switch invalidates any in-flight load
    /// for the previously selected peer, so a late response from a
    /// superseded switch can never overwrite the current conversation.
    /// On failure the previous messages are left untouched and the error is
    /// surfaced; the loading flag always clears.
    pub async fn load_messages(&self, peer: &UserId) -> Result<(), StoreError> {
        self.state.lock().await.messages_loading = true;

        let result = self.api.fetch_messages(peer).await;

        let mut state = self.state.lock().await;
        state.messages_loading = false;
        match result {
            Ok(messages) => {
                if state.selected_peer.as_ref() == Some(peer) {
                    state.conversation =
                        Some(Conversation::with_messages(peer.clone(), messages));
                } else {
                    tracing::debug!("discarding stale conversation load for {peer}");
                }
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Send a message to the selected peer.
    ///
    /// An empty draft is rejected locally - no network call, no mutation.
    /// On success the server's record is appended to the tail of the active
    /// conversation; there is no pre-ack optimistic insertion, so the sender
    /// sees their own message only after the round trip completes.
    pub async fn send_message(&self, draft: &MessageDraft) -> Result<Message, StoreError> {
        if draft.is_empty() {
            return Err(StoreError::EmptyDraft);
        }
        let peer = self
            .state
            .lock()
            .await
            .selected_peer
            .clone()
            .ok_or(StoreError::NoActiveConversation)?;

        let message = self.api.send_message(&peer, draft).await?;

        let mut state = self.state.lock().await;
        if let Some(conversation) = state.conversation.as_mut() {
            if conversation.peer() == &peer {
                conversation.append(message.clone());
            }
        }
        Ok(message)
    }

    /// Edit a message's content.
    ///
    /// On success the matching local entry is updated (an id absent from the
    /// list is a no-op, not an error) and an `editMessage` event carrying
    /// the updated record is published on the channel so other sessions
    /// reconcile. On API failure nothing changes.
    pub async fn edit_message(&self, id: &MessageId, content: &str) -> Result<(), StoreError> {
        let mut updated = self.api.edit_message(id, content).await?;
        updated.id = id.clone();
        let new_content = updated
            .content
            .get_or_insert_with(|| content.to_string())
            .clone();

        {
            let mut state = self.state.lock().await;
            if let Some(conversation) = state.conversation.as_mut() {
                conversation.apply_edited(id, &new_content);
            }
        }

        let frame = ChannelEvent::EditMessage(updated).to_bytes()?;
        self.channel.send(&frame).await?;
        Ok(())
    }

    /// Delete a message.
    ///
    /// On success the matching local entry is removed (absent id: no-op)
    /// and a `deleteMessage` event carrying the bare id is published. On
    /// API failure nothing changes.
    pub async fn delete_message(&self, id: &MessageId) -> Result<(), StoreError> {
        self.api.delete_message(id).await?;

        {
            let mut state = self.state.lock().await;
            if let Some(conversation) = state.conversation.as_mut() {
                conversation.apply_deleted(id);
            }
        }

        let frame = ChannelEvent::DeleteMessage(id.clone()).to_bytes()?;
        self.channel.send(&frame).await?;
        Ok(())
    }

    /// Reconcile an inbound channel event into the active conversation.
    /// Returns whether state changed.
    ///
    /// Application is idempotent by id for edits and deletes, so the echo
    /// of this session's own published mutation is harmless.
    pub async fn apply_event(&self, event: ChannelEvent) -> bool {
        let mut state = self.state.lock().await;
        match state.conversation.as_mut() {
            Some(conversation) => conversation.apply_event(event),
            None => false,
        }
    }
}
