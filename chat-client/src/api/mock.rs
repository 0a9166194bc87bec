//! Mock RemoteAPI for testing.
//!
//! Holds users and per-peer conversations in memory, records every request
//! so tests can assert what did (or did not) hit the network, and supports
//! forced failures plus a hold/release gate on conversation loads so
//! overlapping requests can be resolved out of issuance order.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use chat_types::{Message, MessageDraft, MessageId, User, UserId};

use super::{ApiError, RemoteApi};

/// Mock RemoteAPI for testing.
#[derive(Debug)]
pub struct MockRemoteApi {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<Inner>,
    gate: Notify,
}

#[derive(Debug)]
struct Inner {
    me: UserId,
    users: Vec<User>,
    conversations: HashMap<UserId, Vec<Message>>,
    requests: Vec<String>,
    fail_next: VecDeque<ApiError>,
    held_loads: HashSet<UserId>,
}

impl MockRemoteApi {
    /// Create a mock acting as the given local user.
    pub fn new(me: UserId) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(Inner {
                    me,
                    users: Vec::new(),
                    conversations: HashMap::new(),
                    requests: Vec::new(),
                    fail_next: VecDeque::new(),
                    held_loads: HashSet::new(),
                }),
                gate: Notify::new(),
            }),
        }
    }

    /// Seed the peer list returned by `fetch_peers`.
    pub fn seed_users(&self, users: Vec<User>) {
        self.shared.state.lock().unwrap().users = users;
    }

    /// Seed the conversation with `peer`.
    pub fn seed_conversation(&self, peer: &UserId, messages: Vec<Message>) {
        self.shared
            .state
            .lock()
            .unwrap()
            .conversations
            .insert(peer.clone(), messages);
    }

    /// Every request made so far, as `"METHOD path"` strings.
    pub fn requests(&self) -> Vec<String> {
        self.shared.state.lock().unwrap().requests.clone()
    }

    /// Queue an error for the next request (FIFO when several are queued).
    pub fn fail_next(&self, error: ApiError) {
        self.shared
            .state
            .lock()
            .unwrap()
            .fail_next
            .push_back(error);
    }

    /// Park `fetch_messages(peer)` calls until [`release_load`](Self::release_load).
    pub fn hold_load(&self, peer: &UserId) {
        self.shared
            .state
            .lock()
            .unwrap()
            .held_loads
            .insert(peer.clone());
    }

    /// Let parked `fetch_messages(peer)` calls resolve.
    pub fn release_load(&self, peer: &UserId) {
        self.shared.state.lock().unwrap().held_loads.remove(peer);
        self.shared.gate.notify_waiters();
    }

    fn record(&self, request: String) {
        self.shared.state.lock().unwrap().requests.push(request);
    }

    fn take_failure(&self) -> Option<ApiError> {
        self.shared.state.lock().unwrap().fail_next.pop_front()
    }
}

impl Clone for MockRemoteApi {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[async_trait]
impl RemoteApi for MockRemoteApi {
    async fn fetch_peers(&self) -> Result<Vec<User>, ApiError> {
        self.record("GET /messages/users".into());
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(self.shared.state.lock().unwrap().users.clone())
    }

    async fn fetch_messages(&self, peer: &UserId) -> Result<Vec<Message>, ApiError> {
        self.record(format!("GET /messages/{peer}"));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        loop {
            let notified = self.shared.gate.notified();
            {
                let inner = self.shared.state.lock().unwrap();
                if !inner.held_loads.contains(peer) {
                    return Ok(inner.conversations.get(peer).cloned().unwrap_or_default());
                }
            }
            notified.await;
        }
    }

    async fn send_message(
        &self,
        peer: &UserId,
        draft: &MessageDraft,
    ) -> Result<Message, ApiError> {
        self.record(format!("POST /messages/send/{peer}"));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut inner = self.shared.state.lock().unwrap();
        let message = Message {
            id: MessageId::random(),
            sender_id: inner.me.clone(),
            receiver_id: peer.clone(),
            text: draft.text.clone(),
            image: draft.image.clone(),
            content: None,
            created_at: Utc::now(),
        };
        inner
            .conversations
            .entry(peer.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn edit_message(&self, id: &MessageId, content: &str) -> Result<Message, ApiError> {
        self.record(format!("PUT /messages/edit/{id}"));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut inner = self.shared.state.lock().unwrap();
        for messages in inner.conversations.values_mut() {
            if let Some(message) = messages.iter_mut().find(|m| &m.id == id) {
                message.content = Some(content.to_string());
                return Ok(message.clone());
            }
        }
        Err(ApiError::Server {
            status: 404,
            message: "Message not found".into(),
        })
    }

    async fn delete_message(&self, id: &MessageId) -> Result<(), ApiError> {
        self.record(format!("DELETE /messages/delete/{id}"));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut inner = self.shared.state.lock().unwrap();
        for messages in inner.conversations.values_mut() {
            let before = messages.len();
            messages.retain(|m| &m.id != id);
            if messages.len() != before {
                return Ok(());
            }
        }
        Err(ApiError::Server {
            status: 404,
            message: "Message not found".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: UserId::from(id),
            full_name: name.into(),
            profile_pic: None,
        }
    }

    #[tokio::test]
    async fn fetch_peers_returns_seeded_users() {
        let api = MockRemoteApi::new(UserId::from("me"));
        api.seed_users(vec![user("bob", "Bob"), user("carol", "Carol")]);

        let users = api.fetch_peers().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(api.requests(), vec!["GET /messages/users"]);
    }

    #[tokio::test]
    async fn send_assigns_id_and_timestamp_and_stores() {
        let api = MockRemoteApi::new(UserId::from("me"));
        let bob = UserId::from("bob");

        let sent = api
            .send_message(&bob, &MessageDraft::text("hi"))
            .await
            .unwrap();
        assert_eq!(sent.sender_id, UserId::from("me"));
        assert_eq!(sent.receiver_id, bob);

        let messages = api.fetch_messages(&bob).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, sent.id);
    }

    #[tokio::test]
    async fn edit_of_unknown_id_is_a_server_rejection() {
        let api = MockRemoteApi::new(UserId::from("me"));
        let result = api.edit_message(&MessageId::from("ghost"), "new").await;
        assert!(matches!(result, Err(ApiError::Server { status: 404, .. })));
    }

    #[tokio::test]
    async fn forced_failure_applies_to_next_request_only() {
        let api = MockRemoteApi::new(UserId::from("me"));
        api.fail_next(ApiError::Network("offline".into()));

        assert!(api.fetch_peers().await.is_err());
        assert!(api.fetch_peers().await.is_ok());
    }

    #[tokio::test]
    async fn held_load_parks_until_released() {
        let api = MockRemoteApi::new(UserId::from("me"));
        let bob = UserId::from("bob");
        api.hold_load(&bob);

        let api2 = api.clone();
        let bob2 = bob.clone();
        let load = tokio::spawn(async move { api2.fetch_messages(&bob2).await });

        tokio::task::yield_now().await;
        assert!(!load.is_finished());

        api.release_load(&bob);
        let messages = load.await.unwrap().unwrap();
        assert!(messages.is_empty());
    }
}
