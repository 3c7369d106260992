use crate::errors::ServiceError;
use crate::models::{Conversation, Message};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Keyed collection of conversations. Every operation is scoped by the
/// owning user; a conversation owned by someone else behaves as missing.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Returns the caller's conversation with `conversation_id`, or creates a
    /// new one under a freshly generated id. A supplied id that misses is
    /// never reused.
    async fn find_or_create(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<Conversation, ServiceError>;

    /// Appends `message` and returns the updated conversation.
    async fn append(
        &self,
        user_id: &str,
        conversation_id: &str,
        message: Message,
    ) -> Result<Conversation, ServiceError>;

    async fn get(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Conversation>, ServiceError>;

    /// The caller's conversations, most recently updated first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Conversation>, ServiceError>;

    /// Returns whether a conversation was removed.
    async fn delete(&self, user_id: &str, conversation_id: &str) -> Result<bool, ServiceError>;

    /// Removes one message; used to roll back a failed turn.
    async fn remove_message(
        &self,
        user_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<bool, ServiceError>;
}

fn conversation_not_found() -> ServiceError {
    ServiceError::NotFound("Conversation not found".to_string())
}

/// Process-lifetime store backed by a [`DashMap`]. Each mutation runs under
/// the entry's shard lock, so readers never see a half-applied append.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<DashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn find_or_create(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<Conversation, ServiceError> {
        if let Some(id) = conversation_id {
            if let Some(existing) = self.conversations.get(id) {
                if existing.is_owned_by(user_id) {
                    return Ok(existing.clone());
                }
            }
        }

        let conversation = Conversation::new(user_id);
        self.conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn append(
        &self,
        user_id: &str,
        conversation_id: &str,
        message: Message,
    ) -> Result<Conversation, ServiceError> {
        match self.conversations.get_mut(conversation_id) {
            Some(mut entry) if entry.is_owned_by(user_id) => {
                entry.push(message);
                Ok(entry.clone())
            }
            _ => Err(conversation_not_found()),
        }
    }

    async fn get(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Conversation>, ServiceError> {
        Ok(self
            .conversations
            .get(conversation_id)
            .filter(|entry| entry.is_owned_by(user_id))
            .map(|entry| entry.clone()))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Conversation>, ServiceError> {
        let mut owned: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|entry| entry.is_owned_by(user_id))
            .map(|entry| entry.value().clone())
            .collect();
        owned.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(owned)
    }

    async fn delete(&self, user_id: &str, conversation_id: &str) -> Result<bool, ServiceError> {
        Ok(self
            .conversations
            .remove_if(conversation_id, |_, conversation| {
                conversation.is_owned_by(user_id)
            })
            .is_some())
    }

    async fn remove_message(
        &self,
        user_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<bool, ServiceError> {
        match self.conversations.get_mut(conversation_id) {
            Some(mut entry) if entry.is_owned_by(user_id) => Ok(entry.remove_message(message_id)),
            _ => Ok(false),
        }
    }
}
