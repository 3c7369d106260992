use crate::assistant::ShoppingAssistant;
use crate::catalog::ProductCatalog;
use crate::conversations::ConversationStore;
use crate::errors::ServiceError;
use crate::metrics;
use crate::models::{Conversation, Message};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Limits and policies applied to every chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    /// Maximum message length in characters.
    pub max_message_length: usize,
    /// Fail turns that name a conversation the caller does not own instead of
    /// starting a new one.
    pub reject_unknown_conversation_id: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_message_length: 1000,
            reject_unknown_conversation_id: false,
        }
    }
}

/// Result of one chat turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub conversation_id: String,
    /// The assistant reply that was stored.
    pub message: Message,
}

/// Runs chat turns and manages the caller's conversations.
///
/// Turns on the same conversation are serialized by a per-conversation lock
/// held for the whole turn. Deleting a conversation takes the same lock, so a
/// turn never races a delete of its own conversation. A turn that fails after
/// the user message was stored removes that message again, and deletes the
/// conversation if the turn created it.
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ConversationStore>,
    catalog: Arc<dyn ProductCatalog>,
    assistant: ShoppingAssistant,
    settings: ChatSettings,
    turn_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        catalog: Arc<dyn ProductCatalog>,
        assistant: ShoppingAssistant,
        settings: ChatSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            assistant,
            settings,
            turn_locks: Arc::new(DashMap::new()),
        }
    }

    fn turn_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(conversation_id.to_string())
            .or_default()
            .clone()
    }

    fn validate_message(&self, message: &str) -> Result<(), ServiceError> {
        if message.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Message is required".to_string(),
            ));
        }
        if message.chars().count() > self.settings.max_message_length {
            return Err(ServiceError::ValidationError(format!(
                "Message must be at most {} characters",
                self.settings.max_message_length
            )));
        }
        Ok(())
    }

    /// Resolves the conversation a turn continues. `None` means the turn
    /// starts a new conversation.
    async fn resolve_conversation(
        &self,
        user_id: &str,
        requested: Option<&str>,
    ) -> Result<Option<String>, ServiceError> {
        let Some(id) = requested else {
            return Ok(None);
        };

        if self.store.get(user_id, id).await?.is_some() {
            return Ok(Some(id.to_string()));
        }
        if self.settings.reject_unknown_conversation_id {
            return Err(ServiceError::NotFound(
                "Conversation not found".to_string(),
            ));
        }

        warn!(requested_id = %id, "unknown conversation id, starting a new conversation");
        Ok(None)
    }

    /// Executes one chat turn for `user_id`.
    ///
    /// The reply is computed before anything is stored. Both messages are then
    /// committed by a spawned task that owns the turn lock, so dropping the
    /// caller either leaves the conversation untouched or lets the whole turn
    /// land. An empty `conversation_id` is treated as absent.
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn send_message(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatTurn, ServiceError> {
        self.validate_message(message)?;
        let requested = conversation_id.filter(|id| !id.trim().is_empty());

        let existing = self.resolve_conversation(user_id, requested).await?;
        let turn_guard = match &existing {
            Some(id) => Some(self.turn_lock(id).lock_owned().await),
            None => None,
        };

        let user_message = Message::user(message);
        let reply = match self.reply(message).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "chat turn failed before anything was stored");
                metrics::CHAT_TURNS_FAILED.inc();
                return Err(err);
            }
        };

        let commit = TurnCommit {
            store: self.store.clone(),
            turn_locks: self.turn_locks.clone(),
            user_id: user_id.to_string(),
            existing,
            user_message,
            reply: reply.clone(),
        };
        let outcome = tokio::spawn(async move {
            let _turn = turn_guard;
            commit.run().await
        })
        .await
        .map_err(|e| ServiceError::InternalError(format!("Chat turn task failed: {e}")))
        .and_then(|result| result);

        match outcome {
            Ok((conversation_id, created)) => {
                metrics::CHAT_TURNS.inc();
                info!(conversation_id = %conversation_id, created, "chat turn completed");
                Ok(ChatTurn {
                    conversation_id,
                    message: reply,
                })
            }
            Err(err) => {
                metrics::CHAT_TURNS_FAILED.inc();
                Err(err)
            }
        }
    }

    async fn reply(&self, message: &str) -> Result<Message, ServiceError> {
        let (intent, reply) = self.assistant.respond(message, self.catalog.as_ref()).await?;
        metrics::record_intent(intent.as_ref());
        Ok(Message::assistant(reply.text, reply.products))
    }

    #[instrument(skip(self))]
    pub async fn list_conversations(
        &self,
        user_id: &str,
    ) -> Result<Vec<Conversation>, ServiceError> {
        self.store.list_by_user(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Conversation, ServiceError> {
        self.store
            .get(user_id, conversation_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Conversation not found".to_string()))
    }

    /// Deletes the caller's conversation and all of its messages.
    #[instrument(skip(self))]
    pub async fn delete_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<(), ServiceError> {
        let lock = self.turn_lock(conversation_id);
        let deleted = {
            let _turn = lock.lock().await;
            self.store.delete(user_id, conversation_id).await?
        };

        if !deleted {
            return Err(ServiceError::NotFound(
                "Conversation not found".to_string(),
            ));
        }

        self.turn_locks.remove(conversation_id);
        metrics::CONVERSATIONS_DELETED.inc();
        info!(conversation_id, "conversation deleted");
        Ok(())
    }
}

/// Storage half of a chat turn. Runs detached from the request so a dropped
/// caller cannot leave it half-applied.
struct TurnCommit {
    store: Arc<dyn ConversationStore>,
    turn_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    user_id: String,
    existing: Option<String>,
    user_message: Message,
    reply: Message,
}

impl TurnCommit {
    /// Appends both messages. Returns the conversation id and whether the
    /// conversation was created by this turn.
    async fn run(self) -> Result<(String, bool), ServiceError> {
        let TurnCommit {
            store,
            turn_locks,
            user_id,
            existing,
            user_message,
            reply,
        } = self;

        let (conversation_id, created) = match existing {
            Some(id) => (id, false),
            None => (store.find_or_create(&user_id, None).await?.id, true),
        };
        let user_message_id = user_message.id.clone();

        // The conversation may have been deleted before the turn lock was taken
        if let Err(err) = store.append(&user_id, &conversation_id, user_message).await {
            if created {
                discard_conversation(store.as_ref(), &turn_locks, &user_id, &conversation_id)
                    .await;
            }
            return Err(err);
        }

        if let Err(err) = store.append(&user_id, &conversation_id, reply).await {
            warn!(
                conversation_id = %conversation_id,
                error = %err,
                "storing the reply failed, rolling back"
            );
            if created {
                discard_conversation(store.as_ref(), &turn_locks, &user_id, &conversation_id)
                    .await;
            } else if let Err(rollback_err) = store
                .remove_message(&user_id, &conversation_id, &user_message_id)
                .await
            {
                tracing::error!(
                    conversation_id = %conversation_id,
                    message_id = %user_message_id,
                    error = %rollback_err,
                    "failed to remove user message during rollback"
                );
            }
            return Err(err);
        }

        Ok((conversation_id, created))
    }
}

async fn discard_conversation(
    store: &dyn ConversationStore,
    turn_locks: &DashMap<String, Arc<Mutex<()>>>,
    user_id: &str,
    conversation_id: &str,
) {
    match store.delete(user_id, conversation_id).await {
        Ok(_) => {
            turn_locks.remove(conversation_id);
        }
        Err(err) => tracing::error!(
            conversation_id,
            error = %err,
            "failed to discard conversation during rollback"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{
        composer, IntentTag, NoShuffle, SelectorPolicy, ShoppingAssistant,
    };
    use crate::catalog::{InMemoryCatalog, MockProductCatalog, ProductQuery, QueryPage};
    use crate::conversations::InMemoryConversationStore;
    use crate::models::{MessageRole, Product};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::timeout;

    /// Catalog whose lookups never complete.
    struct StalledCatalog;

    #[async_trait]
    impl ProductCatalog for StalledCatalog {
        async fn find(&self, _id: &str) -> Result<Option<Product>, ServiceError> {
            std::future::pending().await
        }

        async fn query(&self, _query: &ProductQuery) -> Result<QueryPage, ServiceError> {
            std::future::pending().await
        }
    }

    /// Store that refuses to append assistant messages.
    struct ReplyRejectingStore {
        inner: InMemoryConversationStore,
    }

    #[async_trait]
    impl ConversationStore for ReplyRejectingStore {
        async fn find_or_create(
            &self,
            user_id: &str,
            conversation_id: Option<&str>,
        ) -> Result<Conversation, ServiceError> {
            self.inner.find_or_create(user_id, conversation_id).await
        }

        async fn append(
            &self,
            user_id: &str,
            conversation_id: &str,
            message: Message,
        ) -> Result<Conversation, ServiceError> {
            if message.role == MessageRole::Assistant {
                return Err(ServiceError::InternalError("disk full".into()));
            }
            self.inner.append(user_id, conversation_id, message).await
        }

        async fn get(
            &self,
            user_id: &str,
            conversation_id: &str,
        ) -> Result<Option<Conversation>, ServiceError> {
            self.inner.get(user_id, conversation_id).await
        }

        async fn list_by_user(&self, user_id: &str) -> Result<Vec<Conversation>, ServiceError> {
            self.inner.list_by_user(user_id).await
        }

        async fn delete(&self, user_id: &str, conversation_id: &str) -> Result<bool, ServiceError> {
            self.inner.delete(user_id, conversation_id).await
        }

        async fn remove_message(
            &self,
            user_id: &str,
            conversation_id: &str,
            message_id: &str,
        ) -> Result<bool, ServiceError> {
            self.inner
                .remove_message(user_id, conversation_id, message_id)
                .await
        }
    }

    fn assistant() -> ShoppingAssistant {
        ShoppingAssistant::with_policy(SelectorPolicy::default(), Arc::new(NoShuffle))
    }

    fn service_with(
        store: Arc<InMemoryConversationStore>,
        catalog: Arc<dyn ProductCatalog>,
        settings: ChatSettings,
    ) -> ChatService {
        ChatService::new(store, catalog, assistant(), settings)
    }

    fn service() -> (ChatService, Arc<InMemoryConversationStore>) {
        let store = Arc::new(InMemoryConversationStore::new());
        let catalog = Arc::new(InMemoryCatalog::with_seed_data().unwrap());
        (
            service_with(store.clone(), catalog, ChatSettings::default()),
            store,
        )
    }

    fn failing_catalog() -> Arc<dyn ProductCatalog> {
        let mut mock = MockProductCatalog::new();
        mock.expect_query()
            .returning(|_| Err(ServiceError::InternalError("catalog offline".into())));
        Arc::new(mock)
    }

    #[tokio::test]
    async fn first_turn_creates_a_conversation() {
        let (service, store) = service();
        let turn = service.send_message("alice", "hello", None).await.unwrap();

        assert_eq!(turn.message.role, MessageRole::Assistant);
        assert_eq!(turn.message.content, composer::GREETING_REPLY);
        assert_eq!(turn.message.products.as_deref(), Some(&[][..]));

        let conversation = store.get("alice", &turn.conversation_id).await.unwrap().unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].content, "hello");
        assert_eq!(conversation.messages[1].id, turn.message.id);
    }

    #[tokio::test]
    async fn follow_up_turns_extend_the_same_conversation() {
        let (service, store) = service();
        let first = service.send_message("alice", "hello", None).await.unwrap();
        let second = service
            .send_message(
                "alice",
                "show me phones under $100",
                Some(&first.conversation_id),
            )
            .await
            .unwrap();

        assert_eq!(first.conversation_id, second.conversation_id);
        assert_eq!(second.message.content, composer::PHONE_REPLY);
        assert_eq!(second.message.products.as_ref().map(Vec::len), Some(3));

        let conversation = store
            .get("alice", &first.conversation_id)
            .await
            .unwrap()
            .unwrap();
        let roles: Vec<MessageRole> = conversation.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant
            ]
        );
    }

    #[tokio::test]
    async fn blank_and_oversized_messages_are_rejected_before_storage() {
        let store = Arc::new(InMemoryConversationStore::new());
        let service = service_with(
            store.clone(),
            Arc::new(InMemoryCatalog::with_seed_data().unwrap()),
            ChatSettings {
                max_message_length: 10,
                ..ChatSettings::default()
            },
        );

        assert_matches!(
            service.send_message("alice", "   ", None).await,
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            service.send_message("alice", "this is far too long", None).await,
            Err(ServiceError::ValidationError(_))
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn foreign_conversation_id_starts_a_new_conversation() {
        let (service, _) = service();
        let alice = service.send_message("alice", "hello", None).await.unwrap();
        let bob = service
            .send_message("bob", "hello", Some(&alice.conversation_id))
            .await
            .unwrap();

        assert_ne!(alice.conversation_id, bob.conversation_id);
        let alice_conversation = service
            .get_conversation("alice", &alice.conversation_id)
            .await
            .unwrap();
        assert_eq!(alice_conversation.messages.len(), 2);
    }

    #[tokio::test]
    async fn strict_mode_rejects_unknown_ids_without_mutation() {
        let store = Arc::new(InMemoryConversationStore::new());
        let service = service_with(
            store.clone(),
            Arc::new(InMemoryCatalog::with_seed_data().unwrap()),
            ChatSettings {
                reject_unknown_conversation_id: true,
                ..ChatSettings::default()
            },
        );

        assert_matches!(
            service.send_message("alice", "hello", Some("nope")).await,
            Err(ServiceError::NotFound(_))
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn failed_first_turn_leaves_nothing_behind() {
        let store = Arc::new(InMemoryConversationStore::new());
        let service = service_with(store.clone(), failing_catalog(), ChatSettings::default());

        let result = service.send_message("alice", "any books?", None).await;
        assert_matches!(result, Err(ServiceError::InternalError(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn failed_follow_up_leaves_the_conversation_unchanged() {
        let store = Arc::new(InMemoryConversationStore::new());
        let healthy = service_with(
            store.clone(),
            Arc::new(InMemoryCatalog::with_seed_data().unwrap()),
            ChatSettings::default(),
        );
        let first = healthy.send_message("alice", "hello", None).await.unwrap();

        let broken = service_with(store.clone(), failing_catalog(), ChatSettings::default());
        let result = broken
            .send_message("alice", "any books?", Some(&first.conversation_id))
            .await;
        assert_matches!(result, Err(ServiceError::InternalError(_)));

        let conversation = store
            .get("alice", &first.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert!(conversation.messages.iter().all(|m| m.content != "any books?"));
    }

    #[tokio::test]
    async fn greeting_never_touches_the_catalog() {
        let mut mock = MockProductCatalog::new();
        mock.expect_query().times(0);
        let store = Arc::new(InMemoryConversationStore::new());
        let service = service_with(store, Arc::new(mock), ChatSettings::default());

        let turn = service.send_message("alice", "Hey!", None).await.unwrap();
        assert_eq!(service.assistant.classify("Hey!"), IntentTag::Greeting);
        assert_eq!(turn.message.content, composer::GREETING_REPLY);
    }

    #[tokio::test]
    async fn delete_is_scoped_to_the_owner() {
        let (service, _) = service();
        let turn = service.send_message("alice", "hello", None).await.unwrap();

        assert_matches!(
            service.delete_conversation("bob", &turn.conversation_id).await,
            Err(ServiceError::NotFound(_))
        );
        assert_eq!(service.list_conversations("alice").await.unwrap().len(), 1);

        service
            .delete_conversation("alice", &turn.conversation_id)
            .await
            .unwrap();
        assert!(service.list_conversations("alice").await.unwrap().is_empty());
        assert_matches!(
            service.get_conversation("alice", &turn.conversation_id).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn concurrent_turns_on_one_conversation_do_not_interleave() {
        let (service, store) = service();
        let first = service.send_message("alice", "hello", None).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            let id = first.conversation_id.clone();
            handles.push(tokio::spawn(async move {
                service
                    .send_message("alice", &format!("budget idea {i}"), Some(&id))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let conversation = store
            .get("alice", &first.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.messages.len(), 34);
        for pair in conversation.messages.chunks(2) {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[1].role, MessageRole::Assistant);
        }
    }

    #[tokio::test]
    async fn abandoned_first_turn_stores_nothing() {
        let store = Arc::new(InMemoryConversationStore::new());
        let service = service_with(store.clone(), Arc::new(StalledCatalog), ChatSettings::default());

        let result = timeout(
            Duration::from_millis(50),
            service.send_message("alice", "any books?", None),
        )
        .await;
        assert!(result.is_err());

        assert!(store.list_by_user("alice").await.unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn abandoned_follow_up_leaves_the_conversation_whole() {
        let store = Arc::new(InMemoryConversationStore::new());
        let service = service_with(store.clone(), Arc::new(StalledCatalog), ChatSettings::default());
        let first = service.send_message("alice", "hello", None).await.unwrap();

        let result = timeout(
            Duration::from_millis(50),
            service.send_message("alice", "any books?", Some(&first.conversation_id)),
        )
        .await;
        assert!(result.is_err());

        // The abandoned turn released the conversation lock
        let next = timeout(
            Duration::from_secs(5),
            service.send_message("alice", "hey again", Some(&first.conversation_id)),
        )
        .await
        .expect("turn lock was released")
        .unwrap();
        assert_eq!(next.conversation_id, first.conversation_id);

        let conversation = store
            .get("alice", &first.conversation_id)
            .await
            .unwrap()
            .unwrap();
        let contents: Vec<&str> = conversation
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec![
                "hello",
                composer::GREETING_REPLY,
                "hey again",
                composer::GREETING_REPLY
            ]
        );
    }

    #[tokio::test]
    async fn failed_reply_append_rolls_the_turn_back() {
        let store = Arc::new(ReplyRejectingStore {
            inner: InMemoryConversationStore::new(),
        });
        let service = ChatService::new(
            store.clone(),
            Arc::new(InMemoryCatalog::with_seed_data().unwrap()),
            assistant(),
            ChatSettings::default(),
        );

        assert_matches!(
            service.send_message("alice", "hello", None).await,
            Err(ServiceError::InternalError(_))
        );
        assert!(store.inner.is_empty());

        let existing = store.inner.find_or_create("alice", None).await.unwrap();
        assert_matches!(
            service
                .send_message("alice", "hello", Some(&existing.id))
                .await,
            Err(ServiceError::InternalError(_))
        );
        let conversation = store.inner.get("alice", &existing.id).await.unwrap().unwrap();
        assert!(conversation.messages.is_empty());
    }

    #[tokio::test]
    async fn strict_mode_rejects_a_conversation_deleted_mid_turn() {
        let store = Arc::new(InMemoryConversationStore::new());
        let service = service_with(
            store.clone(),
            Arc::new(InMemoryCatalog::with_seed_data().unwrap()),
            ChatSettings {
                reject_unknown_conversation_id: true,
                ..ChatSettings::default()
            },
        );
        let first = service.send_message("alice", "hello", None).await.unwrap();

        // Hold the turn lock so the next turn resolves the id and then waits
        let held = service.turn_lock(&first.conversation_id).lock_owned().await;
        let pending = {
            let service = service.clone();
            let id = first.conversation_id.clone();
            tokio::spawn(async move { service.send_message("alice", "hi", Some(&id)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.delete("alice", &first.conversation_id).await.unwrap();
        drop(held);

        assert_matches!(pending.await.unwrap(), Err(ServiceError::NotFound(_)));
        assert!(store.is_empty());
    }
}
