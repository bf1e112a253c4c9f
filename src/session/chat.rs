use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::warn;

use crate::llm::{ConversationContext, LLMProvider};

/// Builds a fresh provider instance for a new or reset conversation. Boxed so
/// the registry doesn't need to know which concrete provider is configured.
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn LLMProvider> + Send + Sync>;

/// Lazily creates and holds one `ConversationContext` per `chat_id`, mirroring
/// `MainOrchestrator.get_gemini_chat_session`'s get-or-create behavior. Each
/// session is independently mutex-guarded so requests against different chats
/// never block one another, while turns within one chat are serialized.
pub struct ChatSessionRegistry {
    sessions: DashMap<String, Arc<Mutex<ConversationContext>>>,
    factory: ProviderFactory,
}

impl ChatSessionRegistry {
    pub fn new(factory: ProviderFactory) -> Self {
        Self {
            sessions: DashMap::new(),
            factory,
        }
    }

    /// Returns the existing session for `chat_id`, creating one if absent.
    pub fn get_or_create(&self, chat_id: &str) -> Arc<Mutex<ConversationContext>> {
        if let Some(existing) = self.sessions.get(chat_id) {
            return existing.clone();
        }
        warn!(chat_id, "no conversation session found, creating a new one");
        let context = Arc::new(Mutex::new(ConversationContext::new((self.factory)())));
        self.sessions.insert(chat_id.to_string(), context.clone());
        context
    }

    /// Replaces `chat_id`'s session with a freshly constructed one.
    pub fn reset(&self, chat_id: &str) {
        let context = Arc::new(Mutex::new(ConversationContext::new((self.factory)())));
        self.sessions.insert(chat_id.to_string(), context);
    }

    pub fn contains(&self, chat_id: &str) -> bool {
        self.sessions.contains_key(chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MollyError;
    use crate::llm::LLMResponse;
    use async_trait::async_trait;
    use serde_json::Value;

    struct NullProvider;

    #[async_trait]
    impl LLMProvider for NullProvider {
        async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<LLMResponse, MollyError> {
            Ok(LLMResponse {
                content: String::new(),
                input_tokens: None,
                output_tokens: None,
                cost_usd: None,
                model: "null".to_string(),
            })
        }
        async fn complete_structured(&self, _prompt: &str, _schema: &Value, _system: Option<&str>) -> Result<Value, MollyError> {
            Ok(Value::Null)
        }
        fn provider_name(&self) -> &str { "null" }
        fn model_name(&self) -> &str { "null" }
    }

    fn factory() -> ProviderFactory {
        Arc::new(|| Box::new(NullProvider) as Box<dyn LLMProvider>)
    }

    #[test]
    fn test_get_or_create_is_idempotent_for_same_chat() {
        let registry = ChatSessionRegistry::new(factory());
        let a = registry.get_or_create("chat-1");
        let b = registry.get_or_create("chat-1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_chats_get_different_sessions() {
        let registry = ChatSessionRegistry::new(factory());
        let a = registry.get_or_create("chat-1");
        let b = registry.get_or_create("chat-2");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_reset_replaces_session() {
        let registry = ChatSessionRegistry::new(factory());
        let a = registry.get_or_create("chat-1");
        registry.reset("chat-1");
        let b = registry.get_or_create("chat-1");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_contains_reflects_creation() {
        let registry = ChatSessionRegistry::new(factory());
        assert!(!registry.contains("chat-1"));
        registry.get_or_create("chat-1");
        assert!(registry.contains("chat-1"));
    }
}
