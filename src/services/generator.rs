//! 回复生成服务
//!
//! 一次请求依次完成：检索上下文 → 渲染记忆 → 调用语言模型 → 写回记忆。

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel, CompletionOptions};
use crate::services::memory::ConversationMemory;
use crate::services::prompt::compose_instructions;
use crate::services::retrieval::RetrievalService;

pub struct ResponseGenerator {
    retrieval: Box<dyn RetrievalService>,
    memory: Arc<ConversationMemory>,
    chat_model: Arc<dyn ChatModel>,
    options: CompletionOptions,
    top_k: usize,
}

impl ResponseGenerator {
    pub fn new(
        retrieval: Box<dyn RetrievalService>,
        memory: Arc<ConversationMemory>,
        chat_model: Arc<dyn ChatModel>,
        options: CompletionOptions,
        top_k: usize,
    ) -> Self {
        Self {
            retrieval,
            memory,
            chat_model,
            options,
            top_k,
        }
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    /// 生成回复并记入对话记忆
    ///
    /// 检索或生成失败时原样返回错误，记忆保持不变。
    pub async fn generate_reply(&self, user_input: &str) -> Result<String> {
        let start = Instant::now();

        let context = self
            .retrieval
            .retrieve_context(user_input, self.top_k)
            .await?;
        let history = self.memory.format_memory();
        debug!(
            context_chars = context.chars().count(),
            history_entries = self.memory.len(),
            "Prompt inputs prepared"
        );

        let messages = vec![
            ChatMessage::system(compose_instructions(&context, &history)),
            ChatMessage::user(user_input),
        ];
        let reply = self.chat_model.complete(messages, self.options).await?;

        self.memory.add_to_memory(user_input, &reply);
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Reply generated"
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::llm::{ChatRole, MockChatModel};
    use crate::services::prompt::SYSTEM_PROMPT;
    use crate::services::retrieval::MockRetrievalService;
    use mockall::predicate::eq;

    fn retrieval_returning(context: &'static str) -> Box<dyn RetrievalService> {
        let mut retrieval = MockRetrievalService::new();
        retrieval
            .expect_retrieve_context()
            .returning(move |_, _| Ok(context.to_string()));
        Box::new(retrieval)
    }

    #[tokio::test]
    async fn test_generate_reply_builds_prompt_and_records_memory() {
        let mut retrieval = MockRetrievalService::new();
        retrieval
            .expect_retrieve_context()
            .with(eq("roast my code"), eq(1))
            .times(1)
            .returning(|_, _| Ok("bugs everywhere".to_string()));

        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .times(1)
            .withf(|messages, options| {
                messages.len() == 2
                    && messages[0].role == ChatRole::System
                    && messages[0].content.starts_with(SYSTEM_PROMPT)
                    && messages[0]
                        .content
                        .contains("Use this roast context for inspiration: bugs everywhere")
                    && messages[0]
                        .content
                        .ends_with("Recent conversation for context: No previous conversation.")
                    && messages[1].role == ChatRole::User
                    && messages[1].content == "roast my code"
                    && options.max_tokens == 200
            })
            .returning(|_, _| Ok("It compiles? Shocking.".to_string()));

        let memory = Arc::new(ConversationMemory::default());
        let generator = ResponseGenerator::new(
            Box::new(retrieval),
            memory.clone(),
            Arc::new(chat),
            CompletionOptions::default(),
            1,
        );

        let reply = generator.generate_reply("roast my code").await.unwrap();
        assert_eq!(reply, "It compiles? Shocking.");

        let entries = memory.get_memory();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_message, "roast my code");
        assert_eq!(entries[0].bot_reply, "It compiles? Shocking.");
    }

    #[tokio::test]
    async fn test_history_is_included_on_next_turn() {
        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .withf(|messages, _| {
                messages[0]
                    .content
                    .contains("Recent conversation for context: User: first\nRoastbot: reply")
            })
            .returning(|_, _| Ok("second reply".to_string()));

        let memory = Arc::new(ConversationMemory::default());
        memory.add_to_memory("first", "reply");

        let generator = ResponseGenerator::new(
            retrieval_returning("ctx"),
            memory.clone(),
            Arc::new(chat),
            CompletionOptions::default(),
            1,
        );

        generator.generate_reply("second").await.unwrap();
        assert_eq!(memory.len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_propagates_and_leaves_memory() {
        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .times(1)
            .returning(|_, _| Err(AppError::Generation("401 unauthorized".into())));

        let memory = Arc::new(ConversationMemory::default());
        let generator = ResponseGenerator::new(
            retrieval_returning("ctx"),
            memory.clone(),
            Arc::new(chat),
            CompletionOptions::default(),
            1,
        );

        let err = generator.generate_reply("hello").await.unwrap_err();
        assert!(matches!(err, AppError::Generation(msg) if msg == "401 unauthorized"));
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_retrieval_failure_skips_model_call() {
        let mut retrieval = MockRetrievalService::new();
        retrieval
            .expect_retrieve_context()
            .returning(|_, _| Err(AppError::Embedding("offline".into())));

        let mut chat = MockChatModel::new();
        chat.expect_complete().never();

        let generator = ResponseGenerator::new(
            Box::new(retrieval),
            Arc::new(ConversationMemory::default()),
            Arc::new(chat),
            CompletionOptions::default(),
            1,
        );

        let err = generator.generate_reply("hello").await.unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
    }
}
