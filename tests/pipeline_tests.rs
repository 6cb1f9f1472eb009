// End-to-end tests for the retrieval + memory pipeline
//
// Tests cover:
// - Corpus loading and chunking from a file
// - Index construction with the local hashing embedding model
// - Context retrieval feeding the prompt
// - Memory eviction across consecutive exchanges
// - Failure propagation from the chat model

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use roastbot::corpus::load_and_chunk;
use roastbot::error::{AppError, Result};
use roastbot::index::{HashingEmbeddingModel, KnowledgeBase};
use roastbot::llm::{ChatMessage, ChatModel, CompletionOptions};
use roastbot::services::memory::EMPTY_MEMORY_PLACEHOLDER;
use roastbot::services::{ConversationMemory, ResponseGenerator, create_retrieval_service};

/// Chat model that numbers its replies and keeps every system prompt it saw
#[derive(Default)]
struct ScriptedChatModel {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<String> {
        if self.fail {
            return Err(AppError::Generation("503 service unavailable".into()));
        }
        let mut prompts = self.prompts.lock();
        prompts.push(messages[0].content.clone());
        Ok(format!("reply {}", prompts.len()))
    }
}

fn corpus_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

async fn generator_for(
    contents: &str,
    chunk_size: usize,
    chat: Arc<ScriptedChatModel>,
) -> (ResponseGenerator, Arc<ConversationMemory>) {
    let file = corpus_file(contents);
    let fragments = load_and_chunk(file.path(), chunk_size).unwrap();
    let kb = KnowledgeBase::build(fragments, Arc::new(HashingEmbeddingModel::new(64)))
        .await
        .unwrap();

    let memory = Arc::new(ConversationMemory::default());
    let generator = ResponseGenerator::new(
        create_retrieval_service(Arc::new(kb)),
        memory.clone(),
        chat,
        CompletionOptions::default(),
        1,
    );
    (generator, memory)
}

#[tokio::test]
async fn test_end_to_end_six_exchanges_evict_the_first() {
    let chat = Arc::new(ScriptedChatModel::default());
    let (generator, memory) = generator_for("abcdefghij", 5, chat.clone()).await;

    for i in 1..=6 {
        let reply = generator
            .generate_reply(&format!("message {}", i))
            .await
            .unwrap();
        assert_eq!(reply, format!("reply {}", i));
    }

    let entries = memory.get_memory();
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().all(|e| e.user_message != "message 1"));
    assert_eq!(entries[0].user_message, "message 2");
    assert_eq!(entries[4].user_message, "message 6");

    let prompts = chat.prompts.lock();
    for prompt in prompts.iter() {
        assert!(
            prompt.contains("inspiration: abcde\n\n") || prompt.contains("inspiration: fghij\n\n")
        );
    }
    assert!(prompts[0].ends_with(EMPTY_MEMORY_PLACEHOLDER));
    assert!(prompts[5].contains("User: message 5\nRoastbot: reply 5"));
    assert!(prompts[5].contains("User: message 1\nRoastbot: reply 1"));
}

#[tokio::test]
async fn test_empty_corpus_still_generates() {
    let chat = Arc::new(ScriptedChatModel::default());
    let (generator, memory) = generator_for("   \n\n   ", 5, chat.clone()).await;

    let reply = generator.generate_reply("anyone there?").await.unwrap();
    assert_eq!(reply, "reply 1");
    assert!(chat.prompts.lock()[0].contains("Use this roast context for inspiration: \n\n"));
    assert_eq!(memory.len(), 1);
}

#[tokio::test]
async fn test_chat_failure_leaves_memory_untouched() {
    let chat = Arc::new(ScriptedChatModel {
        fail: true,
        ..Default::default()
    });
    let (generator, memory) = generator_for("abcdefghij", 5, chat).await;

    let err = generator.generate_reply("hello").await.unwrap_err();
    assert!(matches!(err, AppError::Generation(_)));
    assert!(memory.is_empty());
}

#[test]
fn test_missing_corpus_is_fatal_error() {
    let err = load_and_chunk("/nonexistent/roast_data.txt", 100).unwrap_err();
    assert!(matches!(err, AppError::CorpusNotFound { .. }));
}
