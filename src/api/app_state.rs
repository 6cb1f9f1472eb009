use crate::models::ConversationTurn;
use crate::observability::AppMetrics;
use crate::services::generator::ResponseGenerator;
use crate::services::memory::{BoundedBuffer, ConversationMemory};
use parking_lot::Mutex;
use std::sync::Arc;

/// 展示记录最多保留的轮次（用户与回复各算一轮）
pub const TRANSCRIPT_CAPACITY: usize = 200;

/// Application state shared by all chat handlers
#[derive(Clone)]
pub struct AppState {
    /// Response generator driving the retrieval + LLM pipeline
    pub generator: Arc<ResponseGenerator>,
    /// Conversation memory used for prompt conditioning
    pub memory: Arc<ConversationMemory>,
    /// Display transcript, independent of the conversation memory
    pub transcript: Arc<Mutex<BoundedBuffer<ConversationTurn>>>,
    /// Request counters
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("generator", &"Arc<ResponseGenerator>")
            .field("memory_entries", &self.memory.len())
            .field("transcript_turns", &self.transcript.lock().len())
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(generator: Arc<ResponseGenerator>, metrics: Arc<AppMetrics>) -> Self {
        let memory = generator.memory().clone();
        Self {
            generator,
            memory,
            transcript: Arc::new(Mutex::new(BoundedBuffer::new(TRANSCRIPT_CAPACITY))),
            metrics,
        }
    }

    /// Replace the transcript with an empty one holding at most `capacity` turns
    pub fn with_transcript_capacity(mut self, capacity: usize) -> Self {
        self.transcript = Arc::new(Mutex::new(BoundedBuffer::new(capacity)));
        self
    }

    /// Append a user message and the reply shown for it
    pub fn record_exchange(&self, user_message: &str, reply: &str) {
        let mut transcript = self.transcript.lock();
        transcript.push(ConversationTurn::user(user_message));
        transcript.push(ConversationTurn::assistant(reply));
    }

    /// Clear the display transcript and the conversation memory
    pub fn clear_chat(&self) {
        self.transcript.lock().clear();
        self.memory.clear_memory();
    }
}
