use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, warn};

use crate::{
    api::{app_state::AppState, dto::chat_dto::*},
    error::AppError,
};

/// 空消息的固定回复
pub const EMPTY_MESSAGE_REPLY: &str = "You sent me nothing? Even your messages are empty, just like your GitHub contribution graph. 🔥";

/// 生成失败时展示给用户的文本
pub fn failure_reply(err: &AppError) -> String {
    format!("Even I broke trying to roast you. Error: {}", err)
}

pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatResponse>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    state.metrics.record_chat_request();

    if request.message.trim().is_empty() {
        debug!("Blank message received, skipping generation");
        state.metrics.record_empty_message();
        state.record_exchange(&request.message, EMPTY_MESSAGE_REPLY);
        return Ok((
            StatusCode::OK,
            Json(ChatResponse {
                reply: EMPTY_MESSAGE_REPLY.to_string(),
                failed: false,
            }),
        ));
    }

    let start = std::time::Instant::now();
    let result = state.generator.generate_reply(&request.message).await;
    state
        .metrics
        .record_chat_latency(start.elapsed().as_millis() as u64);

    let (status, response) = match result {
        Ok(reply) => (
            StatusCode::OK,
            ChatResponse {
                reply,
                failed: false,
            },
        ),
        Err(err) => {
            warn!("Reply generation failed: {}", err);
            state.metrics.record_chat_failure();
            let (code, _): (u16, String) = (&err).into();
            (
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                ChatResponse {
                    reply: failure_reply(&err),
                    failed: true,
                },
            )
        }
    };

    state.record_exchange(&request.message, &response.reply);
    Ok((status, Json(response)))
}

pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    let turns = state.transcript.lock().snapshot();
    let total = turns.len();
    Json(HistoryResponse { turns, total })
}

pub async fn clear_history(State(state): State<AppState>) -> impl IntoResponse {
    state.clear_chat();
    debug!("Chat cleared");
    StatusCode::NO_CONTENT
}

pub async fn get_memory(State(state): State<AppState>) -> impl IntoResponse {
    Json(MemoryResponse {
        capacity: state.memory.capacity(),
        entries: state.memory.get_memory(),
    })
}
