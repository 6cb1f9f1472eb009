//! OpenAI 兼容的聊天补全客户端
//!
//! 适用于 NVIDIA NIM、OpenAI 以及其他实现 `/v1/chat/completions` 的服务。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::config::LlmConfig;
use crate::error::{AppError, Result};
use crate::llm::{ChatMessage, ChatModel, CompletionOptions};

fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// 拼出资源地址，`base_url` 可带或不带 `/v1` 后缀
pub fn endpoint(base_url: &str, resource: &str) -> String {
    let normalized = base_url.trim_end_matches('/');
    if normalized.ends_with(&format!("/{}", resource)) {
        return normalized.to_string();
    }
    if has_version_suffix(normalized) {
        return format!("{}/{}", normalized, resource);
    }
    format!("{}/v1/{}", normalized, resource)
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiCompatChatModel {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model_name: String,
}

impl OpenAiCompatChatModel {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model_name: config.model_name.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatChatModel {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model_name,
            messages: &messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let mut request = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "chat completion failed ({}): {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::Generation("chat completion returned no content".to_string())
            })?;

        debug!(
            model = %self.model_name,
            reply_chars = content.chars().count(),
            "Chat completion received"
        );
        Ok(content)
    }
}

pub fn create_chat_model(config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
    let model = OpenAiCompatChatModel::new(config)?;
    if config.api_key.is_none() {
        tracing::warn!(
            "No API key configured for {}; requests will be sent unauthenticated",
            model.model_name()
        );
    }
    Ok(Arc::new(model))
}
