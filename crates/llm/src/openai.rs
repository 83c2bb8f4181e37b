//! OpenAI Provider
//!
//! Implementation of the LlmProvider trait for the OpenAI chat-completions
//! API. Any OpenAI-compatible endpoint (Ollama's `/v1` API, vLLM, LiteLLM)
//! can be targeted through `base_url`, given either as the API root or as
//! the full `/chat/completions` URL.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, MessageContent, MessageRole,
    ProviderConfig, StopReason, ToolCall, ToolDefinition, UsageStats,
};
use crate::http_client::build_http_client;

/// Default OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(config.request_timeout_secs)?;
        Ok(Self { config, client })
    }

    /// API root without the trailing `/chat/completions`
    fn api_root(&self) -> &str {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(OPENAI_API_URL)
            .trim_end_matches('/');
        base.strip_suffix("/chat/completions").unwrap_or(base)
    }

    /// Get the chat-completions URL
    fn base_url(&self) -> String {
        format!("{}/chat/completions", self.api_root())
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.api_root())
    }

    /// The bearer token, if one is required.
    ///
    /// Custom endpoints (local Ollama) may run without a key; the public
    /// OpenAI endpoint always needs one.
    fn api_key(&self) -> LlmResult<Option<&str>> {
        match (&self.config.api_key, &self.config.base_url) {
            (Some(key), _) => Ok(Some(key.as_str())),
            (None, Some(_)) => Ok(None),
            (None, None) => Err(missing_api_key_error("openai")),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> LlmResult<reqwest::RequestBuilder> {
        Ok(match self.api_key()? {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        })
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: &[ToolDefinition],
        request_options: &LlmRequestOptions,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "stream": false,
            "temperature": request_options
                .temperature_override
                .unwrap_or(self.config.temperature),
        });

        let mut openai_messages: Vec<serde_json::Value> = Vec::new();

        if let Some(sys) = system {
            openai_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }

        for msg in messages {
            openai_messages.extend(self.message_to_openai(msg));
        }

        body["messages"] = serde_json::json!(openai_messages);

        if !tools.is_empty() {
            let openai_tools: Vec<serde_json::Value> =
                tools.iter().map(|t| self.tool_to_openai(t)).collect();
            body["tools"] = serde_json::json!(openai_tools);
        }

        body
    }

    /// Convert a Message to OpenAI API format.
    ///
    /// Tool results become one `tool` role message each.
    fn message_to_openai(&self, message: &Message) -> Vec<serde_json::Value> {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        };

        let tool_results: Vec<serde_json::Value> = message
            .content
            .iter()
            .filter_map(|c| match c {
                MessageContent::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => Some(serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tool_use_id,
                    "content": content
                })),
                _ => None,
            })
            .collect();

        if !tool_results.is_empty() {
            return tool_results;
        }

        let text_content = message.text_content();

        let tool_calls: Vec<serde_json::Value> = message
            .content
            .iter()
            .filter_map(|c| match c {
                MessageContent::ToolUse { id, name, input } => Some(serde_json::json!({
                    "id": id,
                    "type": "function",
                    "function": {
                        "name": name,
                        "arguments": input.to_string()
                    }
                })),
                _ => None,
            })
            .collect();

        if !tool_calls.is_empty() {
            let mut msg = serde_json::json!({
                "role": role,
                "tool_calls": tool_calls
            });

            // Some OpenAI-compatible APIs require content even for pure tool calls.
            if text_content.is_empty() {
                msg["content"] = serde_json::Value::Null;
            } else {
                msg["content"] = serde_json::json!(text_content);
            }

            return vec![msg];
        }

        vec![serde_json::json!({
            "role": role,
            "content": text_content
        })]
    }

    /// Convert a ToolDefinition to OpenAI API format
    fn tool_to_openai(&self, tool: &ToolDefinition) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema
            }
        })
    }

    /// Parse a response from OpenAI API
    fn parse_response(&self, response: &OpenAIResponse) -> LlmResponse {
        let choice = response.choices.first();

        let mut content = None;
        let mut tool_calls = Vec::new();

        if let Some(msg) = choice.and_then(|c| c.message.as_ref()) {
            content = msg.content.clone();

            for tc in msg.tool_calls.iter().flatten() {
                // Unparseable arguments surface to the tool as a bad-argument error.
                let arguments: serde_json::Value = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::Null);

                tool_calls.push(ToolCall {
                    id: tc.id.clone(),
                    name: tc.function.name.clone(),
                    arguments,
                });
            }
        }

        let stop_reason = choice
            .and_then(|c| c.finish_reason.as_ref())
            .map(|r| StopReason::from(r.as_str()))
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .as_ref()
            .map(|u| UsageStats {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        LlmResponse {
            content,
            tool_calls,
            stop_reason,
            usage,
            model: response.model.clone(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let body =
            self.build_request_body(&messages, system.as_deref(), &tools, &request_options);

        debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.len(),
            "sending chat completion request"
        );

        let response = self
            .authorize(self.client.post(self.base_url()))?
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, "openai"));
        }

        let openai_response: OpenAIResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(self.parse_response(&openai_response))
    }

    async fn health_check(&self) -> LlmResult<()> {
        let response = self
            .authorize(self.client.get(self.models_url()))?
            .send()
            .await
            .map_err(|e| LlmError::ProviderUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_http_error(status, &body, "openai"))
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
