use std::{fmt, time::Duration};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{PlannerError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A chat-completion endpoint.
///
/// `complete` returns the text content of the first choice, or `None` when the
/// endpoint answered without any text.
#[async_trait]
pub trait ChatBackend: Send + Sync + fmt::Debug {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<Option<String>>;
}

/// OpenAI-compatible chat-completion client.
#[derive(Clone)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    /// Fails with `MissingCredential` for an empty key; nothing is sent.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PlannerError::MissingCredential(
                "OpenAI API key is missing".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: build_http_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Build from `OPENAI_API_KEY`, honouring `OPENAI_BASE_URL` when set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            PlannerError::MissingCredential(
                "OPENAI_API_KEY environment variable must be set".to_string(),
            )
        })?;

        let client = Self::new(api_key)?;
        Ok(match std::env::var("OPENAI_BASE_URL") {
            Ok(base_url) => client.with_base_url(base_url),
            Err(_) => client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = build_http_client(timeout)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and return the raw response body.
    pub async fn chat_completion(&self, body: &Value) -> Result<Value> {
        let request_url = build_chat_url(&self.base_url);
        debug!(target: "trip_planner::http", url = %request_url, "sending chat completion");

        let response = self
            .http
            .post(&request_url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| PlannerError::transport("chat completion request failed", err))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|err| PlannerError::transport("failed to read chat completion body", err))?;

        if !status.is_success() {
            let api_message = serde_json::from_str::<Value>(&response_text)
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(|error| error.get("message"))
                        .and_then(|value| value.as_str())
                        .map(|s| s.to_string())
                })
                .unwrap_or(response_text);

            return Err(PlannerError::status(status.as_u16(), api_message));
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|err| {
            PlannerError::MalformedResponse(format!("chat completion body is not JSON: {err}"))
        })?;

        if let Some(error) = response_json.get("error") {
            let error_message = error
                .get("message")
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(PlannerError::Upstream {
                status: Some(status.as_u16()),
                message: format!("API error: {error_message}"),
                source: None,
            });
        }

        Ok(response_json)
    }
}

#[async_trait]
impl ChatBackend for OpenAIClient {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<Option<String>> {
        let response = self.chat_completion(&request.into_value()).await?;
        first_message_content(&response)
    }
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| PlannerError::Config(format!("failed to build HTTP client: {err}")))
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

/// Text of `choices[0].message.content`; empty text counts as absent.
pub(crate) fn first_message_content(response: &Value) -> Result<Option<String>> {
    let choices = response
        .get("choices")
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            PlannerError::MalformedResponse("chat completion has no `choices` array".to_string())
        })?;

    Ok(choices
        .first()
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .filter(|content| !content.trim().is_empty())
        .map(|content| content.to_string()))
}

/// Body of a chat-completion call.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    temperature: Option<f64>,
    response_format: Option<Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            response_format: None,
        }
    }

    pub fn with_system(self, content: impl Into<String>) -> Self {
        self.with_message("system", content)
    }

    pub fn with_user(self, content: impl Into<String>) -> Self {
        self.with_message("user", content)
    }

    fn with_message(mut self, role: &str, content: impl Into<String>) -> Self {
        self.messages.push(json!({
            "role": role,
            "content": content.into()
        }));
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_format(mut self, response_format: Value) -> Self {
        self.response_format = Some(response_format);
        self
    }

    /// Ask the endpoint for a single JSON object as the reply.
    pub fn json_object(self) -> Self {
        self.with_response_format(json!({ "type": "json_object" }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Value] {
        &self.messages
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// Content of the last `user` message.
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.get("role").and_then(Value::as_str) == Some("user"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        if let Some(response_format) = self.response_format {
            body["response_format"] = response_format;
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_fails_fast() {
        let err = OpenAIClient::new("  ").unwrap_err();
        assert_eq!(err.error_code(), "MISSING_CREDENTIAL");
    }

    #[test]
    fn test_chat_url() {
        assert_eq!(
            build_chat_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            build_chat_url("http://localhost:8080/chat/completions"),
            "http://localhost:8080/chat/completions"
        );
    }

    #[test]
    fn test_request_body() {
        let body = ChatCompletionRequest::new("gpt-4.1-mini")
            .with_system("You are a planner.")
            .with_user("Plan it.")
            .with_temperature(0.5)
            .json_object()
            .into_value();

        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Plan it.");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_first_message_content() {
        let response = json!({ "choices": [{ "message": { "content": "{}" } }] });
        assert_eq!(first_message_content(&response).unwrap().as_deref(), Some("{}"));

        let empty = json!({ "choices": [{ "message": { "content": null } }] });
        assert_eq!(first_message_content(&empty).unwrap(), None);

        let no_choices = json!({ "choices": [] });
        assert_eq!(first_message_content(&no_choices).unwrap(), None);

        let err = first_message_content(&json!({ "id": "x" })).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_RESPONSE");
    }
}
