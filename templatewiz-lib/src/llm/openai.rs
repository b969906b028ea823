//! OpenAI-compatible `/chat/completions` client.
//!
//! Works against OpenAI itself and the many proxies and local servers that
//! speak the same API (LiteLLM, OpenRouter, vLLM, Ollama's OpenAI endpoint).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FetchError, LlmError};
use crate::llm::{LanguageModel, Message};
use crate::net::classify;
use crate::retry::{retry_with_backoff, RetryConfig};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAiCompatibleModel {
    client: reqwest::blocking::Client,
    endpoint: Url,
    api_key: Option<String>,
    retry: RetryConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatibleModel {
    pub fn new(
        api_base: &str,
        api_key: Option<String>,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, LlmError> {
        let base = api_base.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}/chat/completions"))
            .map_err(|e| LlmError::Decode(format!("invalid API base {api_base:?}: {e}")))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            retry,
        })
    }

    fn complete_once(&self, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().map_err(|e| classify(&self.endpoint, e))?;

        let status = response.status();
        let body = response.text().map_err(|e| classify(&self.endpoint, e))?;
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Decode(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

impl LanguageModel for OpenAiCompatibleModel {
    fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model,
            messages,
            temperature,
        };
        log::debug!("completion request: model={model} messages={}", messages.len());
        retry_with_backoff(
            &self.retry,
            "chat completion",
            LlmError::is_transient,
            || self.complete_once(&request),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn sends_messages_and_reads_first_choice() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok(mut request) = server.recv() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let auth = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.to_string());
                let _ = tx.send((request.url().to_string(), body, auth));
                let reply = r#"{"choices":[{"message":{"role":"assistant","content":"[\"a\"]"}}]}"#;
                let _ = request.respond(tiny_http::Response::from_string(reply));
            }
        });

        let model = OpenAiCompatibleModel::new(
            &format!("http://127.0.0.1:{port}/v1/"),
            Some("sk-test".into()),
            Duration::from_secs(5),
            RetryConfig::none(),
        )
        .unwrap();
        let text = model
            .complete(&[Message::user("hi")], "gpt-4o-mini", 0.1)
            .unwrap();
        assert_eq!(text, "[\"a\"]");

        let (path, body, auth) = rx.recv().unwrap();
        assert_eq!(path, "/v1/chat/completions");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    }

    #[test]
    fn client_errors_surface_status() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let response = tiny_http::Response::from_string("bad key").with_status_code(401);
                let _ = request.respond(response);
            }
        });
        let model = OpenAiCompatibleModel::new(
            &format!("http://127.0.0.1:{port}"),
            None,
            Duration::from_secs(5),
            RetryConfig::default(),
        )
        .unwrap();
        match model.complete(&[Message::user("hi")], "m", 0.0) {
            Err(LlmError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
