//! Core `CompletionService` trait and `OpenAiCompletion` implementation.
//!
//! `OpenAiCompletion` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint exactly once per request. Connection details come from
//! [`CompletionConfig`]; the API key is supplied per call as a
//! [`Credential`] and is never stored.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::CompletionConfig;
use crate::llm::credential::Credential;

// ---------------------------------------------------------------------------
// CompletionError
// ---------------------------------------------------------------------------

/// Errors that can occur while calling the completion service.
///
/// These are passed through to the caller as-is; nothing here is retried.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The transport timed out.
    #[error("completion request timed out")]
    Timeout,

    /// The service answered with a non-success status (auth, quota, ...).
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response envelope was not the expected chat-completions JSON.
    #[error("unexpected completion envelope: {0}")]
    Envelope(String),

    /// The envelope carried no message content.
    #[error("completion service returned no content")]
    EmptyResponse,
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CompletionError::Timeout
        } else {
            CompletionError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// CompletionRequest
// ---------------------------------------------------------------------------

/// One chat-style request: a fixed system instruction, the user prompt, and
/// whether the payload must come back as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub json_output: bool,
}

impl CompletionRequest {
    /// Request whose response must be a JSON object.
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            json_output: true,
        }
    }
}

// ---------------------------------------------------------------------------
// CompletionService trait
// ---------------------------------------------------------------------------

/// Async trait for a text-completion backend.
///
/// Implementors must be `Send + Sync` so one instance can serve concurrent
/// calls (e.g. wrapped in `Arc<dyn CompletionService>`). They must not keep
/// the credential after the call returns.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `request` once and return the raw text payload of the reply.
    async fn complete(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<String, CompletionError>;
}

// ---------------------------------------------------------------------------
// OpenAiCompletion
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiCompletion {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl OpenAiCompletion {
    /// Build an `OpenAiCompletion` from application config.
    ///
    /// A client timeout is only installed when `config.timeout_secs` is set.
    /// A default client is used if the builder fails.
    pub fn from_config(config: &CompletionConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// JSON body for `request`.
    fn chat_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user",   "content": request.user   }
            ]
        });

        if request.json_output {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }
        if let Some(temperature) = self.config.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        body
    }
}

/// Pull `choices[0].message.content` out of a chat-completions envelope.
///
/// The content is returned untouched; deciding whether it is usable is the
/// decoder's job.
fn extract_content(envelope: &serde_json::Value) -> Result<String, CompletionError> {
    let choice = envelope
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| CompletionError::Envelope("missing choices[0]".into()))?;

    choice["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or(CompletionError::EmptyResponse)
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<String, CompletionError> {
        let body = self.chat_body(request);

        log::debug!(
            "POST {} (model={}, prompt_len={})",
            self.endpoint(),
            self.config.model,
            request.user.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Envelope(e.to_string()))?;

        extract_content(&envelope)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn make_config(base_url: &str) -> CompletionConfig {
        CompletionConfig {
            base_url: base_url.into(),
            model: "gpt-4".into(),
            api_key: None,
            timeout_secs: Some(5),
            temperature: None,
        }
    }

    /// Serve exactly one HTTP exchange with a canned response and hand back
    /// the raw request that was received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                if request_complete(&received) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).into_owned()
        });

        (base_url, handle)
    }

    fn request_complete(received: &[u8]) -> bool {
        let text = String::from_utf8_lossy(received);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        received.len() >= header_end + 4 + content_length
    }

    #[test]
    fn body_requests_json_object_output() {
        let service = OpenAiCompletion::from_config(&make_config("http://localhost"));
        let body = service.chat_body(&CompletionRequest::json("sys", "usr"));

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body.get("temperature").is_none());
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn body_carries_configured_temperature() {
        let mut config = make_config("http://localhost");
        config.temperature = Some(0.5);
        let service = OpenAiCompletion::from_config(&config);
        let body = service.chat_body(&CompletionRequest::json("s", "u"));

        assert_eq!(body["temperature"].as_f64(), Some(0.5));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let service = OpenAiCompletion::from_config(&make_config("https://api.example.com/"));
        assert_eq!(
            service.endpoint(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn extract_content_returns_payload_untouched() {
        let envelope = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  {\"a\": 1}\n" } }]
        });
        assert_eq!(extract_content(&envelope).unwrap(), "  {\"a\": 1}\n");
    }

    #[test]
    fn extract_content_without_choices_is_envelope_error() {
        let envelope = serde_json::json!({ "object": "chat.completion" });
        assert!(matches!(
            extract_content(&envelope),
            Err(CompletionError::Envelope(_))
        ));
    }

    #[test]
    fn extract_content_with_null_content_is_empty_response() {
        let envelope = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        });
        assert!(matches!(
            extract_content(&envelope),
            Err(CompletionError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn complete_sends_bearer_key_and_returns_content() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"overall_score\": 7}"}}]}"#,
        )
        .await;
        let service = OpenAiCompletion::from_config(&make_config(&base_url));

        let raw = service
            .complete(
                &CompletionRequest::json("sys", "usr"),
                &Credential::new("sk-test-1234"),
            )
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(raw, r#"{"overall_score": 7}"#);
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer sk-test-1234"));
        assert!(request.contains("json_object"));
    }

    #[tokio::test]
    async fn complete_surfaces_non_success_status() {
        let (base_url, server) = serve_once(
            "401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        )
        .await;
        let service = OpenAiCompletion::from_config(&make_config(&base_url));

        let err = service
            .complete(&CompletionRequest::json("s", "u"), &Credential::new("bad"))
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            CompletionError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_reports_connection_failure_as_request_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let service = OpenAiCompletion::from_config(&make_config(&base_url));
        let err = service
            .complete(&CompletionRequest::json("s", "u"), &Credential::new("k"))
            .await
            .unwrap_err();

        assert!(matches!(err, CompletionError::Request(_)));
    }

    #[test]
    fn service_is_object_safe() {
        let service: Box<dyn CompletionService> =
            Box::new(OpenAiCompletion::from_config(&make_config("http://localhost")));
        drop(service);
    }
}
