use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use toolbridge_application::{LanguageModel, ModelError, ProbeError, ReadinessProbe};
use tracing::{debug, trace, warn};

use crate::config::FileOllamaConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the model host.
///
/// Separate from the backend client: generation on a cold model can run for
/// minutes, so only `request_timeout_ms` bounds a request.
pub fn model_http_client(config: &FileOllamaConfig) -> reqwest::Client {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("toolbridge/", env!("CARGO_PKG_VERSION")));
    if let Some(ms) = config.request_timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default model HTTP client");
        reqwest::Client::new()
    })
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// HTTP client for one Ollama host and model
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaClient {
    pub fn new(http: reqwest::Client, config: &FileOllamaConfig) -> Self {
        Self {
            http,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Client with its own HTTP stack from [`model_http_client`]
    pub fn from_config(config: &FileOllamaConfig) -> Self {
        Self::new(model_http_client(config), config)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };
        debug!(model = %self.model, "Sending chat request");

        let response = self
            .http
            .post(self.url("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;
        let content = reply.message.map(|m| m.content).unwrap_or_default();
        trace!(content = %content, "Model reply");
        Ok(content)
    }
}

#[async_trait]
impl ReadinessProbe for OllamaClient {
    fn dependency(&self) -> String {
        format!("Ollama at {}", self.host)
    }

    async fn probe(&self) -> Result<bool, ProbeError> {
        let response = self
            .http
            .get(self.url("/v1/models"))
            .send()
            .await
            .map_err(|e| ProbeError(e.to_string()))?;
        Ok(response.status().is_success())
    }
}
