use crate::{error::InferenceError, log_internal};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,
    pub content: String,
}

#[allow(non_camel_case_types)] // Serialized literally; case matters
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChatMessageRole {
    system,
    user,
    assistant,
}

#[derive(serde::Serialize)]
struct LlmChatRequest<'a> {
    /// LLM model name
    model: &'a str,
    /// Chat conversation to continue.
    messages: &'a [ChatMessage],
    /// Whether to stream one token at a time, or return entire response is one go
    stream: bool,
}

#[derive(serde::Deserialize)]
struct LlmChatResponse {
    message: LlmChatResponseMessage,
}

// Only the content matters; the server also echoes the role.
#[derive(serde::Deserialize)]
struct LlmChatResponseMessage {
    content: String,
}

#[derive(serde::Deserialize)]
struct LlmTagsResponse {
    #[serde(default)]
    models: Vec<LlmTag>,
}

#[derive(serde::Deserialize)]
struct LlmTag {
    name: String,
}

/// Inference server operations
#[serenity::async_trait]
pub trait ModelClient: Sync + Send {
    /// Names of the models the server at `url` can serve.  Empty if the server could not be
    /// queried.
    async fn list_models(&self, url: &str) -> Vec<String>;
    /// Continue the conversation in `messages`, returning the model's reply.
    async fn chat(
        &self,
        url: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, InferenceError>;
}

/// Talks to an Ollama-compatible HTTP API
pub struct OllamaClient {
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn fetch_models(&self, url: &str) -> Result<Vec<String>, InferenceError> {
        let url = endpoint(url, "api/tags");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| InferenceError::Request {
                url: url.clone(),
                source,
            })?;
        let tags = checked(response, &url)?
            .json::<LlmTagsResponse>()
            .await
            .map_err(|source| InferenceError::Decode { url, source })?;

        Ok(tags.models.into_iter().map(|tag| tag.name).collect())
    }
}

#[serenity::async_trait]
impl ModelClient for OllamaClient {
    async fn list_models(&self, url: &str) -> Vec<String> {
        log_internal!("Fetching model list from {}... ", url);
        match self.fetch_models(url).await {
            Ok(models) => {
                log_internal!("Fetching model list from {}... {} found", url, models.len());
                models
            }
            Err(e) => {
                log_internal!("Fetching model list from {}... failed: {}", url, e);
                Vec::new()
            }
        }
    }

    async fn chat(
        &self,
        url: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, InferenceError> {
        let url = endpoint(url, "api/chat");
        let request = LlmChatRequest {
            model,
            messages,
            stream: false,
        };

        log_internal!("Sending request to chat endpoint {}... ", url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| InferenceError::Request {
                url: url.clone(),
                source,
            })?;
        let response = checked(response, &url)?
            .json::<LlmChatResponse>()
            .await
            .map_err(|source| InferenceError::Decode {
                url: url.clone(),
                source,
            })?;
        log_internal!("Sending request to chat endpoint {}... done", url);

        Ok(response.message.content)
    }
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

fn checked(response: reqwest::Response, url: &str) -> Result<reqwest::Response, InferenceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(InferenceError::Status {
            url: url.to_owned(),
            status,
        })
    }
}
