use crate::error::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "OpenAI";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completion client used as the fallback provider.
#[derive(Clone)]
pub struct OpenAiService {
    client: Client,
    base_url: String,
}

impl OpenAiService {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn complete(
        &self,
        api_key: &str,
        model: &str,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let payload = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }

        let body: ChatResponse = res.json().await.map_err(|e| ProviderError::InvalidResponse {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER,
                reason: "no message content in choices".to_string(),
            })
    }
}
