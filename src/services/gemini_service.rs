use crate::error::ProviderError;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "Gemini";

/// Exponential backoff applied to transient Gemini statuses.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,
    pub initial_delay: Duration,
    pub exp_base: f64,
    pub max_delay: Duration,
    pub jitter: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_secs(1),
            exp_base: 7.0,
            max_delay: Duration::from_secs(60),
            jitter: Duration::from_secs(1),
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// Delay before retry number `retry` (1-based), without jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = self.exp_base.powi(retry.saturating_sub(1) as i32);
        let secs = self.initial_delay.as_secs_f64() * factor;
        Duration::try_from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
            .unwrap_or(self.max_delay)
    }

    fn delay_with_jitter(&self, retry: u32) -> Duration {
        let jitter = self.jitter.as_secs_f64();
        let extra = if jitter > 0.0 {
            rand::thread_rng().gen_range(0.0..jitter)
        } else {
            0.0
        };
        self.base_delay(retry) + Duration::from_secs_f64(extra)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, or empty when the model
    /// produced none.
    fn first_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiService {
    pub fn new(client: Client, base_url: String, model: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            retry,
        }
    }

    pub async fn generate(
        &self,
        api_key: &str,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let payload = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
        };

        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            let res = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&payload)
                .send()
                .await
                .map_err(|source| ProviderError::Transport {
                    provider: PROVIDER,
                    source,
                })?;

            let status = res.status();
            if status.is_success() {
                let body: GenerateContentResponse =
                    res.json().await.map_err(|e| ProviderError::InvalidResponse {
                        provider: PROVIDER,
                        reason: e.to_string(),
                    })?;
                return Ok(body.first_text());
            }

            let text = res.text().await.unwrap_or_default();
            if attempt >= attempts || !self.retry.should_retry(status) {
                return Err(ProviderError::Api {
                    provider: PROVIDER,
                    status: status.as_u16(),
                    body: text,
                });
            }

            let delay = self.retry.delay_with_jitter(attempt);
            tracing::debug!(
                attempt,
                status = status.as_u16(),
                delay_ms = delay.as_millis() as u64,
                "Retrying Gemini request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
