pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{
    gemini_service::{GeminiService, RetryPolicy},
    generator_service::QuestionGenerator,
    openai_service::OpenAiService,
};
use reqwest::Client;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub question_generator: QuestionGenerator,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let gemini = GeminiService::new(
            http_client.clone(),
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
            retry_policy(config)?,
        );
        let openai = OpenAiService::new(http_client, config.openai_base_url.clone());
        let question_generator = QuestionGenerator::new(
            gemini,
            openai,
            config.gemini_api_key.clone(),
            config.default_fallback_model.clone(),
        );

        Ok(Self { question_generator })
    }
}

fn retry_policy(config: &Config) -> Result<RetryPolicy> {
    let secs = |name: &str, value: f64| {
        Duration::try_from_secs_f64(value)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
    };

    if !config.retry_exp_base.is_finite() || config.retry_exp_base < 1.0 {
        return Err(Error::Config(format!(
            "Invalid value for GEMINI_RETRY_EXP_BASE: {} (must be a finite number >= 1)",
            config.retry_exp_base
        )));
    }

    Ok(RetryPolicy {
        attempts: config.retry_attempts,
        initial_delay: secs("GEMINI_RETRY_INITIAL_DELAY_SECS", config.retry_initial_delay_secs)?,
        exp_base: config.retry_exp_base,
        max_delay: secs("GEMINI_RETRY_MAX_DELAY_SECS", config.retry_max_delay_secs)?,
        jitter: secs("GEMINI_RETRY_JITTER_SECS", config.retry_jitter_secs)?,
        ..RetryPolicy::default()
    })
}
