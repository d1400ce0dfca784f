use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::utils::llm_json::ParseError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported subject: {0}")]
    UnsupportedSubject(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Failed to parse LLM response: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Failure of a single remote model call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned an unexpected response: {reason}")]
    InvalidResponse {
        provider: &'static str,
        reason: String,
    },
}

/// One failed link of the provider chain.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("No Gemini API key provided")]
    MissingCredential,

    #[error("{}", describe_failures(.0))]
    Exhausted(Vec<ProviderFailure>),
}

fn describe_failures(failures: &[ProviderFailure]) -> String {
    match failures {
        [] => "No provider was attempted".to_string(),
        [only] => format!(
            "{} failed: {}. No fallback API key provided.",
            only.provider, only.error
        ),
        all => all
            .iter()
            .map(|f| format!("{} failed: {}", f.provider, f.error))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Error::BadRequest(_) | Error::UnsupportedSubject(_) | Error::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Parse(_) | Error::Generation(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let detail = match self {
            Error::BadRequest(msg) => msg,
            Error::Validation(err) => err.to_string(),
            Error::Config(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(%detail, "request failed");
        }

        let body = Json(json!({ "detail": detail }));
        (status, body).into_response()
    }
}
