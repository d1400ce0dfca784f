use crate::error::{GenerationError, ProviderError, ProviderFailure};
use crate::models::question::Difficulty;
use crate::models::subject::Subject;
use crate::services::gemini_service::GeminiService;
use crate::services::openai_service::OpenAiService;

/// Inputs of a single generation call. Credentials are already trimmed; an
/// absent `api_key` falls back to the server's configured key.
#[derive(Debug, Clone)]
pub struct GenerationParams<'a> {
    pub subject: Subject,
    pub difficulty: Difficulty,
    pub num_questions: i32,
    pub api_key: Option<&'a str>,
    pub fallback_api_key: Option<&'a str>,
    pub fallback_model: Option<&'a str>,
}

/// One link of the provider chain.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProviderAttempt<'a> {
    Gemini { api_key: &'a str },
    OpenAi { api_key: &'a str, model: &'a str },
}

impl ProviderAttempt<'_> {
    fn label(&self) -> String {
        match self {
            ProviderAttempt::Gemini { .. } => "Gemini".to_string(),
            ProviderAttempt::OpenAi { model, .. } => format!("Fallback model {}", model),
        }
    }
}

#[derive(Clone)]
pub struct QuestionGenerator {
    gemini: GeminiService,
    openai: OpenAiService,
    default_api_key: Option<String>,
    default_fallback_model: String,
}

impl QuestionGenerator {
    pub fn new(
        gemini: GeminiService,
        openai: OpenAiService,
        default_api_key: Option<String>,
        default_fallback_model: String,
    ) -> Self {
        Self {
            gemini,
            openai,
            default_api_key,
            default_fallback_model,
        }
    }

    /// Runs the provider chain and returns the raw text of the first provider
    /// that answers.
    pub async fn generate(&self, params: &GenerationParams<'_>) -> Result<String, GenerationError> {
        let chain = self.provider_chain(params)?;
        let system_instruction = params.subject.system_instruction();
        let prompt = build_prompt(params.subject, params.difficulty, params.num_questions);

        tracing::info!(
            subject = params.subject.key(),
            difficulty = %params.difficulty,
            num_questions = params.num_questions,
            providers = chain.len(),
            "Generating questions"
        );

        let mut failures = Vec::with_capacity(chain.len());
        for attempt in chain {
            match self.run(&attempt, &system_instruction, &prompt).await {
                Ok(text) => {
                    if !failures.is_empty() {
                        tracing::info!(provider = %attempt.label(), "Fallback provider succeeded");
                    }
                    return Ok(text);
                }
                Err(error) => {
                    tracing::warn!(provider = %attempt.label(), %error, "Provider failed");
                    failures.push(ProviderFailure {
                        provider: attempt.label(),
                        error,
                    });
                }
            }
        }

        Err(GenerationError::Exhausted(failures))
    }

    fn provider_chain<'a>(
        &'a self,
        params: &GenerationParams<'a>,
    ) -> Result<Vec<ProviderAttempt<'a>>, GenerationError> {
        let api_key = params
            .api_key
            .or(self.default_api_key.as_deref())
            .ok_or(GenerationError::MissingCredential)?;

        let mut chain = vec![ProviderAttempt::Gemini { api_key }];
        if let Some(fallback_key) = params.fallback_api_key {
            chain.push(ProviderAttempt::OpenAi {
                api_key: fallback_key,
                model: params
                    .fallback_model
                    .unwrap_or(self.default_fallback_model.as_str()),
            });
        }
        Ok(chain)
    }

    async fn run(
        &self,
        attempt: &ProviderAttempt<'_>,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        match attempt {
            ProviderAttempt::Gemini { api_key } => {
                self.gemini.generate(api_key, system_instruction, prompt).await
            }
            ProviderAttempt::OpenAi { api_key, model } => {
                self.openai
                    .complete(api_key, model, system_instruction, prompt)
                    .await
            }
        }
    }
}

pub fn build_prompt(subject: Subject, difficulty: Difficulty, num_questions: i32) -> String {
    format!(
        "Generate {} {} difficulty MCQ questions on {}. \
         Follow the JSON format described in your instructions.",
        num_questions, difficulty, subject
    )
}
