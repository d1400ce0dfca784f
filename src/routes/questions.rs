use crate::{
    dto::question_dto::GenerateQuestionsPayload,
    error::{Error, Result},
    models::{question::QuestionSet, subject::Subject},
    services::generator_service::GenerationParams,
    utils::llm_json::parse_llm_response,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

#[axum::debug_handler]
pub async fn generate_questions(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateQuestionsPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;

    let subject_key = payload.normalized_subject();
    let subject = Subject::from_key(&subject_key)
        .ok_or_else(|| Error::UnsupportedSubject(payload.subject.clone()))?;

    let params = GenerationParams {
        subject,
        difficulty: payload.difficulty,
        num_questions: payload.num_questions,
        api_key: payload.api_key.as_deref(),
        fallback_api_key: payload.fallback_api_key.as_deref(),
        fallback_model: payload.fallback_model.as_deref(),
    };
    let raw = state.question_generator.generate(&params).await?;

    let parsed = parse_llm_response(&raw)?;
    let set = QuestionSet::from_parsed(
        subject_key,
        payload.difficulty,
        payload.num_questions,
        parsed,
    )?;

    tracing::info!(
        subject = %set.subject,
        returned = set.questions.as_array().map(Vec::len).unwrap_or(0),
        "Question set ready"
    );

    Ok(Json(set))
}
