use crate::models::question::Difficulty;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuestionsPayload {
    pub subject: String,
    pub difficulty: Difficulty,
    #[validate(range(min = 1, max = 40, message = "num_questions must be between 1 and 40"))]
    pub num_questions: i32,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub api_key: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub fallback_api_key: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub fallback_model: Option<String>,
}

impl GenerateQuestionsPayload {
    /// Subject as echoed back in the response.
    pub fn normalized_subject(&self) -> String {
        self.subject.trim().to_lowercase()
    }
}

// Blank credentials from the frontend form count as absent.
fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
