use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::utils::llm_json::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated question set as returned to the caller.
///
/// `questions` is whatever the model put under its `questions` key. Each entry
/// is expected to look like `{id, question, options: {A..D}, correct_answer,
/// explanation}` but neither the shape nor the count is checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub subject: String,
    pub difficulty: Difficulty,
    pub num_questions: i32,
    pub questions: JsonValue,
}

impl QuestionSet {
    pub fn from_parsed(
        subject: String,
        difficulty: Difficulty,
        num_questions: i32,
        parsed: JsonValue,
    ) -> Result<Self, ParseError> {
        let mut object = match parsed {
            JsonValue::Object(map) => map,
            other => return Err(ParseError::NotAnObject(json_kind(&other))),
        };
        let questions = object
            .remove("questions")
            .unwrap_or_else(|| JsonValue::Array(Vec::new()));

        Ok(Self {
            subject,
            difficulty,
            num_questions,
            questions,
        })
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
