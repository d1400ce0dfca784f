pub mod gemini_service;
pub mod generator_service;
pub mod openai_service;
