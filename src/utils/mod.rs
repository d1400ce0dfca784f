pub mod llm_json;
