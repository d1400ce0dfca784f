use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

const LOCAL_FRONTEND_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub openai_base_url: String,
    pub default_fallback_model: String,
    pub llm_timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_initial_delay_secs: f64,
    pub retry_exp_base: f64,
    pub retry_max_delay_secs: f64,
    pub retry_jitter_secs: f64,
    pub vercel_url: Option<String>,
    pub extra_cors_origins: Vec<String>,
    pub log_json: bool,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        // Render provides its environment directly.
        if env::var("RENDER").is_err() {
            dotenv().ok();
        }

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8000"),
            gemini_api_key: get_env_opt("GEMINI_API_KEY"),
            gemini_model: get_env_or("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_base_url: get_env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            openai_base_url: get_env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            default_fallback_model: get_env_or("FALLBACK_MODEL", "gpt-3.5-turbo"),
            llm_timeout_secs: get_env_parse_or("LLM_TIMEOUT_SECS", 120)?,
            retry_attempts: get_env_parse_or("GEMINI_RETRY_ATTEMPTS", 3)?,
            retry_initial_delay_secs: get_env_parse_or("GEMINI_RETRY_INITIAL_DELAY_SECS", 1.0)?,
            retry_exp_base: get_env_parse_or("GEMINI_RETRY_EXP_BASE", 7.0)?,
            retry_max_delay_secs: get_env_parse_or("GEMINI_RETRY_MAX_DELAY_SECS", 60.0)?,
            retry_jitter_secs: get_env_parse_or("GEMINI_RETRY_JITTER_SECS", 1.0)?,
            vercel_url: get_env_opt("VERCEL_URL"),
            extra_cors_origins: get_env_opt("CORS_EXTRA_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or_default(),
            log_json: get_env_opt("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Origins the browser frontend may call from.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![LOCAL_FRONTEND_ORIGIN.to_string()];
        if let Some(host) = &self.vercel_url {
            origins.push(format!("https://{}", host.trim_end_matches('/')));
        }
        for origin in &self.extra_cors_origins {
            if !origins.contains(origin) {
                origins.push(origin.clone());
            }
        }
        origins
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
