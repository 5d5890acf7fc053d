use std::env;
use thiserror::Error;

pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GROQ_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("failed to construct HTTP client: {0}")]
    Initialization(String),
}

/// Settings for the documentation assistant, gathered once at startup.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub model: String,
    pub ollama_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub knowledge_url: String,
    pub qdrant_url: String,
    pub collection: String,
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self {
            model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "gpt-oss:latest".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            embedding_model: env::var("OLLAMA_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "snowflake-arctic-embed2".to_string()),
            embedding_dimensions: env::var("OLLAMA_EMBEDDING_DIMENSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            knowledge_url: env::var("KNOWLEDGE_URL")
                .unwrap_or_else(|_| "https://docs.agno.com/llms-full.txt".to_string()),
            qdrant_url: env::var("QDRANT_URL")
                .unwrap_or_else(|_| "http://localhost:6333".to_string()),
            collection: env::var("KNOWLEDGE_COLLECTION")
                .unwrap_or_else(|_| "agno_assist_knowledge".to_string()),
        }
    }
}

/// Settings for the data analyst. The API key stays optional here so the
/// missing-credential case surfaces as a user-facing error instead of a
/// startup panic.
#[derive(Debug, Clone)]
pub struct AnalystConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub api_url: String,
}

impl AnalystConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("GROQ_API_KEY").ok(),
            model: env::var("GROQ_MODEL").unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            temperature: env::var("GROQ_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.2),
            api_url: env::var("GROQ_API_URL").unwrap_or_else(|_| DEFAULT_GROQ_API_URL.to_string()),
        }
    }
}
