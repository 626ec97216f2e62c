use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Missing required variables abort startup before any request is served.
#[derive(Debug, Clone)]
pub struct Config {
    pub qdrant_url: String,
    pub qdrant_api_key: String,
    pub openai_api_key: String,
    /// Logical partition of the vector store holding ingested resumes.
    pub qdrant_collection: String,
    /// Payload attribute that carries a record's resume text.
    pub resume_payload_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            qdrant_url: require_env("QDRANT_URL")?,
            qdrant_api_key: require_env("QDRANT_API_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            qdrant_collection: std::env::var("QDRANT_COLLECTION")
                .unwrap_or_else(|_| "resume_collection".to_string()),
            resume_payload_key: std::env::var("RESUME_PAYLOAD_KEY")
                .unwrap_or_else(|_| "resume_text".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
