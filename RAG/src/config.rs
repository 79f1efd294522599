use crate::error::RagError;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Turkish,
}

impl FromStr for Language {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "tr" | "turkish" => Ok(Language::Turkish),
            other => Err(RagError::InvalidConfig(format!(
                "unknown language '{}', expected 'en' or 'tr'",
                other
            ))),
        }
    }
}

/// Which model turns chunks into vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// TF-IDF vectors fitted on the loaded corpus, no network.
    Local,
    /// Hosted Gemini embedding model.
    Gemini,
}

impl FromStr for EmbeddingBackend {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "tfidf" => Ok(EmbeddingBackend::Local),
            "gemini" => Ok(EmbeddingBackend::Gemini),
            other => Err(RagError::InvalidConfig(format!(
                "unknown embedding backend '{}', expected 'local' or 'gemini'",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub embedding_model: String,
}

// Hand-written so the key never ends up in a log line.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RagConfig {
    pub pdf_directory: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embeddings: EmbeddingBackend,
    pub language: Language,
    pub llm: LlmConfig,
}

impl RagConfig {
    /// Reads the process environment. Call `dotenv` before this if a `.env`
    /// file should be honored.
    pub fn from_env() -> Result<Self, RagError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RagError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("GEMINI_API_KEY").ok_or(RagError::MissingApiKey)?;

        let config = Self {
            pdf_directory: PathBuf::from(get("RAG_PDF_DIR").unwrap_or_else(|| "docs".to_string())),
            chunk_size: parse_or(get("RAG_CHUNK_SIZE"), "RAG_CHUNK_SIZE", 1000)?,
            chunk_overlap: parse_or(get("RAG_CHUNK_OVERLAP"), "RAG_CHUNK_OVERLAP", 200)?,
            top_k: parse_or(get("RAG_TOP_K"), "RAG_TOP_K", 4)?,
            embeddings: get("RAG_EMBEDDINGS")
                .map(|v| v.parse::<EmbeddingBackend>())
                .transpose()?
                .unwrap_or(EmbeddingBackend::Local),
            language: get("ASSISTANT_LANGUAGE")
                .map(|v| v.parse::<Language>())
                .transpose()?
                .unwrap_or(Language::English),
            llm: LlmConfig {
                api_key,
                api_base: get("GEMINI_API_BASE")
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string()),
                temperature: parse_or(get("GEMINI_TEMPERATURE"), "GEMINI_TEMPERATURE", 0.3)?,
                max_output_tokens: get("GEMINI_MAX_OUTPUT_TOKENS")
                    .map(|v| parse_value(&v, "GEMINI_MAX_OUTPUT_TOKENS"))
                    .transpose()?,
                embedding_model: get("GEMINI_EMBEDDING_MODEL")
                    .unwrap_or_else(|| "text-embedding-004".to_string()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::InvalidConfig("top_k must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(RagError::InvalidConfig(format!(
                "temperature {} is outside 0.0..=2.0",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, RagError> {
    match value {
        Some(v) => parse_value(&v, key),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(value: &str, key: &str) -> Result<T, RagError> {
    value
        .parse()
        .map_err(|_| RagError::InvalidConfig(format!("{} has invalid value '{}'", key, value)))
}
