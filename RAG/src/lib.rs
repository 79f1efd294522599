pub mod backend;
pub mod config;
pub mod document_processor;
pub mod embedding_service;
pub mod error;
pub mod gemini_service;
pub mod models;
pub mod prompts;
pub mod query_service;
pub mod text_splitter;
pub mod vector_index;

pub use backend::{Assistant, RagBackend};
pub use config::{EmbeddingBackend, Language, LlmConfig, RagConfig};
pub use document_processor::DocumentProcessor;
pub use embedding_service::{Embedder, GeminiEmbedder, TfIdfEmbedder};
pub use error::RagError;
pub use gemini_service::{CompletionProvider, GeminiService};
pub use models::*;
pub use query_service::QueryService;
pub use text_splitter::TextSplitter;
pub use vector_index::VectorIndex;
