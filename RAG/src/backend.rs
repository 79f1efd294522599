use crate::config::{EmbeddingBackend, RagConfig};
use crate::document_processor::DocumentProcessor;
use crate::embedding_service::{Embedder, GeminiEmbedder, TfIdfEmbedder};
use crate::error::RagError;
use crate::gemini_service::CompletionProvider;
use crate::models::*;
use crate::prompts;
use crate::query_service::QueryService;
use crate::text_splitter::TextSplitter;
use crate::vector_index::VectorIndex;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// What the chat shell needs from the backend. Neither call fails: setup
/// reports success as a flag and questions always get some text back.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn setup_rag_chain(&self) -> bool;

    async fn ask_question(&self, question: &str) -> String;

    fn is_ready(&self) -> bool;
}

struct Pipeline {
    embedder: Box<dyn Embedder>,
    index: VectorIndex,
}

pub struct RagBackend {
    config: RagConfig,
    query_service: QueryService,
    pipeline: RwLock<Option<Pipeline>>,
    ready: AtomicBool,
}

impl RagBackend {
    pub fn new(config: RagConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let query_service = QueryService::new(provider.clone(), config.language, config.top_k);
        log::info!(
            "RAG backend created (model: {}, embeddings: {:?}, docs: {})",
            provider.model_name(),
            config.embeddings,
            config.pdf_directory.display()
        );

        Self {
            config,
            query_service,
            pipeline: RwLock::new(None),
            ready: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Loads the PDF folder and builds the index from scratch.
    pub async fn try_setup(&self) -> Result<usize> {
        self.clear().await;

        let directory = self.config.pdf_directory.clone();
        log::info!("Loading PDFs from {}", directory.display());

        // pdf-extract is blocking and can panic on malformed files.
        let documents = tokio::task::spawn_blocking({
            let directory = directory.clone();
            move || DocumentProcessor::new().load_directory(&directory)
        })
        .await
        .map_err(|e| anyhow!("PDF loading task failed: {}", e))??;

        if documents.is_empty() {
            return Err(RagError::NoDocuments(directory.display().to_string()).into());
        }

        self.index_documents(documents).await
    }

    /// Chunks, embeds and indexes already-extracted pages, replacing any
    /// previous index. Returns the number of indexed chunks.
    pub async fn index_documents(&self, documents: Vec<Document>) -> Result<usize> {
        self.clear().await;

        if documents.is_empty() {
            return Err(RagError::NoDocuments(self.config.pdf_directory.display().to_string()).into());
        }

        let splitter = TextSplitter::new(self.config.chunk_size, self.config.chunk_overlap)?;
        let chunks = splitter.split_documents(&documents);
        if chunks.is_empty() {
            return Err(anyhow!("Documents contain no extractable text"));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        log::info!("Embedding {} chunks ({:?})", texts.len(), self.config.embeddings);

        let (embedder, embeddings): (Box<dyn Embedder>, Vec<Vec<f32>>) = match self.config.embeddings {
            EmbeddingBackend::Local => {
                // Fitting and embedding the whole corpus is CPU bound.
                let (embedder, embeddings) = tokio::task::spawn_blocking(move || {
                    let embedder = TfIdfEmbedder::fit(&texts);
                    let embeddings = embedder.embed_all(&texts);
                    (embedder, embeddings)
                })
                .await
                .map_err(|e| anyhow!("Embedding task failed: {}", e))?;
                (Box::new(embedder) as Box<dyn Embedder>, embeddings)
            }
            EmbeddingBackend::Gemini => {
                let embedder = GeminiEmbedder::new(&self.config.llm);
                let embeddings = embedder.embed_documents(&texts).await?;
                (Box::new(embedder) as Box<dyn Embedder>, embeddings)
            }
        };

        log::info!("Embedded {} chunks with {}", embeddings.len(), embedder.name());
        let index = VectorIndex::build(chunks, embeddings)?;
        let chunk_count = index.len();

        *self.pipeline.write().await = Some(Pipeline { embedder, index });
        self.ready.store(true, Ordering::SeqCst);

        log::info!("Assistant ready: {} chunks indexed", chunk_count);
        Ok(chunk_count)
    }

    pub async fn try_ask(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::EmptyQuestion.into());
        }
        if !self.is_ready() {
            return Err(RagError::NotReady.into());
        }

        let pipeline = self.pipeline.read().await;
        let pipeline = pipeline.as_ref().ok_or(RagError::NotReady)?;

        self.query_service
            .query(question, pipeline.embedder.as_ref(), &pipeline.index)
            .await
    }

    /// Drops the current index so a failed rebuild never answers from it.
    async fn clear(&self) {
        self.ready.store(false, Ordering::SeqCst);
        *self.pipeline.write().await = None;
    }

    pub fn fallback_answer(&self) -> &'static str {
        prompts::fallback_answer(self.config.language)
    }
}

#[async_trait]
impl Assistant for RagBackend {
    async fn setup_rag_chain(&self) -> bool {
        match self.try_setup().await {
            Ok(_) => true,
            Err(e) => {
                log::error!("RAG setup failed: {:#}", e);
                false
            }
        }
    }

    async fn ask_question(&self, question: &str) -> String {
        log::info!("Question received ({} chars)", question.chars().count());

        match self.try_ask(question).await {
            Ok(answer) => answer.text,
            Err(e) => {
                log::error!("Answering failed: {:#}", e);
                self.fallback_answer().to_string()
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Language, LlmConfig};
    use crate::document_processor::pages_to_documents;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use tempfile::tempdir;

    /// Echoes a canned transform, then answers with the first context line.
    struct EchoProvider {
        calls: AtomicUsize,
        fail_answers: bool,
    }

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("Optimized query:") {
                return Ok("binary heap".to_string());
            }
            if self.fail_answers {
                return Err(anyhow!("503 Service Unavailable"));
            }
            let context = prompt
                .split("Context:\n")
                .nth(1)
                .and_then(|rest| rest.lines().next())
                .unwrap_or_default();
            Ok(format!("From the notes: {}", context))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    fn config(dir: PathBuf) -> RagConfig {
        RagConfig {
            pdf_directory: dir,
            chunk_size: 200,
            chunk_overlap: 20,
            top_k: 2,
            embeddings: EmbeddingBackend::Local,
            language: Language::English,
            llm: LlmConfig {
                api_key: "test-key".to_string(),
                api_base: "http://127.0.0.1:9".to_string(),
                model: "echo".to_string(),
                temperature: 0.3,
                max_output_tokens: None,
                embedding_model: "text-embedding-004".to_string(),
            },
        }
    }

    fn backend(dir: PathBuf, fail_answers: bool) -> (RagBackend, Arc<EchoProvider>) {
        let provider = Arc::new(EchoProvider {
            calls: AtomicUsize::new(0),
            fail_answers,
        });
        (RagBackend::new(config(dir), provider.clone()), provider)
    }

    fn course_pages() -> Vec<Document> {
        pages_to_documents(
            "week3.pdf",
            vec![
                "A binary heap is a complete binary tree stored in an array.".to_string(),
                "Dijkstra's algorithm uses a priority queue of tentative distances.".to_string(),
            ],
        )
    }

    #[tokio::test]
    async fn setup_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let (backend, _) = backend(dir.path().join("missing"), false);

        assert!(!backend.setup_rag_chain().await);
        assert!(!backend.is_ready());
    }

    #[tokio::test]
    async fn setup_fails_for_directory_without_pdfs() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "not a pdf").unwrap();
        let (backend, _) = backend(dir.path().to_path_buf(), false);

        let err = backend.try_setup().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RagError>(),
            Some(RagError::NoDocuments(_))
        ));
        assert!(!backend.setup_rag_chain().await);
        assert!(!backend.is_ready());
    }

    #[tokio::test]
    async fn questions_are_refused_until_ready() {
        let dir = tempdir().unwrap();
        let (backend, provider) = backend(dir.path().to_path_buf(), false);

        let err = backend.try_ask("What is a heap?").await.unwrap_err();
        assert_eq!(err.downcast_ref::<RagError>(), Some(&RagError::NotReady));
        assert_eq!(backend.ask_question("What is a heap?").await, "Sorry, an error occurred.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn indexed_documents_answer_questions() {
        let dir = tempdir().unwrap();
        let (backend, provider) = backend(dir.path().to_path_buf(), false);

        let chunks = backend.index_documents(course_pages()).await.unwrap();
        assert_eq!(chunks, 2);
        assert!(backend.is_ready());

        let answer = backend.try_ask("  What is a heap?  ").await.unwrap();
        assert_eq!(answer.transformed_query, "binary heap");
        assert_eq!(answer.sources[0].chunk.filename, "week3.pdf");
        assert_eq!(answer.sources[0].chunk.page, 0);
        assert_eq!(
            answer.text,
            "From the notes: A binary heap is a complete binary tree stored in an array."
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn blank_question_never_reaches_the_model() {
        let dir = tempdir().unwrap();
        let (backend, provider) = backend(dir.path().to_path_buf(), false);
        backend.index_documents(course_pages()).await.unwrap();

        let err = backend.try_ask(" \t\n").await.unwrap_err();
        assert_eq!(err.downcast_ref::<RagError>(), Some(&RagError::EmptyQuestion));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generation_failure_returns_the_apology() {
        let dir = tempdir().unwrap();
        let (backend, _) = backend(dir.path().to_path_buf(), true);
        backend.index_documents(course_pages()).await.unwrap();

        assert_eq!(backend.ask_question("What is a heap?").await, "Sorry, an error occurred.");
    }

    #[tokio::test]
    async fn turkish_backend_apologizes_in_turkish() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(EchoProvider {
            calls: AtomicUsize::new(0),
            fail_answers: true,
        });
        let mut config = config(dir.path().to_path_buf());
        config.language = Language::Turkish;
        let backend = RagBackend::new(config, provider);

        assert_eq!(backend.ask_question("Yığın nedir?").await, "Bir hata oluştu.");
    }

    #[tokio::test]
    async fn reindexing_replaces_the_previous_index() {
        let dir = tempdir().unwrap();
        let (backend, _) = backend(dir.path().to_path_buf(), false);
        backend.index_documents(course_pages()).await.unwrap();

        let replaced = backend
            .index_documents(pages_to_documents("week4.pdf", vec!["Tries store strings.".to_string()]))
            .await
            .unwrap();
        assert_eq!(replaced, 1);

        let answer = backend.try_ask("binary heap").await.unwrap();
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].chunk.filename, "week4.pdf");
    }

    #[tokio::test]
    async fn failed_setup_drops_the_previous_index() {
        let dir = tempdir().unwrap();
        let (backend, provider) = backend(dir.path().join("missing"), false);
        backend.index_documents(course_pages()).await.unwrap();
        assert!(backend.is_ready());

        assert!(!backend.setup_rag_chain().await);
        assert!(!backend.is_ready());
        assert!(backend.pipeline.read().await.is_none());
        assert_eq!(backend.ask_question("What is a heap?").await, "Sorry, an error occurred.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_reindex_drops_the_previous_index() {
        let dir = tempdir().unwrap();
        let (backend, _) = backend(dir.path().to_path_buf(), false);
        backend.index_documents(course_pages()).await.unwrap();

        let blank = pages_to_documents("scan.pdf", vec!["   ".to_string()]);
        assert!(backend.index_documents(blank).await.is_err());
        assert!(!backend.is_ready());
        assert!(backend.pipeline.read().await.is_none());
    }

    #[tokio::test]
    async fn pages_without_text_cannot_build_an_index() {
        let dir = tempdir().unwrap();
        let (backend, _) = backend(dir.path().to_path_buf(), false);

        let blank = pages_to_documents("scan.pdf", vec!["   ".to_string()]);
        assert!(backend.index_documents(blank).await.is_err());
        assert!(!backend.is_ready());
    }
}
