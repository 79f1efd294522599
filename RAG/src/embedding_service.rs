use crate::config::LlmConfig;
use crate::models::*;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rayon::prelude::*;
use reqwest::Client;
use std::collections::{HashMap, HashSet};

const VOCABULARY_SIZE: usize = 1000;
const MIN_DIMENSIONS: usize = 100;
const EMBED_BATCH_SIZE: usize = 100;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// TF-IDF vectors over the corpus the embedder was fitted on.
pub struct TfIdfEmbedder {
    vocabulary: HashMap<String, usize>,
    idf_scores: HashMap<String, f32>,
    dimensions: usize,
}

impl TfIdfEmbedder {
    pub fn fit(texts: &[String]) -> Self {
        let mut word_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_frequencies: HashMap<String, usize> = HashMap::new();
        let total_docs = texts.len();

        for text in texts {
            let words = tokenize(text);
            let unique_words: HashSet<&String> = words.iter().collect();

            for word in &words {
                *word_counts.entry(word.clone()).or_insert(0) += 1;
            }

            for word in unique_words {
                *doc_frequencies.entry(word.clone()).or_insert(0) += 1;
            }
        }

        // Smoothed so a term present in every chunk still carries weight.
        let idf_scores: HashMap<String, f32> = doc_frequencies
            .iter()
            .map(|(word, df)| {
                let idf = ((1 + total_docs) as f32 / (1 + *df) as f32).ln() + 1.0;
                (word.clone(), idf)
            })
            .collect();

        let mut word_freq_pairs: Vec<_> = word_counts.into_iter().collect();
        word_freq_pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let vocabulary: HashMap<String, usize> = word_freq_pairs
            .into_iter()
            .take(VOCABULARY_SIZE)
            .enumerate()
            .map(|(idx, (word, _))| (word, idx))
            .collect();

        log::info!(
            "Fitted TF-IDF vocabulary of {} terms over {} chunks",
            vocabulary.len(),
            total_docs
        );

        Self {
            dimensions: vocabulary.len().max(MIN_DIMENSIONS),
            vocabulary,
            idf_scores,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let words = tokenize(text);
        let total_words = words.len() as f32;

        for (word, count) in count_words(&words) {
            if let Some(&idx) = self.vocabulary.get(word) {
                let tf = count as f32 / total_words;
                let idf = self.idf_scores.get(word).copied().unwrap_or(1.0);
                embedding[idx] = tf * idf;
            }
        }

        normalize(&mut embedding);
        embedding
    }

    pub fn embed_all(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.par_iter().map(|text| self.embed(text)).collect()
    }
}

#[async_trait]
impl Embedder for TfIdfEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.embed_all(texts))
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    fn name(&self) -> &str {
        "tf-idf"
    }
}

/// Hosted embedding model behind `batchEmbedContents`.
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            model: config.embedding_model.clone(),
        }
    }

    async fn embed_batch(&self, texts: &[String], task_type: &str) -> Result<Vec<Vec<f32>>> {
        let model = format!("models/{}", self.model);
        let request = EmbedContentRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: model.clone(),
                    content: GeminiContent::text(text.as_str()),
                    task_type: task_type.to_string(),
                })
                .collect(),
        };

        let url = format!("{}/{}:batchEmbedContents", self.api_base, model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Gemini embedding error {}: {}", status, error_text));
        }

        let body: EmbedContentResponse = response.json().await?;
        if body.embeddings.len() != texts.len() {
            return Err(anyhow!(
                "Gemini returned {} embeddings for {} texts",
                body.embeddings.len(),
                texts.len()
            ));
        }

        Ok(body.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch_no, batch) in texts.chunks(EMBED_BATCH_SIZE).enumerate() {
            log::debug!("Embedding batch {} ({} texts)", batch_no + 1, batch.len());
            embeddings.extend(self.embed_batch(batch, "RETRIEVAL_DOCUMENT").await?);
        }
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()], "RETRIEVAL_QUERY")
            .await?
            .pop()
            .ok_or_else(|| anyhow!("Gemini returned no query embedding"))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(|word| word.to_string())
        .collect()
}

fn count_words(words: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for word in words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }
    counts
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
