use crate::models::{DocumentChunk, ScoredChunk};
use anyhow::{anyhow, Result};
use std::cmp::Ordering;

/// Flat in-memory index, searched exhaustively. Rebuilt on every setup.
pub struct VectorIndex {
    entries: Vec<(DocumentChunk, Vec<f32>)>,
    dimension: usize,
}

impl VectorIndex {
    pub fn build(chunks: Vec<DocumentChunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(anyhow!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            ));
        }

        let dimension = embeddings
            .first()
            .map(|e| e.len())
            .ok_or_else(|| anyhow!("Cannot build a vector index from zero chunks"))?;

        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimension) {
            return Err(anyhow!(
                "Embedding {} has {} dimensions, expected {}",
                bad,
                embeddings[bad].len(),
                dimension
            ));
        }

        log::info!("Built vector index: {} chunks, {} dimensions", chunks.len(), dimension);

        Ok(Self {
            entries: chunks.into_iter().zip(embeddings).collect(),
            dimension,
        })
    }

    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, (_, embedding))| {
                let score = if query.len() == self.dimension {
                    cosine_similarity(query, embedding)
                } else {
                    0.0
                };
                (idx, score)
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(idx, score)| ScoredChunk {
                chunk: self.entries[idx].0.clone(),
                score,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let min_len = a.len().min(b.len());

    let dot_product: f32 = a[..min_len]
        .iter()
        .zip(b[..min_len].iter())
        .map(|(x, y)| x * y)
        .sum();

    let norm_a: f32 = a[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
