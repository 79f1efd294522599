use crate::error::RagError;
use crate::models::{Document, DocumentChunk};
use uuid::Uuid;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter. Tries paragraph, line, word and finally
/// character boundaries, merging small pieces back up to `chunk_size`
/// characters with `chunk_overlap` characters carried between chunks.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<DocumentChunk> {
        let chunks: Vec<DocumentChunk> = documents
            .iter()
            .flat_map(|document| {
                self.split_text(&document.content)
                    .into_iter()
                    .enumerate()
                    .map(|(chunk_index, content)| DocumentChunk {
                        id: Uuid::new_v4().to_string(),
                        filename: document.filename.clone(),
                        page: document.page,
                        chunk_index,
                        content,
                    })
            })
            .collect();

        log::info!("Split {} pages into {} chunks", documents.len(), chunks.len());
        chunks
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // First separator present in the text wins; "" always matches.
        let (separator, remaining) = match separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep.as_str()))
        {
            Some(i) => (separators[i].as_str(), &separators[i + 1..]),
            None => ("", &separators[separators.len()..]),
        };

        let mut good_splits: Vec<String> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() || separator.is_empty() {
                final_chunks.extend(trimmed(&piece));
            } else {
                final_chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Greedy merge of pieces that each fit, keeping a tail of at most
    /// `chunk_overlap` characters as the start of the next chunk.
    fn merge_splits(&self, splits: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: Vec<(&str, usize)> = Vec::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);

            if total + len > self.chunk_size && !window.is_empty() {
                chunks.extend(join_window(&window));

                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    let (_, first_len) = window.remove(0);
                    total -= first_len;
                }
            }

            window.push((split.as_str(), len));
            total += len;
        }

        chunks.extend(join_window(&window));
        chunks
    }
}

/// Splits on `separator`, attaching each separator to the start of the piece
/// that follows it. An empty separator splits into characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
        }
        start = idx;
    }
    pieces.push(text[start..].to_string());

    pieces.retain(|piece| !piece.is_empty());
    pieces
}

fn join_window(window: &[(&str, usize)]) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    trimmed(&joined)
}

fn trimmed(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(size: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(size, overlap).unwrap()
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(TextSplitter::new(10, 10).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(10, 9).is_ok());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = splitter(1000, 200).split_text("  A short page about stacks.  ");
        assert_eq!(chunks, vec!["A short page about stacks.".to_string()]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(splitter(10, 2).split_text("").is_empty());
        assert!(splitter(10, 2).split_text(" \n\n \n").is_empty());
    }

    #[test]
    fn words_are_merged_with_overlap() {
        let chunks = splitter(10, 4).split_text("aaa bbb ccc ddd");
        assert_eq!(
            chunks,
            vec!["aaa bbb".to_string(), "bbb ccc".to_string(), "ccc ddd".to_string()]
        );
    }

    #[test]
    fn paragraphs_are_preferred_boundaries() {
        let text = "First paragraph here.\n\nSecond one.";
        let chunks = splitter(25, 0).split_text(text);
        assert_eq!(
            chunks,
            vec!["First paragraph here.".to_string(), "Second one.".to_string()]
        );
    }

    #[test]
    fn oversized_words_fall_back_to_characters() {
        let chunks = splitter(4, 1).split_text("abcdefghij");
        assert_eq!(
            chunks,
            vec!["abcd".to_string(), "defg".to_string(), "ghij".to_string()]
        );
    }

    #[test]
    fn no_chunk_exceeds_the_size() {
        let text = "Binary search trees keep keys ordered. ".repeat(80)
            + "\n\n"
            + &"Hash tables trade order for speed.\n".repeat(40);
        let chunks = splitter(120, 30).split_text(&text);

        assert!(chunks.len() > 10);
        assert!(chunks.iter().all(|c| c.chars().count() <= 120));
        assert!(chunks.iter().all(|c| c.trim() == c));
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let text = "ağaç ğüşö çiçek";
        let chunks = splitter(9, 0).split_text(text);
        assert_eq!(chunks, vec!["ağaç ğüşö".to_string(), "çiçek".to_string()]);
    }

    #[test]
    fn documents_carry_metadata_into_chunks() {
        let documents = vec![
            Document {
                id: "d1".into(),
                filename: "week1.pdf".into(),
                page: 3,
                content: "aaa bbb ccc ddd".into(),
            },
            Document {
                id: "d2".into(),
                filename: "week2.pdf".into(),
                page: 0,
                content: "".into(),
            },
        ];

        let chunks = splitter(10, 4).split_documents(&documents);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.filename == "week1.pdf" && c.page == 3));
        assert_eq!(
            chunks.iter().map(|c| c.chunk_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }
}
