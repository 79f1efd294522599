use crate::models::*;
use anyhow::{Context, Result};
use pdf_extract::extract_text_by_pages;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use uuid::Uuid;

static RE_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]").expect("static regex"));
static RE_INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("static regex"));
static RE_TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m) +$").expect("static regex"));
static RE_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// Loads every PDF of a course folder as one `Document` per page.
pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Non-recursive. A missing directory is an error; a directory without
    /// PDFs yields an empty vector.
    pub fn load_directory(&self, documents_dir: &Path) -> Result<Vec<Document>> {
        let pdf_paths = self.list_pdfs(documents_dir)?;
        let mut documents = Vec::new();

        for file_path in &pdf_paths {
            let pages = self.process_pdf(file_path)?;
            documents.extend(pages);
        }

        log::info!(
            "Loaded {} pages from {} PDF files in {}",
            documents.len(),
            pdf_paths.len(),
            documents_dir.display()
        );
        Ok(documents)
    }

    pub fn list_pdfs(&self, documents_dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(documents_dir)
            .with_context(|| format!("Cannot read document directory {}", documents_dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_path = entry.path();

            if !entry.file_type()?.is_file() || is_hidden(&file_path) {
                continue;
            }

            if let Some(extension) = file_path.extension() {
                if extension.eq_ignore_ascii_case("pdf") {
                    paths.push(file_path);
                }
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn process_pdf(&self, file_path: &Path) -> Result<Vec<Document>> {
        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());

        log::info!("Processing PDF: {}", filename);

        let pages = extract_text_by_pages(file_path)
            .with_context(|| format!("Failed to extract text from {}", filename))?;

        Ok(pages_to_documents(&filename, pages))
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps raw page texts as documents. Blank pages are kept so page numbers
/// stay aligned with the PDF.
pub fn pages_to_documents(filename: &str, pages: Vec<String>) -> Vec<Document> {
    pages
        .into_iter()
        .enumerate()
        .map(|(page, raw)| Document {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            page,
            content: clean_text(&raw),
        })
        .collect()
}

/// Normalizes extracted PDF text while keeping line and paragraph breaks,
/// which the splitter uses as boundaries.
pub fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned = RE_CONTROL.replace_all(&text, "");
    let cleaned = RE_INLINE_SPACE.replace_all(&cleaned, " ");
    let cleaned = RE_TRAILING_SPACE.replace_all(&cleaned, "");
    let cleaned = RE_BLANK_LINES.replace_all(&cleaned, "\n\n");

    cleaned.trim().to_string()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
