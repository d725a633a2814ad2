//! Corpus loading for ragchat
//!
//! This module enumerates a local document directory and loads its readable
//! contents into discrete documents. Plain text, markdown, PDF, and Word
//! files are supported; anything else is skipped with a warning.

use crate::error::{RagError, Result};
use crate::utils::{get_file_extension, is_supported_document};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A unit of ingested text
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Where the text came from
    pub source_path: PathBuf,

    /// Full text content
    pub raw_text: String,
}

/// Loads documents from a corpus directory
pub struct CorpusLoader;

impl CorpusLoader {
    /// Load all supported documents from a directory.
    ///
    /// An absent or empty directory yields an empty vector; callers validate
    /// non-emptiness before building an index. Files the extractors cannot
    /// parse are skipped, not fatal.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Vec<Document>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            log::warn!("Corpus directory {:?} does not exist", dir);
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        // Stable ordering keeps segment ids reproducible across rebuilds
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            if !is_supported_document(&path) {
                log::debug!("Skipping unsupported file {:?}", path);
                continue;
            }

            match Self::load_file(&path) {
                Ok(text) if !text.trim().is_empty() => {
                    documents.push(Document {
                        source_path: path,
                        raw_text: text,
                    });
                }
                Ok(_) => {
                    log::warn!("Skipping empty document {:?}", path);
                }
                Err(e) => {
                    log::warn!("Skipping unreadable document {:?}: {}", path, e);
                }
            }
        }

        log::info!("Loaded {} documents from {:?}", documents.len(), dir);
        Ok(documents)
    }

    /// Extract text from a single file based on its extension
    fn load_file(path: &Path) -> Result<String> {
        match get_file_extension(path).as_deref() {
            Some("pdf") => pdf_extract::extract_text(path)
                .map_err(|e| RagError::Pdf(format!("Failed to extract {}: {}", path.display(), e))),
            Some("docx") => Self::load_docx(path),
            Some("txt") | Some("md") | Some("markdown") => {
                std::fs::read_to_string(path).map_err(RagError::Io)
            }
            _ => Err(RagError::TextProcessing(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    /// Extract paragraph text from a Word document
    fn load_docx(path: &Path) -> Result<String> {
        use docx_rs::{DocumentChild, ParagraphChild, RunChild};

        let buf = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&buf).map_err(|e| {
            RagError::TextProcessing(format!("Failed to extract {}: {}", path.display(), e))
        })?;

        let mut paragraphs = Vec::new();
        for child in docx.document.children {
            if let DocumentChild::Paragraph(paragraph) = child {
                let mut line = String::new();
                for paragraph_child in paragraph.children {
                    if let ParagraphChild::Run(run) = paragraph_child {
                        for run_child in run.children {
                            if let RunChild::Text(text) = run_child {
                                line.push_str(&text.text);
                            }
                        }
                    }
                }
                if !line.trim().is_empty() {
                    paragraphs.push(line);
                }
            }
        }

        Ok(paragraphs.join("\n"))
    }
}

/// Compute a content fingerprint for a corpus directory.
///
/// Hashes the sorted list of supported file names together with their sizes
/// and modification times. The fingerprint keys the persisted index: a changed
/// corpus forces a rebuild, an unchanged one reloads the cached index.
pub fn fingerprint<P: AsRef<Path>>(dir: P) -> Result<u64> {
    let dir = dir.as_ref();
    let mut hasher = DefaultHasher::new();

    if !dir.is_dir() {
        return Ok(hasher.finish());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported_document(path))
        .collect();
    entries.sort();

    for path in entries {
        if let Some(name) = path.file_name() {
            name.hash(&mut hasher);
        }
        if let Ok(meta) = std::fs::metadata(&path) {
            meta.len().hash(&mut hasher);
            if let Ok(mtime) = meta.modified() {
                if let Ok(elapsed) = mtime.duration_since(std::time::UNIX_EPOCH) {
                    elapsed.as_nanos().hash(&mut hasher);
                }
            }
        }
    }

    Ok(hasher.finish())
}
