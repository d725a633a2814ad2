//! Corpus index building
//!
//! [`IndexBuilder`] turns a directory of documents into a searchable
//! [`CorpusIndex`]: load, chunk, embed, index. Builds are keyed by a corpus
//! fingerprint so an unchanged corpus loads the persisted index instead of
//! being re-embedded.

use crate::config::Config;
use crate::corpus::{self, CorpusLoader, Document};
use crate::error::Result;
use crate::ml::embedding::EmbeddingModel;
use crate::ml::index::CorpusIndex;
use crate::text::chunking::TextChunker;
use indicatif::{ProgressBar, ProgressStyle};

/// Builds corpus indexes from document directories
pub struct IndexBuilder {
    config: Config,
    chunker: TextChunker,
    embedding_model: EmbeddingModel,
}

impl IndexBuilder {
    /// Create a builder from configuration
    pub fn new(config: Config) -> Result<Self> {
        let chunker = TextChunker::new(config.chunking.clone())?;
        let embedding_model = EmbeddingModel::new(config.embedding.clone())?;
        Ok(Self {
            config,
            chunker,
            embedding_model,
        })
    }

    /// Build an in-memory index from already loaded documents
    pub fn build(&mut self, documents: &[Document], fingerprint: u64) -> Result<CorpusIndex> {
        let mut segments = Vec::new();
        let mut next_id = 0;

        for document in documents {
            let source = document.source_path.to_string_lossy().to_string();
            let mut document_segments = self
                .chunker
                .chunk_text(&document.raw_text, Some(source))?;
            for segment in &mut document_segments {
                segment.id = next_id;
                next_id += 1;
            }
            segments.append(&mut document_segments);
        }

        log::info!(
            "Chunked {} documents into {} segments",
            documents.len(),
            segments.len()
        );

        let progress = ProgressBar::new(segments.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.set_message("Embedding segments");

        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        let embeddings = self.embedding_model.encode_batch(&texts)?;
        for (segment, embedding) in segments.iter_mut().zip(embeddings) {
            segment.embedding = Some(embedding);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let mut index = CorpusIndex::new(
            self.embedding_model.dimension(),
            fingerprint,
            self.config.search.clone(),
        );
        index.add_segments(segments)?;
        index.build()?;
        Ok(index)
    }

    /// Build the index from the configured corpus directory, or load the
    /// persisted one when the corpus is unchanged
    pub fn build_or_load(&mut self) -> Result<CorpusIndex> {
        let corpus_dir = self.config.corpus_dir.clone();
        let index_dir = self.config.index_dir.clone();

        let fingerprint = corpus::fingerprint(&corpus_dir)?;

        if index_dir.join("manifest.json").exists() {
            match CorpusIndex::load_fingerprint(&index_dir) {
                Ok(saved) if saved == fingerprint => {
                    log::info!("Corpus unchanged, loading persisted index from {:?}", index_dir);
                    return CorpusIndex::load(&index_dir);
                }
                Ok(_) => {
                    log::info!("Corpus changed, rebuilding index");
                }
                Err(e) => {
                    log::warn!("Failed to read index manifest ({}), rebuilding", e);
                }
            }
        }

        let documents = CorpusLoader::load(&corpus_dir)?;
        let index = self.build(&documents, fingerprint)?;
        index.save(&index_dir)?;
        Ok(index)
    }

    /// Embedding model used by this builder
    pub fn embedding_model(&mut self) -> &mut EmbeddingModel {
        &mut self.embedding_model
    }

    /// Builder configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
