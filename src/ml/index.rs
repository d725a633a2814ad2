//! Corpus index tying segments to their vector search index
//!
//! A [`CorpusIndex`] owns the text segments and the vector index over their
//! embeddings, and knows how to persist both to an index directory together
//! with a manifest recording the corpus fingerprint it was built from.

use crate::error::{RagError, Result};
use crate::ml::embedding::Embedding;
use crate::ml::search::{SearchConfig, VectorSearchIndex};
use crate::text::chunking::Segment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Manifest stored alongside the persisted index
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexManifest {
    /// Fingerprint of the corpus directory the index was built from
    fingerprint: u64,
    /// When the index was built
    built_at: chrono::DateTime<chrono::Utc>,
    /// Number of segments in the index
    segment_count: usize,
    /// Embedding dimension
    dimension: usize,
}

/// Summary statistics about an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub segment_count: usize,
    pub dimension: usize,
    pub fingerprint: u64,
    pub hnsw_built: bool,
}

/// In-memory index over a corpus: segments plus their vector index
pub struct CorpusIndex {
    segments: HashMap<usize, Segment>,
    vector_index: VectorSearchIndex,
    fingerprint: u64,
    dimension: usize,
}

impl CorpusIndex {
    /// Create an empty index for the given embedding dimension
    pub fn new(dimension: usize, fingerprint: u64, search: SearchConfig) -> Self {
        Self {
            segments: HashMap::new(),
            vector_index: VectorSearchIndex::new(dimension, search),
            fingerprint,
            dimension,
        }
    }

    /// Add embedded segments to the index
    ///
    /// Each segment must carry its embedding; segments without one are
    /// rejected.
    pub fn add_segments(&mut self, segments: Vec<Segment>) -> Result<()> {
        for segment in segments {
            let embedding = segment.embedding.as_ref().ok_or_else(|| {
                RagError::Search(format!("Segment {} has no embedding", segment.id))
            })?;
            self.vector_index.add_vector(segment.id, embedding)?;
            self.segments.insert(segment.id, segment);
        }
        Ok(())
    }

    /// Build the HNSW graph over all added segments
    pub fn build(&mut self) -> Result<()> {
        self.vector_index.build()
    }

    /// Search for the k segments most similar to a query embedding
    ///
    /// Returns (distance, segment) pairs ordered by ascending distance.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<(f32, &Segment)>> {
        let results = self.vector_index.search(query, k)?;
        let mut matches = Vec::with_capacity(results.len());
        for result in results {
            let segment = self.segments.get(&result.id).ok_or_else(|| {
                RagError::Search(format!("Search returned unknown segment id {}", result.id))
            })?;
            matches.push((result.distance, segment));
        }
        Ok(matches)
    }

    /// Look up a segment by id
    pub fn segment(&self, id: usize) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// Fingerprint of the corpus this index was built from
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the index contains no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Summary statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            segment_count: self.segments.len(),
            dimension: self.dimension,
            fingerprint: self.fingerprint,
            hnsw_built: self.vector_index.hnsw_built(),
        }
    }

    /// Persist the index to a directory
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        crate::utils::ensure_directory(path)?;

        self.vector_index.save(path)?;

        let mut segments: Vec<&Segment> = self.segments.values().collect();
        segments.sort_by_key(|s| s.id);
        let segments_data = serde_json::to_string(&segments)?;
        std::fs::write(path.join("segments.json"), segments_data)?;

        let manifest = IndexManifest {
            fingerprint: self.fingerprint,
            built_at: chrono::Utc::now(),
            segment_count: self.segments.len(),
            dimension: self.dimension,
        };
        let manifest_data = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(path.join("manifest.json"), manifest_data)?;

        log::info!("Saved index with {} segments to {:?}", self.segments.len(), path);
        Ok(())
    }

    /// Load a previously persisted index
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let manifest_data = std::fs::read_to_string(path.join("manifest.json"))?;
        let manifest: IndexManifest = serde_json::from_str(&manifest_data)?;

        let segments_data = std::fs::read_to_string(path.join("segments.json"))?;
        let segment_list: Vec<Segment> = serde_json::from_str(&segments_data)?;
        let segments: HashMap<usize, Segment> =
            segment_list.into_iter().map(|s| (s.id, s)).collect();

        let vector_index = VectorSearchIndex::load(path, manifest.dimension)?;

        if vector_index.len() != segments.len() {
            return Err(RagError::Storage(format!(
                "Index corrupted: {} vectors but {} segments",
                vector_index.len(),
                segments.len()
            )));
        }

        log::info!(
            "Loaded index with {} segments (built {})",
            segments.len(),
            manifest.built_at
        );

        Ok(Self {
            segments,
            vector_index,
            fingerprint: manifest.fingerprint,
            dimension: manifest.dimension,
        })
    }

    /// Read only the fingerprint from a persisted index, without loading it
    pub fn load_fingerprint<P: AsRef<Path>>(path: P) -> Result<u64> {
        let manifest_data = std::fs::read_to_string(path.as_ref().join("manifest.json"))?;
        let manifest: IndexManifest = serde_json::from_str(&manifest_data)?;
        Ok(manifest.fingerprint)
    }
}
