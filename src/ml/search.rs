//! Vector similarity search over segment embeddings
//!
//! Provides approximate nearest-neighbour search through an HNSW graph
//! (instant-distance) with an exact linear scan fallback, plus persistence of
//! the raw vectors. The HNSW graph itself is rebuilt after loading rather
//! than persisted.

use crate::error::{RagError, Result};
use crate::ml::embedding::Embedding;
use instant_distance::{Builder, HnswMap, Point, Search};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Custom point type for the HNSW graph
#[derive(Clone, Debug)]
pub struct VectorPoint {
    pub data: Vec<f32>,
    pub metric: DistanceMetric,
}

impl VectorPoint {
    pub fn new(data: Vec<f32>, metric: DistanceMetric) -> Self {
        Self { data, metric }
    }
}

impl Point for VectorPoint {
    fn distance(&self, other: &Self) -> f32 {
        match self.metric {
            DistanceMetric::Cosine => cosine_distance(&self.data, &other.data),
            DistanceMetric::Euclidean => euclidean_distance(&self.data, &other.data),
            DistanceMetric::DotProduct => -dot_product(&self.data, &other.data),
        }
    }
}

/// Search result with distance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Segment ID of the result
    pub id: usize,
    /// Distance score (lower = more similar)
    pub distance: f32,
}

/// Distance metrics supported
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Cosine distance (good for normalized embeddings)
    Cosine,
    /// Euclidean distance (L2)
    Euclidean,
    /// Negative dot product
    DotProduct,
}

/// Vector search index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Distance metric
    pub distance_metric: DistanceMetric,
    /// Use the HNSW graph when it has been built
    pub use_hnsw: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            distance_metric: DistanceMetric::Cosine,
            use_hnsw: true,
        }
    }
}

/// Nearest-neighbour index over segment embeddings
pub struct VectorSearchIndex {
    /// HNSW graph mapping points back to segment ids
    hnsw: Option<HnswMap<VectorPoint, usize>>,
    /// Segment ids, parallel to `vectors`
    ids: Vec<usize>,
    /// Raw vectors for exact search and persistence
    vectors: Vec<Embedding>,
    config: SearchConfig,
    dimension: usize,
}

impl VectorSearchIndex {
    /// Create new vector search index
    pub fn new(dimension: usize, config: SearchConfig) -> Self {
        Self {
            hnsw: None,
            ids: Vec::new(),
            vectors: Vec::new(),
            config,
            dimension,
        }
    }

    /// Add a vector to the index; invalidates the HNSW graph until the next
    /// `build`
    pub fn add_vector(&mut self, id: usize, vector: &Embedding) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RagError::Search(format!(
                "Vector dimension {} doesn't match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }

        self.ids.push(id);
        self.vectors.push(vector.clone());
        self.hnsw = None;
        Ok(())
    }

    /// Build the HNSW graph for fast approximate search
    pub fn build(&mut self) -> Result<()> {
        if self.vectors.is_empty() {
            log::warn!("No vectors to build HNSW graph from");
            return Ok(());
        }
        if self.hnsw.is_some() {
            return Ok(());
        }

        log::info!(
            "Building HNSW graph with {} vectors, dimension {}",
            self.vectors.len(),
            self.dimension
        );

        let points: Vec<VectorPoint> = self
            .vectors
            .iter()
            .map(|v| VectorPoint::new(v.clone(), self.config.distance_metric))
            .collect();

        let map = Builder::default().build(points, self.ids.clone());
        self.hnsw = Some(map);
        Ok(())
    }

    /// Search for the k most similar vectors
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimension {
            return Err(RagError::Search(format!(
                "Query dimension {} doesn't match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        if self.config.use_hnsw {
            if let Some(ref hnsw) = self.hnsw {
                let point = VectorPoint::new(query.clone(), self.config.distance_metric);
                let mut search = Search::default();
                let results = hnsw
                    .search(&point, &mut search)
                    .take(k)
                    .map(|item| SearchResult {
                        id: *item.value,
                        distance: item.distance,
                    })
                    .collect();
                return Ok(results);
            }
        }

        self.search_exact(query, k)
    }

    /// Exact linear-scan search (slower but deterministic)
    pub fn search_exact(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        let mut distances: Vec<SearchResult> = self
            .ids
            .iter()
            .zip(self.vectors.iter())
            .map(|(&id, vector)| SearchResult {
                id,
                distance: self.compute_distance(query, vector),
            })
            .collect();

        distances.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        distances.truncate(k);
        Ok(distances)
    }

    fn compute_distance(&self, a: &Embedding, b: &Embedding) -> f32 {
        match self.config.distance_metric {
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::DotProduct => -dot_product(a, b),
        }
    }

    /// Save vectors and configuration to an index directory
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        let data = bincode::serialize(&(&self.ids, &self.vectors))
            .map_err(|e| RagError::Storage(format!("Failed to serialize vectors: {}", e)))?;
        std::fs::write(path.join("vectors.bin"), data)?;

        let config_data = serde_json::to_string(&self.config)?;
        std::fs::write(path.join("search_config.json"), config_data)?;

        log::info!("Saved vector index ({} vectors) to {:?}", self.vectors.len(), path);
        Ok(())
    }

    /// Load vectors from an index directory and rebuild the HNSW graph
    pub fn load<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self> {
        let path = path.as_ref();

        let data = std::fs::read(path.join("vectors.bin"))?;
        let (ids, vectors): (Vec<usize>, Vec<Embedding>) = bincode::deserialize(&data)
            .map_err(|e| RagError::Storage(format!("Failed to deserialize vectors: {}", e)))?;

        let config_data = std::fs::read_to_string(path.join("search_config.json"))?;
        let config: SearchConfig = serde_json::from_str(&config_data)?;

        let mut index = Self::new(dimension, config);
        index.ids = ids;
        index.vectors = vectors;
        index.build()?;

        log::info!("Loaded vector index with {} vectors from {:?}", index.len(), path);
        Ok(index)
    }

    /// Number of vectors in the index
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Whether the HNSW graph has been built
    pub fn hnsw_built(&self) -> bool {
        self.hnsw.is_some()
    }
}

/// Cosine distance (1 - cosine similarity)
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot = dot_product(a, b);
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        1.0
    } else {
        1.0 - (dot / (norm_a * norm_b))
    }
}

/// Euclidean distance (L2)
fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
