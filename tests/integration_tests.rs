//! End-to-end pipeline tests
//!
//! Exercises the full library surface: corpus loading, chunking, index
//! building, persistence reuse, and retrieval.

use ragchat::config::{ChunkingConfig, Config};
use ragchat::corpus::Document;
use ragchat::text::TextChunker;
use ragchat::{IndexBuilder, QueryEngine};
use std::fs;
use std::path::PathBuf;

fn config_for(corpus: &tempfile::TempDir, storage: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.corpus_dir = corpus.path().to_path_buf();
    config.index_dir = storage.path().to_path_buf();
    config
}

#[test]
fn test_full_index_pipeline() -> Result<(), Box<dyn std::error::Error>> {
    let corpus = tempfile::tempdir()?;
    let storage = tempfile::tempdir()?;

    fs::write(
        corpus.path().join("computing.txt"),
        "Quantum computing uses qubits for parallel processing.",
    )?;
    fs::write(
        corpus.path().join("ml.md"),
        "Machine learning models require large datasets.",
    )?;
    fs::write(corpus.path().join("ignored.bin"), "binary noise")?;

    let mut builder = IndexBuilder::new(config_for(&corpus, &storage))?;
    let index = builder.build_or_load()?;

    // One segment per short document; the .bin file is skipped
    assert_eq!(index.len(), 2);
    assert!(storage.path().join("manifest.json").exists());
    assert!(storage.path().join("vectors.bin").exists());
    assert!(storage.path().join("segments.json").exists());

    Ok(())
}

#[test]
fn test_persisted_index_reused_until_corpus_changes() -> Result<(), Box<dyn std::error::Error>> {
    let corpus = tempfile::tempdir()?;
    let storage = tempfile::tempdir()?;
    fs::write(corpus.path().join("doc.txt"), "Stable corpus content.")?;

    let config = config_for(&corpus, &storage);

    let first = IndexBuilder::new(config.clone())?.build_or_load()?;
    let manifest_before = fs::read_to_string(storage.path().join("manifest.json"))?;

    // Unchanged corpus: manifest (including build timestamp) is untouched
    let second = IndexBuilder::new(config.clone())?.build_or_load()?;
    let manifest_after = fs::read_to_string(storage.path().join("manifest.json"))?;
    assert_eq!(manifest_before, manifest_after);
    assert_eq!(first.fingerprint(), second.fingerprint());

    // Changed corpus: fingerprint differs and the index is rebuilt
    fs::write(
        corpus.path().join("extra.txt"),
        "A second document appears.",
    )?;
    let third = IndexBuilder::new(config)?.build_or_load()?;
    assert_ne!(third.fingerprint(), first.fingerprint());
    assert_eq!(third.len(), 2);

    Ok(())
}

#[test]
fn test_retrieval_prefers_relevant_segment() -> Result<(), Box<dyn std::error::Error>> {
    let documents = vec![
        Document {
            source_path: PathBuf::from("sky.txt"),
            raw_text: "The sky is blue.".to_string(),
        },
        Document {
            source_path: PathBuf::from("grass.txt"),
            raw_text: "Grass is green.".to_string(),
        },
    ];

    let mut builder = IndexBuilder::new(Config::default())?;
    let index = builder.build(&documents, 0)?;
    let mut engine = QueryEngine::new(index, Default::default(), Default::default())?;

    // Identical text embeds identically, so the exact sentence wins
    let results = engine.retrieve("The sky is blue.")?;
    assert_eq!(results[0].1.text, "The sky is blue.");

    Ok(())
}

#[test]
fn test_long_document_chunks_with_fixed_overlap() -> Result<(), Box<dyn std::error::Error>> {
    let chunker = TextChunker::new(ChunkingConfig::default())?;
    let text: String = "abcdefghij".repeat(500); // 5000 chars
    let segments = chunker.chunk_text(&text, None)?;

    assert!(segments.len() > 1);
    for pair in segments.windows(2) {
        let prev_end = pair[0].offset + pair[0].length;
        assert_eq!(prev_end - pair[1].offset, 20);
    }
    for segment in &segments[..segments.len() - 1] {
        assert_eq!(segment.length, 1024);
    }

    Ok(())
}
