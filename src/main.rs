//! ragchat CLI application
//!
//! Command-line interface for the ragchat library.

use clap::{Parser, Subcommand};
use ragchat::api::chat::run_interactive;
use ragchat::{ChatMode, ChatOrchestrator, Config, Credential, GroqBackend, IndexBuilder};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(about = "Retrieval-augmented chat over a local document corpus")]
#[command(version)]
struct Cli {
    /// Optional path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat directly with the model, without retrieval
    Chat,

    /// Chat grounded in the document corpus
    Rag {
        /// Corpus directory containing documents
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Directory for the persisted index
        #[arg(short, long)]
        index_dir: Option<PathBuf>,
    },

    /// Build (or refresh) the corpus index
    Index {
        /// Corpus directory containing documents
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Directory for the persisted index
        #[arg(short, long)]
        index_dir: Option<PathBuf>,
    },

    /// Search the corpus index without generating a response
    Search {
        /// Search query
        query: String,

        /// Number of results to return
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Corpus directory containing documents
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Directory for the persisted index
        #[arg(short, long)]
        index_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ragchat::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Chat => {
            chat_command(config, ChatMode::Plain).await?;
        }
        Commands::Rag {
            data_dir,
            index_dir,
        } => {
            apply_dirs(&mut config, data_dir, index_dir);
            chat_command(config, ChatMode::Rag).await?;
        }
        Commands::Index {
            data_dir,
            index_dir,
        } => {
            apply_dirs(&mut config, data_dir, index_dir);
            index_command(config)?;
        }
        Commands::Search {
            query,
            top_k,
            data_dir,
            index_dir,
        } => {
            apply_dirs(&mut config, data_dir, index_dir);
            search_command(config, query, top_k)?;
        }
    }

    Ok(())
}

fn apply_dirs(config: &mut Config, data_dir: Option<PathBuf>, index_dir: Option<PathBuf>) {
    if let Some(data_dir) = data_dir {
        config.corpus_dir = data_dir;
    }
    if let Some(index_dir) = index_dir {
        config.index_dir = index_dir;
    }
}

async fn chat_command(config: Config, mode: ChatMode) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Option<Box<dyn ragchat::CompletionBackend>> = Credential::resolve()
        .map(|cred| Box::new(GroqBackend::new(&cred, config.llm.clone())) as _);

    if backend.is_none() {
        eprintln!("⚠️  No API key found; messages will fail until one is configured");
    }

    let orchestrator = ChatOrchestrator::new(mode, config, backend);
    run_interactive(orchestrator).await?;
    Ok(())
}

fn index_command(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔧 Building index from {}...", config.corpus_dir.display());

    let index_dir = config.index_dir.clone();
    let mut builder = IndexBuilder::new(config)?;
    let index = builder.build_or_load()?;

    println!("✅ Index ready!");
    println!("   📊 Segments: {}", index.len());
    println!("   📋 Location: {}", index_dir.display());
    if let Ok(meta) = std::fs::metadata(index_dir.join("vectors.bin")) {
        println!("   💾 Vectors: {}", ragchat::utils::format_file_size(meta.len()));
    }

    Ok(())
}

fn search_command(
    config: Config,
    query: String,
    top_k: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Searching for: \"{}\"", query);

    let retrieval = {
        let mut retrieval = config.retrieval.clone();
        retrieval.top_k = top_k;
        retrieval
    };
    let embedding = config.embedding.clone();

    let mut builder = IndexBuilder::new(config)?;
    let index = builder.build_or_load()?;
    let mut engine = ragchat::QueryEngine::new(index, retrieval, embedding)?;

    let results = engine.retrieve(&query)?;

    if results.is_empty() {
        println!("❌ No results found");
        return Ok(());
    }

    println!("📋 Found {} results:", results.len());
    println!();

    for (i, (score, segment)) in results.iter().enumerate() {
        println!("{}. Score: {:.3}", i + 1, score);
        if let Some(source) = &segment.source {
            println!("   Source: {}", source);
        }
        println!("   {}", segment.text);
        println!();
    }

    Ok(())
}
