use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ir_core::persist::{load_index, save_index, IndexPaths, IndexSnapshot};
use ir_core::{Analyzer, BooleanOp, Indexer, OptimizedQueryProcessor, Query, QueryProcessor, StopWords};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

mod loader;

const PREVIEW_CHARS: usize = 500;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a boolean inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every file of a directory and save the index
    Build {
        /// Directory holding the documents
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long, default_value = "./index")]
        output: PathBuf,
        /// Line-delimited stop-word list; omit to keep every word
        #[arg(long)]
        stop_words: Option<PathBuf>,
        /// Use the built-in English stop-word list
        #[arg(long, default_value_t = false, conflicts_with = "stop_words")]
        english_stop_words: bool,
        /// Index surface forms instead of Porter stems
        #[arg(long, default_value_t = false)]
        no_stemming: bool,
        /// Descend into subdirectories
        #[arg(long, default_value_t = false)]
        recursive: bool,
    },
    /// Run an AND/OR query against a saved index
    Query {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// AND or OR
        #[arg(long, default_value = "and")]
        op: BooleanOp,
        /// Intersect the rarest terms first
        #[arg(long, default_value_t = false)]
        optimized: bool,
        /// Maximum number of hits to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Query terms
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Print term and document counts and the most frequent terms
    Stats {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Show one document
    Doc {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        #[arg(long)]
        id: u32,
        /// Print the whole content instead of a preview
        #[arg(long, default_value_t = false)]
        full: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stop_words, english_stop_words, no_stemming, recursive } => {
            let stop_words = match stop_words {
                Some(path) => Some(
                    StopWords::load(&path).with_context(|| format!("loading stop words from {}", path.display()))?,
                ),
                None if english_stop_words => Some(StopWords::english()),
                None => None,
            };
            build_index(&input, &output, Analyzer::new(stop_words, !no_stemming), recursive)
        }
        Commands::Query { index, op, optimized, limit, terms } => run_query(&index, op, optimized, limit, &terms),
        Commands::Stats { index, top } => show_stats(&index, top),
        Commands::Doc { index, id, full } => show_doc(&index, id, full),
    }
}

fn build_index(input: &Path, output: &Path, analyzer: Analyzer, recursive: bool) -> Result<()> {
    let documents = loader::load_documents(input, recursive)?;
    tracing::info!(num_docs = documents.len(), input = %input.display(), "loaded documents");

    let mut indexer = Indexer::new(analyzer);
    let report = indexer.index_all(&documents);
    if report.indexed == 0 && !documents.is_empty() {
        bail!("none of the {} documents could be indexed", documents.len());
    }

    let (dictionary, analyzer) = indexer.into_parts();
    let snapshot = IndexSnapshot { dictionary, documents, analyzer };
    let meta = save_index(&IndexPaths::new(output), &snapshot)?;
    println!(
        "indexed {} documents ({} failed), {} terms -> {}",
        report.indexed,
        report.failed,
        meta.num_terms,
        output.display()
    );
    Ok(())
}

fn open(index: &Path) -> Result<IndexSnapshot> {
    let (snapshot, meta) = load_index(&IndexPaths::new(index))
        .with_context(|| format!("loading index from {}", index.display()))?;
    tracing::debug!(version = meta.version, created_at = %meta.created_at, "index loaded");
    Ok(snapshot)
}

fn run_query(
    index: &Path,
    op: BooleanOp,
    optimized: bool,
    limit: usize,
    terms: &[String],
) -> Result<()> {
    let snapshot = open(index)?;
    let query = Query::parse(op, &terms.join(" "));

    let start = Instant::now();
    let result = if optimized {
        OptimizedQueryProcessor::optimized(&snapshot.dictionary, &snapshot.analyzer).process(&query)
    } else {
        QueryProcessor::new(&snapshot.dictionary, &snapshot.analyzer).process(&query)
    };
    let elapsed = start.elapsed();

    println!(
        "{} documents matched {} query in {:.3} ms",
        result.len(),
        query.op,
        elapsed.as_secs_f64() * 1000.0
    );
    for (rank, posting) in result.iter().take(limit).enumerate() {
        if let Some(doc) = snapshot.documents.get(posting.doc_id) {
            let score = posting.frequency;
            println!("{}. {} (ID: {}, Score: {score})", rank + 1, doc.name(), doc.id());
        }
    }
    Ok(())
}

fn show_stats(index: &Path, top: usize) -> Result<()> {
    let snapshot = open(index)?;
    println!("terms: {}", snapshot.dictionary.len());
    println!("documents: {}", snapshot.documents.len());
    println!("stemming: {}", snapshot.analyzer.stemming());
    println!("stop words: {}", snapshot.analyzer.stop_words().map_or(0, |s| s.len()));
    for (rank, term) in snapshot.dictionary.most_frequent(top).into_iter().enumerate() {
        println!(
            "{}. {} (CF: {}, DF: {})",
            rank + 1,
            term.text(),
            term.collection_frequency(),
            term.document_frequency()
        );
    }
    Ok(())
}

fn show_doc(index: &Path, id: u32, full: bool) -> Result<()> {
    let snapshot = open(index)?;
    let Some(doc) = snapshot.documents.get(id) else {
        bail!("no document with id {id}");
    };
    println!("ID: {}", doc.id());
    println!("Name: {}", doc.name());
    println!();
    if full || doc.content().chars().count() <= PREVIEW_CHARS {
        println!("{}", doc.content());
    } else {
        let preview: String = doc.content().chars().take(PREVIEW_CHARS).collect();
        println!("{preview}...");
    }
    Ok(())
}
