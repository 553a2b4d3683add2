use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use search_core::{find_and_remove_duplicates, run_queries_with, DocId, DocumentStatus, ExecutionMode, Rating, SearchIndex};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocId,
    text: String,
    #[serde(default)]
    status: DocumentStatus,
    #[serde(default)]
    ratings: Vec<Rating>,
}

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Load documents into an in-memory TF-IDF index and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Documents as JSON/JSONL: a file or a directory of files
    #[arg(long)]
    documents: String,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Remove documents with the same set of words as a lower id
    #[arg(long, default_value_t = false)]
    dedup: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every line of a queries file against the index
    Query {
        #[command(flatten)]
        index: IndexArgs,
        /// File with one query per line
        #[arg(long)]
        queries: String,
        /// Score each query with the parallel executor
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Results per printed page
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..))]
        page_size: u16,
        /// Print one JSON object per query instead of pages
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show which query words a document contains
    Match {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocId,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { index, queries, parallel, page_size, json } => {
            let idx = build_index(&index)?;
            let queries = read_queries(Path::new(&queries))?;
            run_query_file(&idx, &queries, execution_mode(parallel), usize::from(page_size), json)
        }
        Commands::Match { index, query, id, parallel } => {
            let idx = build_index(&index)?;
            let (words, status) = idx.match_document_with(execution_mode(parallel), &query, id)?;
            println!("{{ document_id = {id}, status = {status:?}, words = {words:?} }}");
            Ok(())
        }
    }
}

fn execution_mode(parallel: bool) -> ExecutionMode {
    if parallel {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    }
}

fn build_index(args: &IndexArgs) -> Result<SearchIndex> {
    let mut idx = SearchIndex::from_stop_words_text(&args.stop_words)?;
    let mut skipped = 0usize;
    for file in collect_files(Path::new(&args.documents)) {
        for doc in load_documents(&file)? {
            if let Err(e) = idx.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
                tracing::warn!(id = doc.id, error = %e, "skipping document");
                skipped += 1;
            }
        }
    }
    tracing::info!(num_docs = idx.document_count(), skipped, "ingested documents");

    if args.dedup {
        let removed = find_and_remove_duplicates(&mut idx);
        tracing::info!(removed = removed.len(), "removed duplicates");
    }
    Ok(idx)
}

fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn load_documents(file: &Path) -> Result<Vec<InputDoc>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut docs = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            docs.push(serde_json::from_str(&line).with_context(|| format!("parsing {}", file.display()))?);
        }
        return Ok(docs);
    }
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr.into_iter().map(serde_json::from_value).collect::<Result<_, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => Vec::new(),
    };
    Ok(docs)
}

fn read_queries(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
}

fn run_query_file(idx: &SearchIndex, queries: &[String], mode: ExecutionMode, page_size: usize, json: bool) -> Result<()> {
    let results = run_queries_with(idx, queries, mode)?;
    for (query, found) in queries.iter().zip(&results) {
        if json {
            println!("{}", serde_json::json!({ "query": query, "results": found }));
            continue;
        }
        println!("Results for {query:?}:");
        if found.is_empty() {
            println!("  no documents");
        }
        for (n, page) in found.chunks(page_size).enumerate() {
            println!("  Page {}", n + 1);
            for doc in page {
                println!("    {doc}");
            }
        }
    }
    Ok(())
}
