use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use harness::questions::load_questions;
use harness::{evaluate, NULL_MARKER};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use topone_core::corpus::load_paths;
use topone_core::{
    build_engine, CommandLemmatizer, EngineConfig, Lemmatizer, NormalizationMode, QueryEngine, RankingFunction,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "topone")]
#[command(about = "Top-1 document retrieval over a bracket-delimited corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Corpus file, or a directory of corpus files
    #[arg(long)]
    corpus: PathBuf,
    /// JSON engine config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ranking function: bm25 or classic
    #[arg(long)]
    ranking: Option<RankingFunction>,
    /// Normalization mode: none, stem, lemma or biword
    #[arg(long)]
    mode: Option<NormalizationMode>,
    /// Biword proximity window
    #[arg(long)]
    window: Option<u32>,
    /// Lemmatizer command (line in, lemmas out); defaults to $TOPONE_LEMMATIZER
    #[arg(long)]
    lemmatizer: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer every question in a questions file and report precision@1
    Evaluate {
        #[command(flatten)]
        engine: EngineArgs,
        /// Questions file (category, clue, answer, blank line)
        #[arg(long)]
        questions: PathBuf,
        /// Write a JSON report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Answer a single query
    Query {
        #[command(flatten)]
        engine: EngineArgs,
        /// Query text
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { engine, questions, report } => run_evaluate(&engine, &questions, report.as_ref()),
        Commands::Query { engine, text } => run_query(&engine, &text.join(" ")),
    }
}

fn resolve_config(args: &EngineArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(ranking) = args.ranking {
        config.ranking = ranking;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(window) = args.window {
        config.proximity_window = window;
    }
    config.validate()?;
    Ok(config)
}

fn build(args: &EngineArgs) -> Result<QueryEngine> {
    let config = resolve_config(args)?;
    let command = args.lemmatizer.clone().or_else(|| std::env::var("TOPONE_LEMMATIZER").ok());
    let lemmatizer: Option<Arc<dyn Lemmatizer>> = match command {
        Some(line) => Some(Arc::new(CommandLemmatizer::from_command_line(&line)?)),
        None => None,
    };
    if config.mode == NormalizationMode::Lemma && lemmatizer.is_none() {
        bail!("mode lemma needs a lemmatizer: pass --lemmatizer or set TOPONE_LEMMATIZER");
    }

    let docs = load_paths(&args.corpus)?;
    tracing::info!(ranking = %config.ranking, mode = %config.mode, docs = docs.len(), "building index");
    let engine = build_engine(docs, config, lemmatizer)
        .with_context(|| format!("building index from {}", args.corpus.display()))?;
    Ok(engine)
}

fn run_evaluate(args: &EngineArgs, questions: &PathBuf, report: Option<&PathBuf>) -> Result<()> {
    let questions = load_questions(questions)?;
    let engine = build(args)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = evaluate(&engine, &questions, &mut out)?;
    writeln!(
        out,
        "precision@1: {}/{} = {:.4}",
        summary.correct, summary.questions, summary.precision_at_1
    )?;
    out.flush()?;

    if let Some(path) = report {
        let f = File::create(path).with_context(|| format!("creating report {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), &summary)?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn run_query(args: &EngineArgs, text: &str) -> Result<()> {
    let engine = build(args)?;
    match engine.retrieve(text)? {
        Some(hit) => println!("{},{}", hit.doc_id, hit.score),
        None => println!("{NULL_MARKER},{NULL_MARKER}"),
    }
    Ok(())
}
