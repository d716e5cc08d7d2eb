use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rustysumm::config::SummarizerConfig;
use rustysumm::corpus::{
    load_embedding_table, load_sentence_tables, save_embedding_table, save_topic_distributions,
};
use rustysumm::embedding::HashingEmbedder;
use rustysumm::{logging, output, pipeline::Summarizer};

#[derive(Parser)]
#[command(
    name = "rustysumm",
    about = "Extractive multi-document summarizer for news topic clusters"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize every cluster of an annotated sentence table.
    Summarize {
        /// JSON sentence tables: `{cluster: {sentence: info}}`.
        #[arg(long)]
        sentences: PathBuf,
        /// JSON embedding cache: `{sentence: [f32, ...]}`.
        #[arg(long)]
        embeddings: PathBuf,
        /// Directory receiving one summary file per cluster.
        #[arg(long)]
        out_dir: PathBuf,
        /// Run identifier appended to every summary file name.
        #[arg(long, default_value = "D4run0")]
        run_id: String,
        /// Optional path for the fitted topic-term distributions.
        #[arg(long)]
        topics_out: Option<PathBuf>,
        /// Embed uncached sentences with the hashing encoder and update the cache.
        #[arg(long)]
        fill_missing: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_tracing("info");
    let config = SummarizerConfig::load().context("invalid summarizer configuration")?;

    match cli.command {
        Command::Summarize {
            sentences,
            embeddings,
            out_dir,
            run_id,
            topics_out,
            fill_missing,
        } => summarize(
            config,
            SummarizeArgs {
                sentences,
                embeddings,
                out_dir,
                run_id,
                topics_out,
                fill_missing,
            },
        ),
    }
}

struct SummarizeArgs {
    sentences: PathBuf,
    embeddings: PathBuf,
    out_dir: PathBuf,
    run_id: String,
    topics_out: Option<PathBuf>,
    fill_missing: bool,
}

fn summarize(config: SummarizerConfig, args: SummarizeArgs) -> Result<()> {
    let clusters = load_sentence_tables(&args.sentences)
        .with_context(|| format!("failed to load sentence tables from {}", args.sentences.display()))?;
    let mut table = load_embedding_table(&args.embeddings)
        .with_context(|| format!("failed to load embeddings from {}", args.embeddings.display()))?;

    if args.fill_missing {
        let texts = clusters
            .iter()
            .flat_map(|cluster| cluster.records().map(|record| record.text.as_str()));
        let added = table.fill_missing(texts, &HashingEmbedder::default());
        if added > 0 {
            save_embedding_table(&args.embeddings, &table).with_context(|| {
                format!("failed to update embedding cache {}", args.embeddings.display())
            })?;
            tracing::info!(added, "Embedded uncached sentences");
        }
    }

    let summarizer = Summarizer::new(config);
    let report = summarizer.run(clusters, &table);

    for (cluster, summary) in &report.summaries {
        output::write_summary(&args.out_dir, cluster, &args.run_id, &summary.sentences)
            .with_context(|| format!("failed to write summary for cluster {cluster}"))?;
    }
    if let Some(path) = &args.topics_out {
        save_topic_distributions(path, &report.topics)
            .with_context(|| format!("failed to write topic distributions to {}", path.display()))?;
    }

    let metrics = serde_json::to_string(&summarizer.metrics_snapshot())
        .context("failed to serialize metrics")?;
    tracing::info!(metrics = %metrics, "Run metrics");

    if !report.failures.is_empty() {
        let clusters: Vec<&str> = report.failures.keys().map(String::as_str).collect();
        bail!(
            "{} cluster(s) failed: {}",
            report.failures.len(),
            clusters.join(", ")
        );
    }
    Ok(())
}
