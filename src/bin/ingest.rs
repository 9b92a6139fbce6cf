use anyhow::{Context, Result};
use clap::Parser;
use notegraph::Config;
use notegraph::db::Db;
use notegraph::ingest::{self, LinkStyle, SegmentMode};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Rebuild the notes database from a folder of Markdown files")]
struct Args {
    /// Config file (defaults to $NOTEGRAPH_CONFIG, then ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override notes_root
    #[arg(long)]
    root: Option<PathBuf>,

    /// Override db_path
    #[arg(long)]
    db: Option<PathBuf>,

    /// First calendar day (inclusive), YYYY-MM-DD
    #[arg(long)]
    min_date: Option<String>,

    /// Last calendar day (exclusive), YYYY-MM-DD
    #[arg(long)]
    max_date: Option<String>,

    /// Link grammar
    #[arg(long, value_enum)]
    link_style: Option<LinkStyle>,

    /// Do not treat `#` lines inside code blocks as headings
    #[arg(long)]
    fence_aware: bool,

    /// Also write the parsed corpus as JSON to this file
    #[arg(long)]
    dump_json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::read_from(&config_path)?;

    if let Some(root) = args.root {
        config.notegraph.notes_root = root;
    }
    if let Some(db) = args.db {
        config.notegraph.db_path = db;
    }
    if let Some(min_date) = args.min_date {
        config.dates.min_date = min_date;
    }
    if let Some(max_date) = args.max_date {
        config.dates.max_date = Some(max_date);
    }
    if let Some(style) = args.link_style {
        config.parse.link_style = style;
    }
    if args.fence_aware {
        config.parse.fence_aware_headings = true;
    }
    config.validate()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(config.notegraph.log_level.as_str())
    ).init();

    log::info!("Starting notes ingestion");
    log::info!("Notes root: {}", config.notes_root().display());
    log::info!("Database path: {}", config.db_path().display());

    let range = config.date_range()?;
    let options = config.parse_options();
    if options.segment_mode == SegmentMode::FenceAware {
        log::info!("Headings inside code blocks are ignored");
    }

    let start = Instant::now();

    let corpus = ingest::build_corpus(config.notes_root(), &options)?;
    if let Some(dump_path) = &args.dump_json {
        std::fs::write(dump_path, corpus.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", dump_path.display()))?;
        log::info!("Wrote parsed corpus ({} documents) to {}", corpus.len(), dump_path.display());
    }

    let db = Db::new(config.db_path());
    let report = ingest::ingest_corpus(&db, corpus, range).await?;

    log::info!("=== Ingestion Complete ===");
    log::info!("Calendar days: {} ({} to {}, end exclusive)", report.dates, range.min, range.max);
    log::info!("Documents: {}", report.documents);
    log::info!("Entries: {}", report.entries);
    log::info!("Date links: {} (dropped outside calendar: {})", report.date_links, report.dropped_date_links);
    log::info!("Document links: {} (dropped unresolved: {})", report.doc_links, report.dropped_doc_links);
    log::info!("Time: {:?}", start.elapsed());

    if report.documents == 0 {
        log::warn!("No documents ingested. Check notes_root in config.toml.");
    }

    Ok(())
}
