//! Markdown corpus ingestion: discover → parse → write.
//!
//! Parsing never touches the database; `Corpus` holds every parsed document
//! and is handed whole to `db_writer`, which assigns ids before resolving
//! any link.

pub mod walker;
pub mod metadata;
pub mod dates;
pub mod segmenter;
pub mod links;
pub mod document;
pub mod db_writer;

use std::path::Path;

use serde::Serialize;

pub use walker::{FileMetadata, discover_files};
pub use dates::{DateRange, calendar_range, find_all_dates, find_all_timestamps, guess_date};
pub use segmenter::{SegmentMode, heading_level, segment};
pub use links::{LinkStyle, find_dates, find_document_references};
pub use document::{Document, Entry, Field, ParseOptions, ParsedDocument, parse_document, read_document};
pub use db_writer::{IngestReport, write_corpus};

use crate::db::{migrate, Db};
use crate::error::Result;

/// Every parsed document of one run, sorted by relative path
#[derive(Debug, Clone, Default, Serialize)]
pub struct Corpus {
    documents: Vec<ParsedDocument>,
}

impl Corpus {
    pub fn new(mut documents: Vec<ParsedDocument>) -> Self {
        documents.sort_by(|a, b| a.document.cmp(&b.document));
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedDocument> {
        self.documents.iter()
    }

    pub fn get(&self, relative_path: &str) -> Option<&ParsedDocument> {
        self.documents
            .iter()
            .find(|p| p.document.relative_path == relative_path)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Discover and parse every Markdown file under `root`.
///
/// Any unreadable or non-UTF-8 file aborts the whole build.
pub fn build_corpus(root: &Path, options: &ParseOptions) -> Result<Corpus> {
    let files = discover_files(root)?;
    if files.is_empty() {
        log::warn!("No Markdown files found under {}", root.display());
    }

    let documents = files
        .iter()
        .map(|file| read_document(file, options))
        .collect::<Result<Vec<_>>>()?;

    Ok(Corpus::new(documents))
}

/// Full pipeline: migrate the store, parse the corpus, rebuild all tables.
pub async fn ingest(
    db: &Db,
    root: &Path,
    range: DateRange,
    options: &ParseOptions,
) -> Result<IngestReport> {
    db.with_connection(migrate::run_bundled_migrations).await?;

    log::info!("Parsing notes under {}", root.display());
    let corpus = build_corpus(root, options)?;
    log::info!(
        "Parsed {} documents; calendar {} to {} (exclusive)",
        corpus.len(),
        range.min,
        range.max
    );

    write_corpus(db, corpus, range).await
}

/// Store an already parsed corpus, e.g. one that was also dumped as JSON.
pub async fn ingest_corpus(db: &Db, corpus: Corpus, range: DateRange) -> Result<IngestReport> {
    db.with_connection(migrate::run_bundled_migrations).await?;
    write_corpus(db, corpus, range).await
}
