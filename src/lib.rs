pub mod config;
pub mod error;
pub mod db;
pub mod ingest;
pub mod graph;

pub use config::Config;
pub use error::{NotegraphError, Result};
pub use ingest::{build_corpus, ingest, ingest_corpus, Corpus, DateRange, IngestReport, ParseOptions};
pub use graph::{DocEdge, traverse_links};
