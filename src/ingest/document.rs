use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use super::dates::{find_all_timestamps, guess_date};
use super::links::{find_dates, find_document_references, LinkStyle};
use super::metadata::{file_name, normalize_relative_path};
use super::segmenter::{segment, SegmentMode};
use super::walker::FileMetadata;
use crate::error::{NotegraphError, Result};

/// Knobs that change how a document is parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseOptions {
    pub link_style: LinkStyle,
    pub segment_mode: SegmentMode,
}

/// A text field that distinguishes "not there" from "there but empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum Field {
    Absent,
    Empty,
    Text(String),
}

impl Field {
    pub fn from_text(text: String) -> Self {
        if text.is_empty() {
            Field::Empty
        } else {
            Field::Text(text)
        }
    }

    /// Absent and Empty both read as `""`
    pub fn as_str(&self) -> &str {
        match self {
            Field::Text(text) => text,
            Field::Absent | Field::Empty => "",
        }
    }

    /// Storage form: Absent is NULL, Empty is `""`
    pub fn as_option(&self) -> Option<&str> {
        match self {
            Field::Absent => None,
            other => Some(other.as_str()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }
}

/// A heading-delimited subsection of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Heading line with its hashes, without line terminator. Absent before the first heading.
    pub heading: Field,
    /// Body lines verbatim. Absent when a heading has no body lines.
    pub content: Field,
    /// Zero-based order among the document's entries
    pub position: usize,
    pub date: Option<String>,
}

impl Entry {
    /// Number of leading `#` on the heading, 0 for the preamble entry
    pub fn heading_level(&self) -> usize {
        super::segmenter::heading_level(self.heading.as_str())
    }

    /// The source text this entry was cut from (heading line gets a `\n`).
    pub fn to_markdown(&self) -> String {
        match &self.heading {
            Field::Text(heading) => format!("{}\n{}", heading, self.content.as_str()),
            Field::Absent | Field::Empty => self.content.as_str().to_string(),
        }
    }
}

/// One Markdown file of the corpus, keyed by its relative path
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub relative_path: String,
    pub filename: String,
    pub date: Option<String>,
}

impl Document {
    pub fn new(relative_path: &str, date: Option<String>) -> Self {
        let relative_path = normalize_relative_path(relative_path);
        let filename = file_name(&relative_path).to_string();
        Self {
            relative_path,
            filename,
            date,
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.relative_path == other.relative_path
    }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        self.relative_path.cmp(&other.relative_path)
    }
}

/// Everything extracted from one file, before any database ids exist
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub document: Document,
    pub entries: Vec<Entry>,
    /// Dates mentioned anywhere in the text
    pub date_links: BTreeSet<String>,
    /// Document references as written, unresolved
    pub doc_links: BTreeSet<String>,
    pub timestamps: BTreeSet<String>,
}

/// Parse the text of one document
pub fn parse_document(relative_path: &str, text: &str, options: &ParseOptions) -> ParsedDocument {
    ParsedDocument {
        document: Document::new(relative_path, guess_date(text, None)),
        entries: segment(text, options.segment_mode),
        date_links: find_dates(text),
        doc_links: find_document_references(text, options.link_style),
        timestamps: find_all_timestamps(text),
    }
}

/// Read and parse a discovered file. Non-UTF-8 content is a hard error.
pub fn read_document(file: &FileMetadata, options: &ParseOptions) -> Result<ParsedDocument> {
    let text = std::fs::read_to_string(&file.absolute_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            NotegraphError::Decode {
                path: file.relative_path.clone(),
                source: e,
            }
        } else {
            NotegraphError::Io(e)
        }
    })?;

    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let parsed = parse_document(&file.relative_path, text, options);
    log::debug!(
        "Parsed {} ({} entries, {} dates, {} links)",
        file.relative_path,
        parsed.entries.len(),
        parsed.date_links.len(),
        parsed.doc_links.len()
    );
    Ok(parsed)
}
