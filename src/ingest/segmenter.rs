use std::ops::Range;

use pulldown_cmark::{Event, Parser as CmarkParser, Tag};
use serde::{Deserialize, Serialize};

use super::dates::guess_date;
use super::document::{Entry, Field};

/// How heading lines are recognized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    /// Every line starting with `#+ ` is a heading, including lines inside
    /// fenced code blocks (known limitation, kept as the default).
    #[default]
    Lines,
    /// Like `Lines`, but `#` lines inside code blocks are body text.
    FenceAware,
}

/// Count of leading `#` when followed by a space, otherwise 0.
pub fn heading_level(line: &str) -> usize {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes > 0 && line.as_bytes().get(hashes) == Some(&b' ') {
        hashes
    } else {
        0
    }
}

/// Split a document into heading-delimited entries.
///
/// The text before the first heading becomes an entry with an absent
/// heading, unless there is no such text. The last entry is always emitted,
/// so a zero-byte document yields one entry (absent heading, empty content).
pub fn segment(text: &str, mode: SegmentMode) -> Vec<Entry> {
    let code_blocks = match mode {
        SegmentMode::Lines => Vec::new(),
        SegmentMode::FenceAware => code_block_spans(text),
    };

    let mut entries = Vec::new();
    let mut heading: Option<String> = None;
    let mut body = String::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let in_code = code_blocks.iter().any(|span| span.contains(&line_start));
        if heading_level(line) > 0 && !in_code {
            if heading.is_some() || !body.is_empty() {
                let position = entries.len();
                entries.push(close_entry(heading.take(), std::mem::take(&mut body), position));
            }
            heading = Some(strip_line_ending(line).to_string());
        } else {
            body.push_str(line);
        }
    }

    let position = entries.len();
    entries.push(close_entry(heading, body, position));
    entries
}

fn close_entry(heading: Option<String>, body: String, position: usize) -> Entry {
    let content = match (&heading, body.is_empty()) {
        (_, false) => Field::Text(body),
        (Some(_), true) => Field::Absent,
        (None, true) => Field::Empty,
    };
    let date = guess_date(content.as_str(), heading.as_deref());

    Entry {
        heading: heading.map(Field::from_text).unwrap_or(Field::Absent),
        content,
        position,
        date,
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Byte spans of fenced and indented code blocks
fn code_block_spans(text: &str) -> Vec<Range<usize>> {
    CmarkParser::new(text)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) => Some(range),
            _ => None,
        })
        .collect()
}
