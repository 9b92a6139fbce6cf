//! Embedded dates and document references (regex-based).
//!
//! The `.md` test is case-insensitive to match file discovery.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::dates::find_all_dates;

/// Which link grammar a corpus uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `[label](target.md)`
    Markdown,
    /// `[[target]]`
    Wiki,
    #[default]
    Both,
}

impl LinkStyle {
    fn markdown(self) -> bool {
        matches!(self, LinkStyle::Markdown | LinkStyle::Both)
    }

    fn wiki(self) -> bool {
        matches!(self, LinkStyle::Wiki | LinkStyle::Both)
    }
}

/// `[label](target.md#anchor "title")`, target either bare or in `<...>`.
static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\[[^\]]*\]\(\s*",
        r"(?:<([^<>\n#]+?(?i:\.md))(?:#[^<>\n]*)?>|([^()\s<>#]+?(?i:\.md))(?:#[^()\s]*)?)",
        r#"(?:\s+(?:"[^"\n]*"|'[^'\n]*'))?\s*\)"#,
    ))
    .expect("valid markdown link regex")
});
static WIKI_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]\|#]+)(?:[#|][^\]]*)?\]\]").expect("valid wiki link regex")
});

/// Dates mentioned anywhere in `text`
pub fn find_dates(text: &str) -> BTreeSet<String> {
    find_all_dates(text)
}

/// Document references as written in `text`, deduplicated.
///
/// Markdown targets keep their path (minus `#anchor`, `%20` decoded).
/// Wiki names are trimmed and get `.md` appended when missing.
/// External URLs are not document references.
pub fn find_document_references(text: &str, style: LinkStyle) -> BTreeSet<String> {
    let mut references = BTreeSet::new();

    if style.markdown() {
        for cap in MARKDOWN_LINK_RE.captures_iter(text) {
            let Some(target) = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str()) else {
                continue;
            };
            if target.contains("://") {
                continue;
            }
            references.insert(target.replace("%20", " "));
        }
    }

    if style.wiki() {
        for cap in WIKI_LINK_RE.captures_iter(text) {
            let name = cap[1].trim();
            if name.is_empty() || name.contains("://") {
                continue;
            }
            if has_md_extension(name) {
                references.insert(name.to_string());
            } else {
                references.insert(format!("{}.md", name));
            }
        }
    }

    references
}

/// Same extension rule as file discovery: `.md` in any case.
fn has_md_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".md")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(text: &str, style: LinkStyle) -> Vec<String> {
        find_document_references(text, style).into_iter().collect()
    }

    #[test]
    fn test_markdown_links() {
        let text = "See [b](b.md), [deep](notes/c.md#part) and [img](pic.png).";
        assert_eq!(refs(text, LinkStyle::Markdown), vec!["b.md", "notes/c.md"]);
    }

    #[test]
    fn test_markdown_link_decodes_spaces_and_skips_urls() {
        let text = "[x](My%20Note.md) [y](https://example.com/page.md)";
        assert_eq!(refs(text, LinkStyle::Markdown), vec!["My Note.md"]);
    }

    #[test]
    fn test_markdown_link_with_title_and_angle_target() {
        let text = "See [b](b.md \"The B note\"), [c](<My Note.md>) and [d](d.md#top 'D').";
        assert_eq!(
            refs(text, LinkStyle::Markdown),
            vec!["My Note.md", "b.md", "d.md"]
        );
    }

    #[test]
    fn test_uppercase_extension_is_kept_as_written() {
        assert_eq!(refs("[x](NOTES.MD) [y](Plan.Md)", LinkStyle::Markdown), vec!["NOTES.MD", "Plan.Md"]);
        assert_eq!(refs("[[NOTES.MD]] [[Todo]]", LinkStyle::Wiki), vec!["NOTES.MD", "Todo.md"]);
    }

    #[test]
    fn test_wiki_links() {
        let text = "Link [[Project Plan]], [[daily/2020-01-01|today]], [[ref.md#Intro]] and [[ ]].";
        assert_eq!(
            refs(text, LinkStyle::Wiki),
            vec!["Project Plan.md", "daily/2020-01-01.md", "ref.md"]
        );
    }

    #[test]
    fn test_style_selection() {
        let text = "[a](a.md) [[b]]";
        assert_eq!(refs(text, LinkStyle::Markdown), vec!["a.md"]);
        assert_eq!(refs(text, LinkStyle::Wiki), vec!["b.md"]);
        assert_eq!(refs(text, LinkStyle::Both), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_link_style_from_cli_name() {
        assert_eq!(LinkStyle::from_str("wiki", true).unwrap(), LinkStyle::Wiki);
        assert_eq!(LinkStyle::from_str("Markdown", true).unwrap(), LinkStyle::Markdown);
        assert!(LinkStyle::from_str("html", true).is_err());
    }

    #[test]
    fn test_references_deduplicated() {
        let text = "[one](b.md) [two](b.md) [[b]] [[b.md]]";
        assert_eq!(refs(text, LinkStyle::Both), vec!["b.md"]);
    }

    #[test]
    fn test_no_references() {
        assert!(find_document_references("plain text (not a link.md)", LinkStyle::Both).is_empty());
    }

    #[test]
    fn test_find_dates_delegates() {
        let dates = find_dates("2020-01-01 then 2020-01-02 then 2020-01-01");
        assert_eq!(dates.len(), 2);
    }
}
