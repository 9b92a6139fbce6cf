use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension, Statement, Transaction};
use serde::Serialize;

use super::dates::DateRange;
use super::metadata::{file_name, normalize_relative_path, resolve_reference};
use super::Corpus;
use crate::db::Db;
use crate::error::{NotegraphError, Result};

/// Row counts of one ingestion run, plus the links that did not resolve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub dates: usize,
    pub documents: usize,
    pub entries: usize,
    pub date_links: usize,
    pub doc_links: usize,
    /// Dates mentioned in a document but outside the calendar range
    pub dropped_date_links: usize,
    /// References to files that are not in the corpus
    pub dropped_doc_links: usize,
}

/// Write the whole corpus and calendar into the store.
///
/// Runs in a single transaction: existing rows are cleared, then dates,
/// documents, entries, date links and document links are inserted in that
/// order. Unresolved links are skipped and counted; any database error rolls
/// back everything.
pub async fn write_corpus(db: &Db, corpus: Corpus, range: DateRange) -> Result<IngestReport> {
    db.with_connection(move |conn| {
        let calendar = range.days();
        write_corpus_with(conn, &corpus, &calendar)
    })
    .await
}

/// Blocking variant of [`write_corpus`] for callers holding a connection
pub fn write_corpus_with(
    conn: &mut Connection,
    corpus: &Corpus,
    calendar: &[String],
) -> Result<IngestReport> {
    let tx = conn.transaction()?;
    let mut report = IngestReport::default();

    clear_tables(&tx)?;
    report.dates = insert_dates(&tx, calendar)?;
    report.documents = insert_documents(&tx, corpus)?;
    report.entries = insert_entries(&tx, corpus)?;

    let (inserted, dropped) = insert_date_links(&tx, corpus)?;
    report.date_links = inserted;
    report.dropped_date_links = dropped;

    let (inserted, dropped) = insert_doc_links(&tx, corpus)?;
    report.doc_links = inserted;
    report.dropped_doc_links = dropped;

    tx.commit()?;

    log::info!(
        "Wrote {} dates, {} documents, {} entries, {} date links ({} dropped), {} doc links ({} dropped)",
        report.dates,
        report.documents,
        report.entries,
        report.date_links,
        report.dropped_date_links,
        report.doc_links,
        report.dropped_doc_links
    );
    Ok(report)
}

/// Children first so foreign keys hold at every step
fn clear_tables(tx: &Transaction) -> Result<()> {
    tx.execute_batch(
        "DELETE FROM links_docs_docs; \
         DELETE FROM links_docs_dates; \
         DELETE FROM entries; \
         DELETE FROM documents; \
         DELETE FROM dates;",
    )?;
    Ok(())
}

fn insert_dates(tx: &Transaction, calendar: &[String]) -> Result<usize> {
    let mut stmt = tx.prepare("INSERT INTO dates (date) VALUES (?1)")?;
    for date in calendar {
        stmt.execute(params![date])?;
    }
    Ok(calendar.len())
}

fn insert_documents(tx: &Transaction, corpus: &Corpus) -> Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO documents (filename, relative_path, date) VALUES (?1, ?2, ?3)",
    )?;
    for parsed in corpus.iter() {
        let doc = &parsed.document;
        stmt.execute(params![doc.filename, doc.relative_path, doc.date])?;
    }
    Ok(corpus.len())
}

fn insert_entries(tx: &Transaction, corpus: &Corpus) -> Result<usize> {
    let mut by_path = tx.prepare("SELECT id FROM documents WHERE relative_path = ?1")?;
    let mut insert = tx.prepare(
        "INSERT INTO entries (doc_id, heading, content, date) VALUES (?1, ?2, ?3, ?4)",
    )?;

    let mut count = 0;
    for parsed in corpus.iter() {
        let doc_id = owning_doc_id(&mut by_path, &parsed.document.relative_path)?;
        for entry in &parsed.entries {
            insert.execute(params![
                doc_id,
                entry.heading.as_option(),
                entry.content.as_option(),
                entry.date,
            ])?;
            count += 1;
        }
    }
    Ok(count)
}

fn insert_date_links(tx: &Transaction, corpus: &Corpus) -> Result<(usize, usize)> {
    let mut by_path = tx.prepare("SELECT id FROM documents WHERE relative_path = ?1")?;
    let mut by_date = tx.prepare("SELECT id FROM dates WHERE date = ?1")?;
    let mut insert = tx.prepare("INSERT INTO links_docs_dates (doc_id, date_id) VALUES (?1, ?2)")?;

    let (mut inserted, mut dropped) = (0, 0);
    for parsed in corpus.iter() {
        let doc_id = owning_doc_id(&mut by_path, &parsed.document.relative_path)?;
        for date in &parsed.date_links {
            match query_id(&mut by_date, date)? {
                Some(date_id) => {
                    insert.execute(params![doc_id, date_id])?;
                    inserted += 1;
                }
                None => {
                    log::debug!("Dropped date link {} -> {} (outside calendar)", parsed.document.relative_path, date);
                    dropped += 1;
                }
            }
        }
    }
    Ok((inserted, dropped))
}

fn insert_doc_links(tx: &Transaction, corpus: &Corpus) -> Result<(usize, usize)> {
    let mut by_path = tx.prepare("SELECT id FROM documents WHERE relative_path = ?1")?;
    let mut by_name = tx.prepare("SELECT id FROM documents WHERE filename = ?1 ORDER BY id LIMIT 1")?;
    let mut insert = tx.prepare("INSERT INTO links_docs_docs (from_doc_id, to_doc_id) VALUES (?1, ?2)")?;

    let (mut inserted, mut dropped) = (0, 0);
    for parsed in corpus.iter() {
        let from_path = &parsed.document.relative_path;
        let from_id = owning_doc_id(&mut by_path, from_path)?;

        let mut targets = BTreeSet::new();
        for reference in &parsed.doc_links {
            match resolve_doc_reference(&mut by_path, &mut by_name, from_path, reference)? {
                Some(to_id) => {
                    targets.insert(to_id);
                }
                None => {
                    log::debug!("Dropped doc link {} -> {} (not in corpus)", from_path, reference);
                    dropped += 1;
                }
            }
        }

        for to_id in targets {
            insert.execute(params![from_id, to_id])?;
            inserted += 1;
        }
    }
    Ok((inserted, dropped))
}

/// Sibling path first, then the path as written from the root, then bare file name.
fn resolve_doc_reference(
    by_path: &mut Statement,
    by_name: &mut Statement,
    from_path: &str,
    reference: &str,
) -> Result<Option<i64>> {
    if let Some(candidate) = resolve_reference(from_path, reference) {
        if let Some(id) = query_id(by_path, &candidate)? {
            return Ok(Some(id));
        }
    }

    let as_written = normalize_relative_path(reference);
    if let Some(id) = query_id(by_path, &as_written)? {
        return Ok(Some(id));
    }

    query_id(by_name, file_name(reference))
}

fn query_id(stmt: &mut Statement, key: &str) -> Result<Option<i64>> {
    stmt.query_row(params![key], |row| row.get::<_, i64>(0))
        .optional()
        .map_err(NotegraphError::Database)
}

/// Documents were inserted in the same transaction, so a miss is a bug.
fn owning_doc_id(by_path: &mut Statement, relative_path: &str) -> Result<i64> {
    query_id(by_path, relative_path)?.ok_or_else(|| {
        NotegraphError::InvalidInput(format!("document not inserted: {}", relative_path))
    })
}
