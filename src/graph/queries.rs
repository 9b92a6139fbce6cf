//! Single-hop lookups for the front end's backlink, date and document views.

use rusqlite::{params, Connection};

use crate::db::Db;
use crate::error::{NotegraphError, Result};
use super::StoredEntry;

fn collect_paths(conn: &Connection, sql: &str, key: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(NotegraphError::Database)?);
    }
    Ok(out)
}

/// Documents that `relative_path` links to
pub async fn outgoing_links(db: &Db, relative_path: &str) -> Result<Vec<String>> {
    let path = relative_path.to_string();
    db.with_connection(move |conn| {
        collect_paths(
            conn,
            "SELECT t.relative_path FROM links_docs_docs l \
             JOIN documents f ON f.id = l.from_doc_id \
             JOIN documents t ON t.id = l.to_doc_id \
             WHERE f.relative_path = ?1 ORDER BY t.relative_path",
            &path,
        )
    })
    .await
}

/// Documents that link to `relative_path`
pub async fn backlinks(db: &Db, relative_path: &str) -> Result<Vec<String>> {
    let path = relative_path.to_string();
    db.with_connection(move |conn| {
        collect_paths(
            conn,
            "SELECT f.relative_path FROM links_docs_docs l \
             JOIN documents f ON f.id = l.from_doc_id \
             JOIN documents t ON t.id = l.to_doc_id \
             WHERE t.relative_path = ?1 ORDER BY f.relative_path",
            &path,
        )
    })
    .await
}

/// Documents mentioning `date` (`YYYY-MM-DD`)
pub async fn documents_for_date(db: &Db, date: &str) -> Result<Vec<String>> {
    let date = date.to_string();
    db.with_connection(move |conn| {
        collect_paths(
            conn,
            "SELECT d.relative_path FROM links_docs_dates l \
             JOIN documents d ON d.id = l.doc_id \
             JOIN dates c ON c.id = l.date_id \
             WHERE c.date = ?1 ORDER BY d.relative_path",
            &date,
        )
    })
    .await
}

/// Entries of one document in position order. Empty if the document is unknown.
pub async fn document_entries(db: &Db, relative_path: &str) -> Result<Vec<StoredEntry>> {
    let path = relative_path.to_string();
    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT e.id, e.heading, e.content, e.date FROM entries e \
             JOIN documents d ON d.id = e.doc_id \
             WHERE d.relative_path = ?1 ORDER BY e.id",
        )?;
        let rows = stmt.query_map(params![path], |row| {
            Ok(StoredEntry {
                id: row.get(0)?,
                heading: row.get(1)?,
                content: row.get(2)?,
                date: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(NotegraphError::Database)?);
        }
        Ok(out)
    })
    .await
}
