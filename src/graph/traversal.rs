//! BFS traversal over links_docs_docs.

use std::collections::{HashSet, VecDeque};

use rusqlite::params;

use crate::db::Db;
use crate::graph::DocEdge;
use crate::{NotegraphError, Result};

/// Traverse the document link graph breadth-first from `start_path`.
///
/// Returns every edge that reaches a not-yet-visited document within
/// `max_depth` hops. Cycles are cut at the first revisit.
pub async fn traverse_links(db: &Db, start_path: &str, max_depth: usize) -> Result<Vec<DocEdge>> {
    let start = start_path.to_string();
    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT t.relative_path FROM links_docs_docs l \
             JOIN documents f ON f.id = l.from_doc_id \
             JOIN documents t ON t.id = l.to_doc_id \
             WHERE f.relative_path = ?1 ORDER BY t.relative_path",
        )?;

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut result = Vec::new();

        visited.insert(start.clone());
        queue.push_back((start, 0));

        while let Some((path, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            let targets = stmt
                .query_map(params![path], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
                .map_err(NotegraphError::Database)?;

            for target in targets {
                if visited.insert(target.clone()) {
                    result.push(DocEdge {
                        from_path: path.clone(),
                        to_path: target.clone(),
                        depth: depth + 1,
                    });
                    queue.push_back((target, depth + 1));
                }
            }
        }

        Ok(result)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use crate::ingest::{parse_document, write_corpus, Corpus, DateRange, ParseOptions};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    /// a -> b -> c, a -> d, c -> a
    async fn setup_test_db_with_links() -> (Db, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("test.db"));
        db.with_connection(migrate::run_bundled_migrations).await.unwrap();

        let options = ParseOptions::default();
        let corpus = Corpus::new(vec![
            parse_document("a.md", "[[b]] [[d]]", &options),
            parse_document("b.md", "[[c]]", &options),
            parse_document("c.md", "[[a]]", &options),
            parse_document("d.md", "leaf", &options),
        ]);
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        write_corpus(&db, corpus, DateRange::new(day, day)).await.unwrap();
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_traverse_single_hop() {
        let (db, _temp) = setup_test_db_with_links().await;
        let edges = traverse_links(&db, "a.md", 1).await.unwrap();
        let targets: Vec<_> = edges.iter().map(|e| e.to_path.as_str()).collect();
        assert_eq!(targets, vec!["b.md", "d.md"]);
        assert!(edges.iter().all(|e| e.depth == 1));
    }

    #[tokio::test]
    async fn test_traverse_multi_hop() {
        let (db, _temp) = setup_test_db_with_links().await;
        let edges = traverse_links(&db, "a.md", 3).await.unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(
            edges[2],
            DocEdge {
                from_path: "b.md".to_string(),
                to_path: "c.md".to_string(),
                depth: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_traverse_depth_limit() {
        let (db, _temp) = setup_test_db_with_links().await;
        let edges = traverse_links(&db, "a.md", 0).await.unwrap();
        assert!(edges.is_empty());
    }

    #[tokio::test]
    async fn test_traverse_cycle_no_infinite_loop() {
        let (db, _temp) = setup_test_db_with_links().await;
        // c -> a revisits the start and is skipped
        let edges = traverse_links(&db, "a.md", 10).await.unwrap();
        assert_eq!(edges.len(), 3);
        assert!(!edges.iter().any(|e| e.to_path == "a.md"));
    }

    #[tokio::test]
    async fn test_traverse_unknown_document() {
        let (db, _temp) = setup_test_db_with_links().await;
        let edges = traverse_links(&db, "nonexistent.md", 2).await.unwrap();
        assert!(edges.is_empty());
    }
}
