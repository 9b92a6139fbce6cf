use notegraph::{config::Config, db::Db, error::NotegraphError};

const TABLES: [&str; 5] = ["dates", "documents", "entries", "links_docs_dates", "links_docs_docs"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Only the database is needed here, so notes_root is not validated.
    let config = Config::read_from(&Config::default_path())?;
    let db = Db::new(config.db_path());

    println!("\n=== Notes Database Statistics ===\n");

    let counts = db.with_connection(|conn| {
        let mut counts = Vec::new();
        for table in TABLES {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table),
                [],
                |row| row.get(0),
            )?;
            counts.push((table, count));
        }
        Ok::<Vec<_>, NotegraphError>(counts)
    }).await?;

    println!("{:-<40}", "");
    println!("{:<24} {:>12}", "Table", "Rows");
    println!("{:-<40}", "");
    for (table, count) in &counts {
        println!("{:<24} {:>12}", table, count);
    }
    println!("{:-<40}", "");

    let (dated, first, last) = db.with_connection(|conn| {
        conn.query_row(
            "SELECT COUNT(date), MIN(date), MAX(date) FROM documents",
            [],
            |row| Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        ).map_err(NotegraphError::from)
    }).await?;

    println!("\nDocuments with an inferred date: {}", dated);
    if let (Some(first), Some(last)) = (first, last) {
        println!("  Earliest: {}", first);
        println!("  Latest: {}", last);
    }

    let most_linked = db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT d.relative_path, COUNT(*) AS incoming
            FROM links_docs_docs l
            JOIN documents d ON d.id = l.to_doc_id
            GROUP BY d.id
            ORDER BY incoming DESC, d.relative_path
            LIMIT 10
            "#
        )?;

        let mut rows = stmt.query([])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push((row.get::<_, String>(0)?, row.get::<_, i64>(1)?));
        }
        Ok::<Vec<_>, NotegraphError>(results)
    }).await?;

    if !most_linked.is_empty() {
        println!("\nMost linked documents:\n");
        for (path, incoming) in &most_linked {
            println!("  {:>5}  {}", incoming, path);
        }
    }

    println!();
    Ok(())
}
