use rusqlite::{Connection, params};
use std::fs;
use std::path::Path;
use crate::error::{Result, NotegraphError};

/// Migration metadata
struct Migration {
    version: u32,
    name: String,
    sql: String,
}

/// Migrations compiled into the binary, so `ingest` works from any directory.
const BUNDLED: &[(&str, &str)] = &[(
    "001_notes_schema.sql",
    include_str!("../../migrations/001_notes_schema.sql"),
)];

/// Create schema_migrations table if it doesn't exist
fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get list of applied migrations
pub fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations ORDER BY version")?;
    let names: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
        .map_err(NotegraphError::Database)?;
    Ok(names)
}

/// Parse "001_notes_schema.sql" into a migration
fn migration_from_file(filename: &str, sql: String) -> Result<Migration> {
    let version_str = filename
        .split('_')
        .next()
        .ok_or_else(|| NotegraphError::Config(format!("Invalid migration filename: {}", filename)))?;
    let version: u32 = version_str.parse()
        .map_err(|_| NotegraphError::Config(format!("Invalid migration version: {}", version_str)))?;

    Ok(Migration {
        version,
        name: filename.trim_end_matches(".sql").to_string(),
        sql,
    })
}

/// Load migration files from migrations directory
fn load_migrations(migrations_dir: &Path) -> Result<Vec<Migration>> {
    let mut migrations = Vec::new();

    let mut files: Vec<_> = fs::read_dir(migrations_dir)
        .map_err(NotegraphError::Io)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();
    files.sort_by_key(|e| e.file_name());

    for entry in files {
        let path = entry.path();
        let filename = path.file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| NotegraphError::Config("Invalid migration filename".to_string()))?;
        let sql = fs::read_to_string(&path).map_err(NotegraphError::Io)?;
        migrations.push(migration_from_file(filename, sql)?);
    }

    migrations.sort_by_key(|m| m.version);
    Ok(migrations)
}

fn bundled_migrations() -> Result<Vec<Migration>> {
    BUNDLED
        .iter()
        .map(|(filename, sql)| migration_from_file(filename, sql.to_string()))
        .collect()
}

fn apply(conn: &mut Connection, migrations: Vec<Migration>) -> Result<()> {
    ensure_migrations_table(conn)?;
    let applied = get_applied_migrations(conn)?;

    for migration in migrations {
        if applied.contains(&migration.name) {
            log::debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        log::info!("Applying migration: {} (version {})", migration.name, migration.version);

        let tx = conn.transaction()?;
        tx.execute_batch(&migration.sql)
            .map_err(|e| {
                NotegraphError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                    Some(format!("Failed to execute migration {}: {}", migration.name, e))
                ))
            })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )?;
        tx.commit()?;

        log::info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}

/// Run all pending migrations found in `migrations_dir`
pub fn run_migrations(conn: &mut Connection, migrations_dir: &Path) -> Result<()> {
    let migrations = load_migrations(migrations_dir)?;
    apply(conn, migrations)?;
    log::info!("All migrations completed");
    Ok(())
}

/// Run the migrations compiled into the crate
pub fn run_bundled_migrations(conn: &mut Connection) -> Result<()> {
    apply(conn, bundled_migrations()?)?;
    log::debug!("Bundled migrations completed");
    Ok(())
}
