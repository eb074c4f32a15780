// 🗄️ Registry Store - SQLite table for start-up loading
// The registry is written once after a batch and read back as a lookup table

use crate::constitution::ConstitutionLabel;
use crate::registry::Registry;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

pub fn setup_registry_table(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS constitution_registry (
            id TEXT PRIMARY KEY NOT NULL,
            label TEXT NOT NULL,
            code TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_constitution_registry_label
            ON constitution_registry(label)",
        [],
    )?;

    Ok(())
}

/// Replace the stored registry with `registry` in one transaction.
/// Returns the number of rows written.
pub fn save_registry(conn: &mut Connection, registry: &Registry) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM constitution_registry", [])?;

    let mut written = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO constitution_registry (id, label, code) VALUES (?1, ?2, ?3)",
        )?;
        for (id, label) in registry.sorted() {
            stmt.execute(params![id, label.name(), label.code().to_string()])?;
            written += 1;
        }
    }

    tx.commit().context("Failed to commit registry")?;
    Ok(written)
}

/// Load the whole stored registry.
pub fn load_registry(conn: &Connection) -> Result<Registry> {
    let mut stmt = conn.prepare("SELECT id, label FROM constitution_registry")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, label) = row?;
        entries.push((id, parse_stored_label(&label)?));
    }

    Ok(entries.into_iter().collect())
}

/// Look up a single id.
pub fn lookup_label(conn: &Connection, id: &str) -> Result<Option<ConstitutionLabel>> {
    let label: Option<String> = conn
        .query_row(
            "SELECT label FROM constitution_registry WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;

    label.map(|l| parse_stored_label(&l)).transpose()
}

pub fn count_entries(conn: &Connection) -> Result<i64> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM constitution_registry", [], |row| row.get(0))?;

    Ok(count)
}

fn parse_stored_label(value: &str) -> Result<ConstitutionLabel> {
    value
        .parse()
        .map_err(|e| anyhow!("Corrupt registry row: {}", e))
}
