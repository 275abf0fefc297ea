// src/cli/migrate.rs — Session database migration command
//
// Migrations run automatically at startup; this gives visibility and a way
// to undo the latest one during development.

use std::path::Path;

use crate::infra::config::Config;
use crate::infra::paths;
use crate::sessions::schema;

pub fn run_migrate(config: &Config, status_only: bool, rollback: bool) -> anyhow::Result<()> {
    let db_path = paths::resolve_data_path(&config.server.database);

    if !db_path.exists() && (status_only || rollback) {
        println!("No database found at: {}", db_path.display());
        return Ok(());
    }

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = rusqlite::Connection::open(&db_path)?;

    if rollback {
        match schema::rollback_last(&conn)? {
            Some(version) => println!("Rolled back migration v{version}."),
            None => println!("No migrations to roll back."),
        }
    } else if !status_only {
        println!("Running database migrations...");
        schema::run_migrations(&conn)?;
        println!("Migrations complete.");
    }

    show_migration_status(&conn, &db_path)
}

fn show_migration_status(conn: &rusqlite::Connection, db_path: &Path) -> anyhow::Result<()> {
    println!("Database: {}", db_path.display());
    println!("Current schema version: {}", schema::current_version(conn)?);

    let mut stmt =
        conn.prepare("SELECT version, name, applied_at FROM _migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    for row in rows {
        let (version, name, applied_at) = row?;
        println!("  v{version}: {name} (applied {applied_at})");
    }
    Ok(())
}
