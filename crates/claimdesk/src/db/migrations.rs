//! Schema migrations for the claims backend.
//!
//! Tracks applied migrations in a `_migrations` table and applies
//! pending ones in order. Column additions are conditional so a database
//! created by another client of the same backend can be adopted.

use rusqlite::Connection;

use super::error::DatabaseError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
    kind: MigrationKind,
}

enum MigrationKind {
    /// Execute the SQL directly.
    Standard,
    /// ALTER TABLE ADD COLUMN, skipped when the column already exists.
    AddColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// All migrations in order. Each is applied at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_reference_masters",
        sql: include_str!("sql/001_create_reference_masters.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 2,
        description: "create_worker_tables",
        sql: include_str!("sql/002_create_worker_tables.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 3,
        description: "create_claim_review_tables",
        sql: include_str!("sql/003_create_claim_review_tables.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 4,
        description: "create_attachment_payment_tables",
        sql: include_str!("sql/004_create_attachment_payment_tables.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 5,
        description: "add_region_to_cpm_review",
        sql: include_str!("sql/005_add_region_to_cpm_review.sql"),
        kind: MigrationKind::AddColumn {
            table: "compensationcalculationcpmreview",
            column: "RegionName",
        },
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        let should_run = match &migration.kind {
            MigrationKind::Standard => true,
            MigrationKind::AddColumn { table, column } => !column_exists(conn, table, column)?,
        };

        if should_run {
            conn.execute_batch(migration.sql)
                .map_err(|e| DatabaseError::Migration {
                    version: migration.version,
                    reason: e.to_string(),
                })?;
        } else {
            log::info!(
                "Skipping migration v{} (column already present)",
                migration.version
            );
        }

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

/// Checks whether a column exists on a table using `PRAGMA table_info`.
pub(crate) fn column_exists(
    conn: &Connection,
    table: &str,
    column: &str,
) -> Result<bool, DatabaseError> {
    if !super::is_identifier(table) {
        return Err(DatabaseError::InvalidIdentifier(table.to_string()));
    }
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|r| r.map(|name| name == column).unwrap_or(false));
    Ok(exists)
}
