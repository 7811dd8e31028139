//! Schema versioning.
//!
//! The base tables come from [`SCHEMA_STATEMENTS`]. Later changes are listed
//! in [`MIGRATIONS`] and applied in order, each in its own transaction, with
//! the reached version recorded in the `metadata` table.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// Metadata key holding the applied schema version.
const VERSION_KEY: &str = "schema_version";

/// One schema change.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Version reached once applied.
    pub version: i32,
    /// What the change does, for the log.
    pub description: &'static str,
    /// Statements to run. Empty for the base schema.
    pub sql: &'static str,
}

/// Every migration, oldest first.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "base directory schema",
        sql: "",
    },
    Migration {
        version: 2,
        description: "indexes for per-user reviews and open claims",
        sql: "CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id);
              CREATE INDEX IF NOT EXISTS idx_claims_business_status ON claims(business_id, status);",
    },
];

/// The version a fully migrated database is at.
#[must_use]
pub fn latest_version() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Create the base tables and apply pending migrations.
///
/// # Errors
///
/// Returns an error if a statement fails or the stored version is unreadable.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let applied = schema_version(conn)?;
    if applied > latest_version() {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database is at schema v{applied}, newer than this build (v{})",
                latest_version()
            ),
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        apply(conn, migration)?;
    }
    debug!("Schema at v{}", latest_version());
    Ok(())
}

/// The applied version, or 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    info!(
        "Applying schema migration v{}: {}",
        migration.version, migration.description
    );
    let tx = conn.unchecked_transaction()?;
    if !migration.sql.is_empty() {
        tx.execute_batch(migration.sql)
            .map_err(|e| Error::DatabaseMigration {
                message: format!("v{} failed: {e}", migration.version),
            })?;
    }
    tx.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (VERSION_KEY, migration.version.to_string()),
    )?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'index'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(std::result::Result::unwrap)
            .collect()
    }

    fn set_version(conn: &Connection, value: &str) {
        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
            [value],
        )
        .unwrap();
    }

    #[test]
    fn test_migrations_are_ordered() {
        let versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let expected: Vec<i32> = (1..=latest_version()).collect();
        assert_eq!(versions, expected);
    }

    #[test]
    fn test_fresh_database_reaches_latest() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());

        for table in ["businesses", "reviews", "users", "sessions", "claims", "metadata"] {
            let found: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(found, 1, "missing {table}");
        }

        let indexes = index_names(&conn);
        for index in ["idx_reviews_business", "idx_reviews_user", "idx_claims_business_status"] {
            assert!(indexes.iter().any(|n| n == index), "missing {index}");
        }
    }

    #[test]
    fn test_reopening_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn test_upgrades_from_v1() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute_batch("DROP INDEX idx_reviews_user; DROP INDEX idx_claims_business_status;")
            .unwrap();
        set_version(&conn, "1");

        initialize_schema(&conn).unwrap();
        assert!(index_names(&conn).iter().any(|n| n == "idx_reviews_user"));
        assert_eq!(schema_version(&conn).unwrap(), 2);
    }

    #[test]
    fn test_rejects_unreadable_or_newer_versions() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        set_version(&conn, "two");
        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid schema version"));

        set_version(&conn, "99");
        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("newer than this build"));
    }
}
