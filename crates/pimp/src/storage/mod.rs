//! Storage layer for pimp.
//!
//! This module provides `SQLite`-based persistent storage for the directory:
//! businesses and their categories, reviews, user accounts and sessions,
//! ownership claims, accreditation applications and profile-view analytics.
//!
//! Queries are grouped by concern into submodules, each adding methods to
//! [`Storage`].

pub mod accreditation;
pub mod analytics;
pub mod businesses;
mod credentials;
pub mod claims;
pub mod migrations;
pub mod reviews;
pub mod schema;
pub mod seed;
pub mod users;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use accreditation::ApplicationRow;
pub use analytics::{BusinessAnalytics, DailyViews, MonthlyReviews};
pub use businesses::{BusinessQuery, BusinessSort};
pub use claims::ClaimRow;
pub use reviews::{RecentReview, ReviewQuery};

/// Path label used for in-memory databases.
const MEMORY_PATH: &str = ":memory:";

/// Storage engine for the directory.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance, used by tests and `pimp render`.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store holds no businesses yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.count_rows("businesses")? == 0)
    }

    /// Delete every row of site data, keeping the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn wipe(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for table in schema::DATA_TABLES {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        tx.commit()?;
        info!("Wiped all site data");
        Ok(())
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let count_where = |sql: &str| -> Result<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or(0))
        };

        let db_size_bytes = if self.path.as_os_str() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            businesses: self.count_rows("businesses")?,
            accredited: count_where(
                "SELECT COUNT(*) FROM businesses WHERE accreditation_status = 'accredited'",
            )?,
            claimed: count_where("SELECT COUNT(*) FROM businesses WHERE owner_id IS NOT NULL")?,
            reviews: self.count_rows("reviews")?,
            users: self.count_rows("users")?,
            active_sessions: count_where(&format!(
                "SELECT COUNT(*) FROM sessions WHERE expires_at > '{}'",
                Utc::now().to_rfc3339()
            ))?,
            pending_claims: count_where("SELECT COUNT(*) FROM claims WHERE status = 'pending'")?,
            pending_applications: count_where(
                "SELECT COUNT(*) FROM accreditation_applications WHERE status = 'pending'",
            )?,
            db_size_bytes,
        })
    }

    fn count_rows(&self, table: &str) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of listings.
    pub businesses: u64,
    /// Listings currently accredited.
    pub accredited: u64,
    /// Listings with an owner.
    pub claimed: u64,
    /// Number of reviews.
    pub reviews: u64,
    /// Registered accounts.
    pub users: u64,
    /// Sessions that have not expired.
    pub active_sessions: u64,
    /// Claims awaiting a decision.
    pub pending_claims: u64,
    /// Accreditation applications awaiting a decision.
    pub pending_applications: u64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// Convert a limit or offset to an SQL integer.
fn sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Read an RFC 3339 timestamp column.
fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text)
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(idx, text, Type::Text))
}

/// Read an optional RFC 3339 timestamp column.
fn optional_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    Ok(text.as_deref().and_then(parse_timestamp))
}

/// Read an optional `YYYY-MM-DD` date column.
fn optional_date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(idx)?;
    Ok(text.and_then(|t| NaiveDate::parse_from_str(&t, "%Y-%m-%d").ok()))
}

/// Read a text column into one of the domain's text-backed enums.
fn text_enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = Error>,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e: Error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a non-negative integer column as `u32`.
fn u32_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let n: i64 = row.get(idx)?;
    Ok(u32::try_from(n).unwrap_or(0))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
