//! `SQLite` schema definitions for pimp.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the users table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    password_salt TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the sessions table.
pub const CREATE_SESSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL
)
";

/// SQL statement to create the password reset table.
pub const CREATE_PASSWORD_RESETS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS password_resets (
    token TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL
)
";

/// SQL statement to create the businesses table.
pub const CREATE_BUSINESSES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS businesses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    tagline TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    street TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    zip TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    website TEXT,
    hours_json TEXT NOT NULL DEFAULT '[]',
    founded INTEGER,
    owner_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    accreditation_status TEXT NOT NULL DEFAULT 'not_accredited',
    accredited_since TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the business/category link table.
pub const CREATE_BUSINESS_CATEGORIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS business_categories (
    business_id INTEGER NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    category TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (business_id, category)
)
";

/// SQL statement to create the reviews table.
pub const CREATE_REVIEWS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    business_id INTEGER NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    author_name TEXT NOT NULL,
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    helpful_count INTEGER NOT NULL DEFAULT 0,
    response_body TEXT,
    responded_at TEXT
)
";

/// SQL statement to create the claims table.
pub const CREATE_CLAIMS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS claims (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    business_id INTEGER NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    position TEXT NOT NULL,
    phone TEXT NOT NULL,
    method TEXT NOT NULL,
    note TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the accreditation applications table.
pub const CREATE_APPLICATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS accreditation_applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    business_id INTEGER NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    contact_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    years_in_business INTEGER NOT NULL,
    employees INTEGER NOT NULL,
    complaint_process TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    submitted_at TEXT NOT NULL
)
";

/// SQL statement to create the profile views table used by analytics.
pub const CREATE_PROFILE_VIEWS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS profile_views (
    business_id INTEGER NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    day TEXT NOT NULL,
    views INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (business_id, day)
)
";

/// Index for review lists per business.
pub const CREATE_REVIEWS_BUSINESS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_reviews_business ON reviews(business_id, created_at DESC)
";

/// Index for category filtering.
pub const CREATE_CATEGORY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_business_categories_category ON business_categories(category)
";

/// Index for session expiry sweeps.
pub const CREATE_SESSIONS_EXPIRY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_SESSIONS_TABLE,
    CREATE_PASSWORD_RESETS_TABLE,
    CREATE_BUSINESSES_TABLE,
    CREATE_BUSINESS_CATEGORIES_TABLE,
    CREATE_REVIEWS_TABLE,
    CREATE_CLAIMS_TABLE,
    CREATE_APPLICATIONS_TABLE,
    CREATE_PROFILE_VIEWS_TABLE,
    CREATE_REVIEWS_BUSINESS_INDEX,
    CREATE_CATEGORY_INDEX,
    CREATE_SESSIONS_EXPIRY_INDEX,
    CREATE_METADATA_TABLE,
];

/// Tables holding site data, children first, for wiping the store.
pub const DATA_TABLES: &[&str] = &[
    "profile_views",
    "accreditation_applications",
    "claims",
    "reviews",
    "business_categories",
    "businesses",
    "password_resets",
    "sessions",
    "users",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_reviews_table_constrains_rating() {
        assert!(CREATE_REVIEWS_TABLE.contains("CHECK (rating BETWEEN 1 AND 5)"));
        assert!(CREATE_REVIEWS_TABLE.contains("response_body TEXT"));
    }

    #[test]
    fn test_users_email_unique() {
        assert!(CREATE_USERS_TABLE.contains("email TEXT NOT NULL UNIQUE"));
    }

    #[test]
    fn test_every_data_table_is_created() {
        for table in DATA_TABLES {
            let needle = format!("CREATE TABLE IF NOT EXISTS {table} ");
            assert!(
                SCHEMA_STATEMENTS.iter().any(|s| s.contains(&needle)),
                "missing table {table}"
            );
        }
    }
}
