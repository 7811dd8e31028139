//! Business listing queries: lookup, directory browsing and search.

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use serde::Serialize;
use tracing::debug;

use super::{optional_date_at, sql_int, text_enum_at, timestamp_at, Storage};
use crate::domain::{
    slugify, text_enum, Accreditation, Address, Business, BusinessHours, BusinessUpdate,
    Category, NewBusiness, RatingSummary, CATEGORIES,
};
use crate::error::{Error, Result};
use crate::pagination::{Page, Pagination};

/// Business columns plus the per-star review counts. Requires
/// `FROM businesses b LEFT JOIN reviews r` and `GROUP BY b.id`.
const BUSINESS_COLUMNS: &str = r"
    b.id, b.slug, b.name, b.tagline, b.description,
    b.street, b.city, b.state, b.zip,
    b.phone, b.email, b.website, b.hours_json, b.founded, b.owner_id,
    b.accreditation_status, b.accredited_since, b.created_at,
    COUNT(CASE WHEN r.rating = 1 THEN 1 END),
    COUNT(CASE WHEN r.rating = 2 THEN 1 END),
    COUNT(CASE WHEN r.rating = 3 THEN 1 END),
    COUNT(CASE WHEN r.rating = 4 THEN 1 END),
    COUNT(CASE WHEN r.rating = 5 THEN 1 END)
";

const BUSINESS_FROM: &str = "FROM businesses b LEFT JOIN reviews r ON r.business_id = b.id";

const AVERAGE_RATING: &str = "COALESCE(AVG(r.rating), 0)";

/// Ordering for business listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessSort {
    /// Name matches first, then rating. Same as `Rating` without a text query.
    #[default]
    Relevance,
    /// Highest average rating first.
    Rating,
    /// Most reviewed first.
    Reviews,
    /// Alphabetical.
    Name,
    /// Most recently listed first.
    Newest,
}

text_enum!(BusinessSort {
    Relevance => "relevance",
    Rating => "rating",
    Reviews => "reviews",
    Name => "name",
    Newest => "newest",
});

impl BusinessSort {
    /// Options with labels, for sort dropdowns.
    pub const OPTIONS: [(BusinessSort, &'static str); 5] = [
        (Self::Relevance, "Best match"),
        (Self::Rating, "Highest rated"),
        (Self::Reviews, "Most reviewed"),
        (Self::Name, "Name (A-Z)"),
        (Self::Newest, "Newest"),
    ];

    /// Parse a query value, falling back to `default`.
    #[must_use]
    pub fn parse_or(value: Option<&str>, default: Self) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or(default)
    }
}

/// Filters, ordering and paging for a business listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessQuery {
    /// Free text matched against name, tagline, description and category.
    pub text: Option<String>,
    /// Matched against city, state and zip.
    pub location: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// First letter of the name.
    pub letter: Option<char>,
    /// Minimum average rating.
    pub min_rating: Option<f64>,
    /// Only accredited businesses.
    pub accredited_only: bool,
    /// Only listings nobody has claimed.
    pub unclaimed_only: bool,
    /// Result order.
    pub sort: BusinessSort,
    /// 1-based page.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
}

impl BusinessQuery {
    /// A first-page query with the given page size.
    #[must_use]
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page,
            ..Self::default()
        }
    }

    fn text_pattern(&self) -> Option<String> {
        non_blank(self.text.as_deref()).map(contains_pattern)
    }

    /// `WHERE`/`HAVING` clauses and their parameters, in order.
    fn filter(&self) -> (String, Vec<Value>) {
        let mut where_parts: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(pattern) = self.text_pattern() {
            where_parts.push(
                r"(b.name LIKE ? ESCAPE '\' OR b.tagline LIKE ? ESCAPE '\'
                    OR b.description LIKE ? ESCAPE '\' OR EXISTS (
                    SELECT 1 FROM business_categories bc
                    WHERE bc.business_id = b.id AND bc.category LIKE ? ESCAPE '\'))",
            );
            params.extend(std::iter::repeat(Value::Text(pattern)).take(4));
        }
        if let Some(location) = non_blank(self.location.as_deref()) {
            let pattern = contains_pattern(location);
            where_parts.push(
                r"(b.city LIKE ? ESCAPE '\' OR b.state LIKE ? ESCAPE '\'
                    OR b.zip LIKE ? ESCAPE '\' OR b.street LIKE ? ESCAPE '\')",
            );
            params.extend(std::iter::repeat(Value::Text(pattern)).take(4));
        }
        if let Some(category) = non_blank(self.category.as_deref()) {
            where_parts.push(
                "EXISTS (SELECT 1 FROM business_categories bc
                    WHERE bc.business_id = b.id AND bc.category = ?)",
            );
            params.push(Value::Text(category.to_string()));
        }
        if let Some(letter) = self.letter {
            where_parts.push("upper(substr(b.name, 1, 1)) = ?");
            params.push(Value::Text(letter.to_ascii_uppercase().to_string()));
        }
        if self.accredited_only {
            where_parts.push("b.accreditation_status = 'accredited'");
        }
        if self.unclaimed_only {
            where_parts.push("b.owner_id IS NULL");
        }

        let mut sql = String::new();
        if !where_parts.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_parts.join(" AND "));
        }
        sql.push_str(" GROUP BY b.id");
        if let Some(min) = self.min_rating.filter(|m| *m > 0.0) {
            sql.push_str(&format!(" HAVING {AVERAGE_RATING} >= ?"));
            params.push(Value::Real(min));
        }
        (sql, params)
    }

    /// `ORDER BY` expression and its parameters.
    fn order(&self) -> (String, Vec<Value>) {
        let by_rating = format!("{AVERAGE_RATING} DESC, COUNT(r.id) DESC, b.name COLLATE NOCASE");
        match self.sort {
            BusinessSort::Relevance => match self.text_pattern() {
                Some(pattern) => (
                    format!(r"CASE WHEN b.name LIKE ? ESCAPE '\' THEN 0 ELSE 1 END, {by_rating}"),
                    vec![Value::Text(pattern)],
                ),
                None => (by_rating, Vec::new()),
            },
            BusinessSort::Rating => (by_rating, Vec::new()),
            BusinessSort::Reviews => (
                format!("COUNT(r.id) DESC, {AVERAGE_RATING} DESC, b.name COLLATE NOCASE"),
                Vec::new(),
            ),
            BusinessSort::Name => ("b.name COLLATE NOCASE, b.id".to_string(), Vec::new()),
            BusinessSort::Newest => ("b.created_at DESC, b.id DESC".to_string(), Vec::new()),
        }
    }
}

/// `LIKE` pattern matching `term` anywhere, with its wildcards taken literally.
/// Pair with `ESCAPE '\'`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Storage {
    /// Insert a listing, deriving a unique slug from its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_business(&self, business: &NewBusiness) -> Result<Business> {
        let slug = self.unique_slug(&business.name)?;
        let hours_json = serde_json::to_string(&business.hours)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r"
            INSERT INTO businesses (slug, name, tagline, description, street, city, state, zip,
                                    phone, email, website, hours_json, founded, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ",
            params![
                slug,
                business.name,
                business.tagline,
                business.description,
                business.address.street,
                business.address.city,
                business.address.state,
                business.address.zip,
                business.phone,
                business.email,
                business.website,
                hours_json,
                business.founded,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        for (position, category) in business.categories.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO business_categories (business_id, category, position)
                 VALUES (?1, ?2, ?3)",
                params![id, category, sql_int(position)],
            )?;
        }
        tx.commit()?;

        debug!("Inserted business {} as {}", id, slug);
        self.business_by_id(id)?
            .ok_or_else(|| Error::internal(format!("business {id} vanished after insert")))
    }

    fn unique_slug(&self, name: &str) -> Result<String> {
        let base = match slugify(name) {
            s if s.is_empty() => "business".to_string(),
            s => s,
        };
        let mut candidate = base.clone();
        let mut n = 2;
        while self.slug_exists(&candidate)? {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        Ok(candidate)
    }

    fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM businesses WHERE slug = ?1",
            [slug],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a listing by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn business_by_slug(&self, slug: &str) -> Result<Option<Business>> {
        let sql = format!("SELECT {BUSINESS_COLUMNS} {BUSINESS_FROM} WHERE b.slug = ?1 GROUP BY b.id");
        let business = self
            .conn
            .query_row(&sql, [slug], row_to_business)
            .optional()?;
        business.map(|b| self.with_categories(b)).transpose()
    }

    /// Get a listing by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn business_by_id(&self, id: i64) -> Result<Option<Business>> {
        let sql = format!("SELECT {BUSINESS_COLUMNS} {BUSINESS_FROM} WHERE b.id = ?1 GROUP BY b.id");
        let business = self
            .conn
            .query_row(&sql, [id], row_to_business)
            .optional()?;
        business.map(|b| self.with_categories(b)).transpose()
    }

    /// Get a listing by slug, or a not-found error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown slug.
    pub fn require_business(&self, slug: &str) -> Result<Business> {
        self.business_by_slug(slug)?
            .ok_or_else(|| Error::not_found("business", slug))
    }

    /// Listings owned by a user, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn businesses_owned_by(&self, user_id: i64) -> Result<Vec<Business>> {
        let sql = format!(
            "SELECT {BUSINESS_COLUMNS} {BUSINESS_FROM} WHERE b.owner_id = ?1
             GROUP BY b.id ORDER BY b.name COLLATE NOCASE"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let businesses = stmt
            .query_map([user_id], row_to_business)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        businesses
            .into_iter()
            .map(|b| self.with_categories(b))
            .collect()
    }

    /// Run a filtered, sorted, paginated listing query.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn search_businesses(&self, query: &BusinessQuery) -> Result<Page<Business>> {
        let (filter_sql, filter_params) = query.filter();

        let count_sql = format!("SELECT COUNT(*) FROM (SELECT b.id {BUSINESS_FROM}{filter_sql})");
        let total: i64 = self.conn.query_row(
            &count_sql,
            params_from_iter(filter_params.iter()),
            |row| row.get(0),
        )?;
        let pagination = Pagination::new(
            query.page,
            query.per_page,
            usize::try_from(total).unwrap_or(0),
        );

        let (order_sql, order_params) = query.order();
        let sql = format!(
            "SELECT {BUSINESS_COLUMNS} {BUSINESS_FROM}{filter_sql} ORDER BY {order_sql} LIMIT ? OFFSET ?"
        );
        let mut params = filter_params;
        params.extend(order_params);
        params.push(Value::Integer(sql_int(pagination.per_page)));
        params.push(Value::Integer(sql_int(pagination.offset())));

        let mut stmt = self.conn.prepare(&sql)?;
        let businesses = stmt
            .query_map(params_from_iter(params.iter()), row_to_business)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let items = businesses
            .into_iter()
            .map(|b| self.with_categories(b))
            .collect::<Result<Vec<_>>>()?;

        Ok(Page { items, pagination })
    }

    /// Top-rated accredited listings for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn featured_businesses(&self, limit: usize) -> Result<Vec<Business>> {
        let query = BusinessQuery {
            accredited_only: true,
            sort: BusinessSort::Rating,
            ..BusinessQuery::new(limit)
        };
        Ok(self.search_businesses(&query)?.items)
    }

    /// Every category with its number of listings, in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn category_counts(&self) -> Result<Vec<(&'static Category, u32)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, COUNT(*) FROM business_categories GROUP BY category")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(CATEGORIES
            .iter()
            .map(|category| {
                let n = counts
                    .iter()
                    .find(|(slug, _)| slug == category.slug)
                    .map_or(0, |(_, n)| u32::try_from(*n).unwrap_or(0));
                (category, n)
            })
            .collect())
    }

    /// Uppercase first letters that at least one listing name starts with.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn name_initials(&self) -> Result<Vec<char>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT upper(substr(name, 1, 1)) AS initial FROM businesses ORDER BY initial",
        )?;
        let initials = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(initials.iter().filter_map(|s| s.chars().next()).collect())
    }

    /// Save the owner-editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the listing does not exist.
    pub fn update_business(&self, id: i64, update: &BusinessUpdate) -> Result<()> {
        let hours_json = serde_json::to_string(&update.hours)?;
        let affected = self.conn.execute(
            r"
            UPDATE businesses
            SET tagline = ?2, description = ?3, phone = ?4, email = ?5, website = ?6, hours_json = ?7
            WHERE id = ?1
            ",
            params![
                id,
                update.tagline,
                update.description,
                update.phone,
                update.email,
                update.website,
                hours_json,
            ],
        )?;
        if affected == 0 {
            return Err(Error::not_found("business", id));
        }
        debug!("Updated profile of business {}", id);
        Ok(())
    }

    fn with_categories(&self, mut business: Business) -> Result<Business> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT category FROM business_categories WHERE business_id = ?1 ORDER BY position",
        )?;
        business.categories = stmt
            .query_map([business.id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(business)
    }
}

/// Convert a row selected with [`BUSINESS_COLUMNS`]. Categories are filled in
/// separately.
fn row_to_business(row: &Row<'_>) -> rusqlite::Result<Business> {
    let hours_json: String = row.get(12)?;
    let hours: Vec<BusinessHours> = serde_json::from_str(&hours_json).unwrap_or_default();

    let mut distribution = [0u32; 5];
    for (i, slot) in distribution.iter_mut().enumerate() {
        let n: i64 = row.get(18 + i)?;
        *slot = u32::try_from(n).unwrap_or(0);
    }

    Ok(Business {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        tagline: row.get(3)?,
        description: row.get(4)?,
        categories: Vec::new(),
        address: Address {
            street: row.get(5)?,
            city: row.get(6)?,
            state: row.get(7)?,
            zip: row.get(8)?,
        },
        phone: row.get(9)?,
        email: row.get(10)?,
        website: row.get(11)?,
        hours,
        founded: row.get(13)?,
        owner_id: row.get(14)?,
        accreditation: Accreditation {
            status: text_enum_at(row, 15)?,
            since: optional_date_at(row, 16)?,
        },
        created_at: timestamp_at(row, 17)?,
        rating: RatingSummary::from_distribution(distribution),
    })
}
