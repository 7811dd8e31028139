//! Review queries: posting, listing, helpful votes and owner responses.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use serde::Serialize;
use tracing::debug;

use super::{optional_timestamp_at, sql_int, timestamp_at, u32_at, Storage};
use crate::domain::review::RESPONSE_MAX;
use crate::domain::{NewReview, OwnerResponse, Review, ReviewSort};
use crate::error::{Error, Result};
use crate::pagination::{Page, Pagination};
use crate::validation::ValidationErrors;

const REVIEW_COLUMNS: &str = r"
    r.id, r.business_id, r.user_id, r.author_name, r.rating, r.title, r.body,
    r.created_at, r.helpful_count, r.response_body, r.responded_at
";

/// Filters and paging for a business's review list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewQuery {
    /// Only reviews with exactly this many stars.
    pub stars: Option<u8>,
    /// Result order.
    pub sort: ReviewSort,
    /// 1-based page.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
}

/// A review together with the listing it is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentReview {
    /// The review.
    pub review: Review,
    /// Listing name.
    pub business_name: String,
    /// Listing slug.
    pub business_slug: String,
}

impl Storage {
    /// Post a review dated now.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a rating outside 1 to 5,
    /// [`Error::NotFound`] for an unknown business, and [`Error::Conflict`] if
    /// the author has already reviewed the business.
    pub fn insert_review(&self, review: &NewReview) -> Result<Review> {
        self.insert_review_at(review, Utc::now())
    }

    /// Post a review with an explicit date. Used when seeding.
    ///
    /// # Errors
    ///
    /// Same as [`Storage::insert_review`].
    pub fn insert_review_at(&self, review: &NewReview, at: DateTime<Utc>) -> Result<Review> {
        if !(1..=5).contains(&review.rating) {
            let mut errors = ValidationErrors::new();
            errors.add("rating", "Choose a rating from 1 to 5 stars");
            return Err(errors.into());
        }
        if self.business_by_id(review.business_id)?.is_none() {
            return Err(Error::not_found("business", review.business_id));
        }
        if let Some(user_id) = review.user_id {
            if self.has_reviewed(user_id, review.business_id)? {
                return Err(Error::conflict("You have already reviewed this business"));
            }
        }

        self.conn.execute(
            r"
            INSERT INTO reviews (business_id, user_id, author_name, rating, title, body, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                review.business_id,
                review.user_id,
                review.author_name,
                review.rating,
                review.title,
                review.body,
                at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted review {} for business {}", id, review.business_id);

        self.review_by_id(id)?
            .ok_or_else(|| Error::internal(format!("review {id} vanished after insert")))
    }

    /// Whether a user has already reviewed a business.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn has_reviewed(&self, user_id: i64, business_id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE user_id = ?1 AND business_id = ?2",
            params![user_id, business_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn review_by_id(&self, id: i64) -> Result<Option<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.id = ?1");
        let review = self.conn.query_row(&sql, [id], row_to_review).optional()?;
        Ok(review)
    }

    /// One page of a business's reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn reviews_for_business(
        &self,
        business_id: i64,
        query: &ReviewQuery,
    ) -> Result<Page<Review>> {
        let mut where_sql = "WHERE r.business_id = ?".to_string();
        let mut params = vec![Value::Integer(business_id)];
        if let Some(stars) = query.stars.filter(|s| (1..=5).contains(s)) {
            where_sql.push_str(" AND r.rating = ?");
            params.push(Value::Integer(i64::from(stars)));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM reviews r {where_sql}"),
            params_from_iter(params.iter()),
            |row| row.get(0),
        )?;
        let pagination = Pagination::new(
            query.page,
            query.per_page,
            usize::try_from(total).unwrap_or(0),
        );

        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r {where_sql} ORDER BY {} LIMIT ? OFFSET ?",
            query.sort.order_by()
        );
        params.push(Value::Integer(sql_int(pagination.per_page)));
        params.push(Value::Integer(sql_int(pagination.offset())));

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(params.iter()), row_to_review)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page { items, pagination })
    }

    /// The most recent reviews across the site.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent_reviews(&self, limit: usize) -> Result<Vec<RecentReview>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS}, b.name, b.slug
             FROM reviews r JOIN businesses b ON b.id = r.business_id
             ORDER BY r.created_at DESC, r.id DESC LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let reviews = stmt
            .query_map([sql_int(limit)], row_to_recent_review)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    /// A user's own reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn reviews_by_user(&self, user_id: i64, limit: usize) -> Result<Vec<RecentReview>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS}, b.name, b.slug
             FROM reviews r JOIN businesses b ON b.id = r.business_id
             WHERE r.user_id = ?1
             ORDER BY r.created_at DESC, r.id DESC LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let reviews = stmt
            .query_map(params![user_id, sql_int(limit)], row_to_recent_review)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    /// Add a "helpful" vote and return the new count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown review.
    pub fn mark_helpful(&self, review_id: i64) -> Result<u32> {
        let count: Option<i64> = self
            .conn
            .query_row(
                "UPDATE reviews SET helpful_count = helpful_count + 1 WHERE id = ?1
                 RETURNING helpful_count",
                [review_id],
                |row| row.get(0),
            )
            .optional()?;
        count
            .map(|n| u32::try_from(n).unwrap_or(0))
            .ok_or_else(|| Error::not_found("review", review_id))
    }

    /// Post or replace the owner's response to a review.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown review, [`Error::Forbidden`]
    /// when `owner_id` does not own the reviewed business, and a validation
    /// error for an empty or overlong response.
    pub fn respond_to_review(&self, review_id: i64, owner_id: i64, body: &str) -> Result<Review> {
        let body = body.trim();
        let mut errors = ValidationErrors::new();
        if body.is_empty() {
            errors.add("response", "Response is required");
        } else if body.chars().count() > RESPONSE_MAX {
            errors.add(
                "response",
                format!("Response must be at most {RESPONSE_MAX} characters"),
            );
        }
        errors.into_result()?;

        let review = self
            .review_by_id(review_id)?
            .ok_or_else(|| Error::not_found("review", review_id))?;
        let owner: Option<i64> = self.conn.query_row(
            "SELECT owner_id FROM businesses WHERE id = ?1",
            [review.business_id],
            |row| row.get(0),
        )?;
        if owner != Some(owner_id) {
            return Err(Error::forbidden(
                "only the business owner can respond to its reviews",
            ));
        }

        self.conn.execute(
            "UPDATE reviews SET response_body = ?2, responded_at = ?3 WHERE id = ?1",
            params![review_id, body, Utc::now().to_rfc3339()],
        )?;
        debug!("Owner {} responded to review {}", owner_id, review_id);

        self.review_by_id(review_id)?
            .ok_or_else(|| Error::not_found("review", review_id))
    }
}

fn row_to_review(row: &Row<'_>) -> rusqlite::Result<Review> {
    let response_body: Option<String> = row.get(9)?;
    let responded_at = optional_timestamp_at(row, 10)?;
    let rating: i64 = row.get(4)?;

    Ok(Review {
        id: row.get(0)?,
        business_id: row.get(1)?,
        user_id: row.get(2)?,
        author_name: row.get(3)?,
        rating: u8::try_from(rating).unwrap_or(0),
        title: row.get(5)?,
        body: row.get(6)?,
        created_at: timestamp_at(row, 7)?,
        helpful_count: u32_at(row, 8)?,
        response: response_body.zip(responded_at).map(|(body, responded_at)| {
            OwnerResponse { body, responded_at }
        }),
    })
}

fn row_to_recent_review(row: &Row<'_>) -> rusqlite::Result<RecentReview> {
    Ok(RecentReview {
        review: row_to_review(row)?,
        business_name: row.get(11)?,
        business_slug: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::{NewUser, Role};
    use crate::storage::businesses::tests::sample_business;

    fn setup() -> (Storage, i64) {
        let storage = Storage::open_in_memory().unwrap();
        let business = storage
            .insert_business(&sample_business("Acme Plumbing", &["home-services"], "Springfield"))
            .unwrap();
        (storage, business.id)
    }

    fn new_review(business_id: i64, rating: u8, title: &str) -> NewReview {
        NewReview {
            business_id,
            user_id: None,
            author_name: "Sam Reviewer".to_string(),
            rating,
            title: title.to_string(),
            body: "They showed up on time and did good work.".to_string(),
        }
    }

    fn titles(page: &Page<Review>) -> Vec<&str> {
        page.items.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_insert_and_get() {
        let (storage, business_id) = setup();
        let review = storage
            .insert_review(&new_review(business_id, 4, "Solid"))
            .unwrap();
        assert_eq!(review.rating, 4);
        assert_eq!(review.helpful_count, 0);
        assert!(review.response.is_none());
        assert_eq!(storage.review_by_id(review.id).unwrap(), Some(review));
    }

    #[test]
    fn test_rating_out_of_range_is_rejected() {
        let (storage, business_id) = setup();
        for rating in [0, 6] {
            let err = storage
                .insert_review(&new_review(business_id, rating, "Bad"))
                .unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_unknown_business_is_rejected() {
        let (storage, _) = setup();
        let err = storage.insert_review(&new_review(999, 3, "Ghost")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_one_review_per_user() {
        let (storage, business_id) = setup();
        let user = storage
            .create_user(&NewUser {
                name: "Sam Reviewer".to_string(),
                email: "sam@example.com".to_string(),
                password: "password123".to_string(),
                role: Role::Consumer,
            })
            .unwrap();
        let mut review = new_review(business_id, 5, "First");
        review.user_id = Some(user.id);

        storage.insert_review(&review).unwrap();
        assert!(storage.has_reviewed(user.id, business_id).unwrap());
        let err = storage.insert_review(&review).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(storage.reviews_by_user(user.id, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_list_sort_and_filter() {
        let (storage, business_id) = setup();
        let now = Utc::now();
        storage
            .insert_review_at(&new_review(business_id, 2, "Old"), now - Duration::days(3))
            .unwrap();
        storage
            .insert_review_at(&new_review(business_id, 5, "Middle"), now - Duration::days(2))
            .unwrap();
        storage
            .insert_review_at(&new_review(business_id, 4, "New"), now - Duration::days(1))
            .unwrap();

        let mut query = ReviewQuery {
            per_page: 10,
            page: 1,
            ..ReviewQuery::default()
        };
        let newest = storage.reviews_for_business(business_id, &query).unwrap();
        assert_eq!(titles(&newest), vec!["New", "Middle", "Old"]);

        query.sort = ReviewSort::Highest;
        let highest = storage.reviews_for_business(business_id, &query).unwrap();
        assert_eq!(titles(&highest), vec!["Middle", "New", "Old"]);

        query.sort = ReviewSort::Lowest;
        let lowest = storage.reviews_for_business(business_id, &query).unwrap();
        assert_eq!(titles(&lowest), vec!["Old", "New", "Middle"]);

        query.stars = Some(5);
        let five = storage.reviews_for_business(business_id, &query).unwrap();
        assert_eq!(titles(&five), vec!["Middle"]);
        assert_eq!(five.pagination.total, 1);
    }

    #[test]
    fn test_paging() {
        let (storage, business_id) = setup();
        for i in 0..5 {
            storage
                .insert_review(&new_review(business_id, 3, &format!("R{i}")))
                .unwrap();
        }
        let query = ReviewQuery {
            per_page: 2,
            page: 3,
            ..ReviewQuery::default()
        };
        let page = storage.reviews_for_business(business_id, &query).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total_pages(), 3);
    }

    #[test]
    fn test_helpful_votes() {
        let (storage, business_id) = setup();
        let review = storage
            .insert_review(&new_review(business_id, 4, "Useful"))
            .unwrap();
        assert_eq!(storage.mark_helpful(review.id).unwrap(), 1);
        assert_eq!(storage.mark_helpful(review.id).unwrap(), 2);
        assert!(storage.mark_helpful(12345).unwrap_err().is_not_found());

        let query = ReviewQuery {
            per_page: 10,
            page: 1,
            sort: ReviewSort::Helpful,
            ..ReviewQuery::default()
        };
        storage
            .insert_review(&new_review(business_id, 4, "Ignored"))
            .unwrap();
        let page = storage.reviews_for_business(business_id, &query).unwrap();
        assert_eq!(page.items[0].title, "Useful");
    }

    #[test]
    fn test_owner_response() {
        let (storage, business_id) = setup();
        let owner = storage
            .create_user(&NewUser {
                name: "Olive Owner".to_string(),
                email: "olive@example.com".to_string(),
                password: "password123".to_string(),
                role: Role::BusinessOwner,
            })
            .unwrap();
        storage
            .conn
            .execute(
                "UPDATE businesses SET owner_id = ?1 WHERE id = ?2",
                params![owner.id, business_id],
            )
            .unwrap();
        let review = storage
            .insert_review(&new_review(business_id, 2, "Late"))
            .unwrap();

        let forbidden = storage
            .respond_to_review(review.id, owner.id + 100, "Sorry!")
            .unwrap_err();
        assert!(matches!(forbidden, Error::Forbidden { .. }));

        assert!(storage
            .respond_to_review(review.id, owner.id, "   ")
            .unwrap_err()
            .is_validation());
        assert!(storage
            .respond_to_review(review.id, owner.id, &"x".repeat(RESPONSE_MAX + 1))
            .unwrap_err()
            .is_validation());

        let answered = storage
            .respond_to_review(review.id, owner.id, "  Sorry, we have added staff.  ")
            .unwrap();
        let response = answered.response.unwrap();
        assert_eq!(response.body, "Sorry, we have added staff.");
    }

    #[test]
    fn test_recent_reviews_include_business() {
        let (storage, business_id) = setup();
        storage
            .insert_review(&new_review(business_id, 5, "Great"))
            .unwrap();
        let recent = storage.recent_reviews(5).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].business_slug, "acme-plumbing");
        assert_eq!(recent[0].business_name, "Acme Plumbing");
    }
}
