//! Ownership claims on listings.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use tracing::info;

use super::{text_enum_at, timestamp_at, Storage};
use crate::domain::{Claim, ClaimStatus, NewClaim, Role};
use crate::error::{Error, Result};

const CLAIM_COLUMNS: &str = r"
    c.id, c.business_id, c.user_id, c.position, c.phone, c.method, c.note, c.status, c.created_at
";

/// A claim with the names an administrator needs to decide on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRow {
    /// The claim.
    pub claim: Claim,
    /// Listing name.
    pub business_name: String,
    /// Listing slug.
    pub business_slug: String,
    /// Claimant's name.
    pub user_name: String,
    /// Claimant's email.
    pub user_email: String,
}

impl Storage {
    /// File a claim on an unclaimed listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown listing, and
    /// [`Error::Conflict`] if the listing already has an owner or the user
    /// already has a pending claim on it.
    pub fn create_claim(&self, claim: &NewClaim) -> Result<Claim> {
        let business = self
            .business_by_id(claim.business_id)?
            .ok_or_else(|| Error::not_found("business", claim.business_id))?;
        if business.is_claimed() {
            return Err(Error::conflict(format!(
                "{} has already been claimed",
                business.name
            )));
        }
        if self
            .pending_claim(claim.user_id, claim.business_id)?
            .is_some()
        {
            return Err(Error::conflict(
                "You already have a pending claim for this business",
            ));
        }

        self.conn.execute(
            r"
            INSERT INTO claims (business_id, user_id, position, phone, method, note, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7)
            ",
            params![
                claim.business_id,
                claim.user_id,
                claim.position,
                claim.phone,
                claim.method.as_str(),
                claim.note,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("User {} claimed business {} (claim {})", claim.user_id, claim.business_id, id);

        self.claim_by_id(id)?
            .ok_or_else(|| Error::internal(format!("claim {id} vanished after insert")))
    }

    /// Get a claim by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn claim_by_id(&self, id: i64) -> Result<Option<Claim>> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims c WHERE c.id = ?1");
        let claim = self.conn.query_row(&sql, [id], row_to_claim).optional()?;
        Ok(claim)
    }

    /// A user's pending claim on a listing, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn pending_claim(&self, user_id: i64, business_id: i64) -> Result<Option<Claim>> {
        let sql = format!(
            "SELECT {CLAIM_COLUMNS} FROM claims c
             WHERE c.user_id = ?1 AND c.business_id = ?2 AND c.status = 'pending'"
        );
        let claim = self
            .conn
            .query_row(&sql, params![user_id, business_id], row_to_claim)
            .optional()?;
        Ok(claim)
    }

    /// Claims with listing and claimant details, oldest first, optionally
    /// limited to one status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_claims(&self, status: Option<ClaimStatus>) -> Result<Vec<ClaimRow>> {
        self.claim_rows(
            "WHERE ?1 IS NULL OR c.status = ?1 ORDER BY c.created_at, c.id",
            [status.map(ClaimStatus::as_str)],
        )
    }

    /// Claims filed by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn claims_by_user(&self, user_id: i64) -> Result<Vec<ClaimRow>> {
        self.claim_rows(
            "WHERE c.user_id = ?1 ORDER BY c.created_at DESC, c.id DESC",
            [user_id],
        )
    }

    fn claim_rows(&self, filter: &str, params: impl rusqlite::Params) -> Result<Vec<ClaimRow>> {
        let sql = format!(
            "SELECT {CLAIM_COLUMNS}, b.name, b.slug, u.name, u.email
             FROM claims c
             JOIN businesses b ON b.id = c.business_id
             JOIN users u ON u.id = c.user_id
             {filter}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(ClaimRow {
                    claim: row_to_claim(row)?,
                    business_name: row.get(9)?,
                    business_slug: row.get(10)?,
                    user_name: row.get(11)?,
                    user_email: row.get(12)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Approve a pending claim: the claimant becomes the listing's owner and
    /// a business owner, and competing pending claims are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown claim and
    /// [`Error::Conflict`] if it is not pending or the listing is taken.
    pub fn approve_claim(&self, id: i64) -> Result<Claim> {
        let claim = self.require_pending_claim(id)?;
        let owner: Option<i64> = self.conn.query_row(
            "SELECT owner_id FROM businesses WHERE id = ?1",
            [claim.business_id],
            |row| row.get(0),
        )?;
        if owner.is_some() {
            return Err(Error::conflict("the business already has an owner"));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("UPDATE claims SET status = 'approved' WHERE id = ?1", [id])?;
        tx.execute(
            "UPDATE claims SET status = 'rejected'
             WHERE business_id = ?1 AND status = 'pending' AND id != ?2",
            params![claim.business_id, id],
        )?;
        tx.execute(
            "UPDATE businesses SET owner_id = ?2 WHERE id = ?1",
            params![claim.business_id, claim.user_id],
        )?;
        tx.execute(
            "UPDATE users SET role = ?2 WHERE id = ?1 AND role = ?3",
            params![
                claim.user_id,
                Role::BusinessOwner.as_str(),
                Role::Consumer.as_str()
            ],
        )?;
        tx.commit()?;

        info!("Approved claim {} on business {}", id, claim.business_id);
        self.claim_by_id(id)?
            .ok_or_else(|| Error::not_found("claim", id))
    }

    /// Reject a pending claim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown claim and
    /// [`Error::Conflict`] if it is not pending.
    pub fn reject_claim(&self, id: i64) -> Result<Claim> {
        self.require_pending_claim(id)?;
        self.conn
            .execute("UPDATE claims SET status = 'rejected' WHERE id = ?1", [id])?;
        info!("Rejected claim {}", id);
        self.claim_by_id(id)?
            .ok_or_else(|| Error::not_found("claim", id))
    }

    fn require_pending_claim(&self, id: i64) -> Result<Claim> {
        let claim = self
            .claim_by_id(id)?
            .ok_or_else(|| Error::not_found("claim", id))?;
        if claim.status != ClaimStatus::Pending {
            return Err(Error::conflict(format!(
                "claim {id} is already {}",
                claim.status
            )));
        }
        Ok(claim)
    }
}

fn row_to_claim(row: &Row<'_>) -> rusqlite::Result<Claim> {
    Ok(Claim {
        id: row.get(0)?,
        business_id: row.get(1)?,
        user_id: row.get(2)?,
        position: row.get(3)?,
        phone: row.get(4)?,
        method: text_enum_at(row, 5)?,
        note: row.get(6)?,
        status: text_enum_at(row, 7)?,
        created_at: timestamp_at(row, 8)?,
    })
}
