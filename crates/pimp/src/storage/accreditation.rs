//! Accreditation applications.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use tracing::info;

use super::{text_enum_at, timestamp_at, u32_at, Storage};
use crate::domain::{
    AccreditationApplication, AccreditationStatus, ApplicationStatus, NewApplication,
};
use crate::error::{Error, Result};

const APPLICATION_COLUMNS: &str = r"
    a.id, a.business_id, a.user_id, a.contact_name, a.email, a.phone,
    a.years_in_business, a.employees, a.complaint_process, a.status, a.submitted_at
";

/// An application with the listing it is for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationRow {
    /// The application.
    pub application: AccreditationApplication,
    /// Listing name.
    pub business_name: String,
    /// Listing slug.
    pub business_slug: String,
}

impl Storage {
    /// Submit an application for a listing the user owns, marking the
    /// listing's accreditation as pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown listing,
    /// [`Error::Forbidden`] if the user does not own it, and
    /// [`Error::Conflict`] if it is already accredited or under review.
    pub fn submit_application(&self, application: &NewApplication) -> Result<AccreditationApplication> {
        let business = self
            .business_by_id(application.business_id)?
            .ok_or_else(|| Error::not_found("business", application.business_id))?;
        if !business.is_owned_by(application.user_id) {
            return Err(Error::forbidden(
                "only the business owner can apply for accreditation",
            ));
        }
        match business.accreditation.status {
            AccreditationStatus::Accredited => {
                return Err(Error::conflict(format!("{} is already accredited", business.name)));
            }
            AccreditationStatus::Pending => {
                return Err(Error::conflict(format!(
                    "{} already has an application under review",
                    business.name
                )));
            }
            AccreditationStatus::NotAccredited | AccreditationStatus::Revoked => {}
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r"
            INSERT INTO accreditation_applications
                (business_id, user_id, contact_name, email, phone, years_in_business,
                 employees, complaint_process, status, submitted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending', ?9)
            ",
            params![
                application.business_id,
                application.user_id,
                application.contact_name,
                application.email,
                application.phone,
                application.years_in_business,
                application.employees,
                application.complaint_process,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE businesses SET accreditation_status = ?2 WHERE id = ?1",
            params![application.business_id, AccreditationStatus::Pending.as_str()],
        )?;
        tx.commit()?;

        info!("Accreditation application {} submitted for business {}", id, business.id);
        self.application_by_id(id)?
            .ok_or_else(|| Error::internal(format!("application {id} vanished after insert")))
    }

    /// Get an application by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn application_by_id(&self, id: i64) -> Result<Option<AccreditationApplication>> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM accreditation_applications a WHERE a.id = ?1");
        let application = self
            .conn
            .query_row(&sql, [id], row_to_application)
            .optional()?;
        Ok(application)
    }

    /// Applications with listing names, oldest first, optionally limited to
    /// one status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_applications(&self, status: Option<ApplicationStatus>) -> Result<Vec<ApplicationRow>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS}, b.name, b.slug
             FROM accreditation_applications a
             JOIN businesses b ON b.id = a.business_id
             WHERE ?1 IS NULL OR a.status = ?1
             ORDER BY a.submitted_at, a.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([status.map(ApplicationStatus::as_str)], |row| {
                Ok(ApplicationRow {
                    application: row_to_application(row)?,
                    business_name: row.get(11)?,
                    business_slug: row.get(12)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Approve a pending application. The listing becomes accredited as of
    /// `today`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown application and
    /// [`Error::Conflict`] if it is not pending.
    pub fn approve_application(&self, id: i64, today: NaiveDate) -> Result<AccreditationApplication> {
        let application = self.require_pending_application(id)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE accreditation_applications SET status = 'approved' WHERE id = ?1",
            [id],
        )?;
        tx.execute(
            "UPDATE businesses SET accreditation_status = ?2, accredited_since = ?3 WHERE id = ?1",
            params![
                application.business_id,
                AccreditationStatus::Accredited.as_str(),
                today.format("%Y-%m-%d").to_string(),
            ],
        )?;
        tx.commit()?;
        info!("Approved accreditation application {}", id);
        self.application_by_id(id)?
            .ok_or_else(|| Error::not_found("application", id))
    }

    /// Deny a pending application. The listing returns to not accredited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown application and
    /// [`Error::Conflict`] if it is not pending.
    pub fn deny_application(&self, id: i64) -> Result<AccreditationApplication> {
        let application = self.require_pending_application(id)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE accreditation_applications SET status = 'denied' WHERE id = ?1",
            [id],
        )?;
        tx.execute(
            "UPDATE businesses SET accreditation_status = ?2, accredited_since = NULL
             WHERE id = ?1 AND accreditation_status = ?3",
            params![
                application.business_id,
                AccreditationStatus::NotAccredited.as_str(),
                AccreditationStatus::Pending.as_str(),
            ],
        )?;
        tx.commit()?;
        info!("Denied accreditation application {}", id);
        self.application_by_id(id)?
            .ok_or_else(|| Error::not_found("application", id))
    }

    /// Mark a listing accredited directly. Used when seeding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown listing.
    pub fn set_accredited(&self, business_id: i64, since: NaiveDate) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE businesses SET accreditation_status = ?2, accredited_since = ?3 WHERE id = ?1",
            params![
                business_id,
                AccreditationStatus::Accredited.as_str(),
                since.format("%Y-%m-%d").to_string(),
            ],
        )?;
        if affected == 0 {
            return Err(Error::not_found("business", business_id));
        }
        Ok(())
    }

    fn require_pending_application(&self, id: i64) -> Result<AccreditationApplication> {
        let application = self
            .application_by_id(id)?
            .ok_or_else(|| Error::not_found("application", id))?;
        if application.status != ApplicationStatus::Pending {
            return Err(Error::conflict(format!(
                "application {id} is already {}",
                application.status
            )));
        }
        Ok(application)
    }
}

fn row_to_application(row: &Row<'_>) -> rusqlite::Result<AccreditationApplication> {
    Ok(AccreditationApplication {
        id: row.get(0)?,
        business_id: row.get(1)?,
        user_id: row.get(2)?,
        contact_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        years_in_business: u32_at(row, 6)?,
        employees: u32_at(row, 7)?,
        complaint_process: row.get(8)?,
        status: text_enum_at(row, 9)?,
        submitted_at: timestamp_at(row, 10)?,
    })
}
