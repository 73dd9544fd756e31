//! Branch database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{now, Database, DbError, DbResult};
use crate::models::{
    Branch, BranchUpdate, BranchWithPharmacy, NewBranch, PageRequest, Paginated, PharmacySummary,
};

/// Column list matching [`map_branch_at`].
pub(crate) const BRANCH_COLUMNS: &str = "b.id, b.pharmacy_id, b.name, b.address, b.latitude, \
     b.longitude, b.contact_number, b.business_hours, b.created_at, b.updated_at";

/// Number of columns in [`BRANCH_COLUMNS`].
pub(crate) const BRANCH_COLUMN_COUNT: usize = 10;

impl Database {
    /// Insert a new branch under an existing pharmacy.
    pub fn create_branch(&self, input: &NewBranch) -> DbResult<Branch> {
        input.validate()?;
        self.ensure_pharmacy_exists(input.pharmacy_id)?;
        let timestamp = now();

        self.conn.execute(
            r#"
            INSERT INTO branches (
                pharmacy_id, name, address, latitude, longitude,
                contact_number, business_hours, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            params![
                input.pharmacy_id,
                input.name,
                input.address,
                input.latitude,
                input.longitude,
                input.contact_number,
                input.business_hours,
                timestamp,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(branch_id = id, pharmacy_id = input.pharmacy_id, "Branch created");

        Ok(Branch {
            id,
            pharmacy_id: input.pharmacy_id,
            name: input.name.clone(),
            address: input.address.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
            contact_number: input.contact_number.clone(),
            business_hours: input.business_hours.clone(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    /// Get a branch by ID.
    pub fn get_branch(&self, id: i64) -> DbResult<Option<Branch>> {
        let sql = format!("SELECT {} FROM branches b WHERE b.id = ?", BRANCH_COLUMNS);
        self.conn
            .query_row(&sql, [id], |row| map_branch_at(row, 0))
            .optional()
            .map_err(Into::into)
    }

    /// Get a branch together with its pharmacy.
    pub fn get_branch_with_pharmacy(&self, id: i64) -> DbResult<Option<BranchWithPharmacy>> {
        let sql = format!(
            r#"
            SELECT {}, p.id, p.name, p.logo_url
            FROM branches b
            JOIN pharmacies p ON p.id = b.pharmacy_id
            WHERE b.id = ?
            "#,
            BRANCH_COLUMNS
        );
        self.conn
            .query_row(&sql, [id], map_branch_with_pharmacy)
            .optional()
            .map_err(Into::into)
    }

    /// List branches by name, optionally restricted to one pharmacy.
    pub fn list_branches(
        &self,
        page: PageRequest,
        pharmacy_id: Option<i64>,
    ) -> DbResult<Paginated<BranchWithPharmacy>> {
        let sql = format!(
            r#"
            SELECT {}, p.id, p.name, p.logo_url
            FROM branches b
            JOIN pharmacies p ON p.id = b.pharmacy_id
            WHERE (?1 IS NULL OR b.pharmacy_id = ?1)
            ORDER BY b.name, b.id
            LIMIT ?2 OFFSET ?3
            "#,
            BRANCH_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![pharmacy_id, page.limit, page.offset() as i64],
            map_branch_with_pharmacy,
        )?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM branches WHERE (?1 IS NULL OR pharmacy_id = ?1)",
            params![pharmacy_id],
            |row| row.get(0),
        )?;

        Ok(Paginated::for_request(items, page, total as u64))
    }

    /// Apply a partial update to a branch.
    pub fn update_branch(&self, id: i64, update: BranchUpdate) -> DbResult<Branch> {
        update.validate()?;
        if let Some(pharmacy_id) = update.pharmacy_id {
            self.ensure_pharmacy_exists(pharmacy_id)?;
        }
        let mut branch = self
            .get_branch(id)?
            .ok_or_else(|| DbError::NotFound(format!("branch {}", id)))?;

        update.apply(&mut branch);
        branch.updated_at = now();

        self.conn.execute(
            r#"
            UPDATE branches SET
                pharmacy_id = ?2,
                name = ?3,
                address = ?4,
                latitude = ?5,
                longitude = ?6,
                contact_number = ?7,
                business_hours = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
            params![
                branch.id,
                branch.pharmacy_id,
                branch.name,
                branch.address,
                branch.latitude,
                branch.longitude,
                branch.contact_number,
                branch.business_hours,
                branch.updated_at,
            ],
        )?;
        Ok(branch)
    }

    /// Delete a branch and its inventory.
    pub fn delete_branch(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM branches WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    fn ensure_pharmacy_exists(&self, pharmacy_id: i64) -> DbResult<()> {
        match self.get_pharmacy(pharmacy_id)? {
            Some(_) => Ok(()),
            None => Err(DbError::NotFound(format!("pharmacy {}", pharmacy_id))),
        }
    }
}

/// Map [`BRANCH_COLUMNS`] starting at column `start`.
pub(crate) fn map_branch_at(row: &Row<'_>, start: usize) -> rusqlite::Result<Branch> {
    Ok(Branch {
        id: row.get(start)?,
        pharmacy_id: row.get(start + 1)?,
        name: row.get(start + 2)?,
        address: row.get(start + 3)?,
        latitude: row.get(start + 4)?,
        longitude: row.get(start + 5)?,
        contact_number: row.get(start + 6)?,
        business_hours: row.get(start + 7)?,
        created_at: row.get(start + 8)?,
        updated_at: row.get(start + 9)?,
    })
}

/// Map `p.id, p.name, p.logo_url` starting at column `start`.
pub(crate) fn map_pharmacy_summary_at(
    row: &Row<'_>,
    start: usize,
) -> rusqlite::Result<PharmacySummary> {
    Ok(PharmacySummary {
        id: row.get(start)?,
        name: row.get(start + 1)?,
        logo_url: row.get(start + 2)?,
    })
}

fn map_branch_with_pharmacy(row: &Row<'_>) -> rusqlite::Result<BranchWithPharmacy> {
    Ok(BranchWithPharmacy {
        branch: map_branch_at(row, 0)?,
        pharmacy: map_pharmacy_summary_at(row, BRANCH_COLUMN_COUNT)?,
    })
}
