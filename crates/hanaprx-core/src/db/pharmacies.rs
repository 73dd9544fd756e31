//! Pharmacy database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{now, Database, DbError, DbResult};
use crate::models::{
    NewPharmacy, PageRequest, Paginated, Pharmacy, PharmacyUpdate, PharmacyWithBranchCount,
};

impl Database {
    /// Insert a new pharmacy.
    pub fn create_pharmacy(&self, input: &NewPharmacy) -> DbResult<Pharmacy> {
        input.validate()?;
        let timestamp = now();

        self.conn.execute(
            r#"
            INSERT INTO pharmacies (name, logo_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
            params![input.name, input.logo_url, timestamp],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(pharmacy_id = id, name = %input.name, "Pharmacy created");

        Ok(Pharmacy {
            id,
            name: input.name.clone(),
            logo_url: input.logo_url.clone(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    /// Get a pharmacy by ID.
    pub fn get_pharmacy(&self, id: i64) -> DbResult<Option<Pharmacy>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, logo_url, created_at, updated_at
                FROM pharmacies
                WHERE id = ?
                "#,
                [id],
                map_pharmacy,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List pharmacies by name, with their branch counts.
    pub fn list_pharmacies(&self, page: PageRequest) -> DbResult<Paginated<PharmacyWithBranchCount>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.id, p.name, p.logo_url, p.created_at, p.updated_at,
                   (SELECT COUNT(*) FROM branches b WHERE b.pharmacy_id = p.id) AS branch_count
            FROM pharmacies p
            ORDER BY p.name, p.id
            LIMIT ? OFFSET ?
            "#,
        )?;

        let rows = stmt.query_map(params![page.limit, page.offset() as i64], |row| {
            Ok(PharmacyWithBranchCount {
                pharmacy: map_pharmacy(row)?,
                branch_count: row.get(5)?,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pharmacies", [], |row| row.get(0))?;

        Ok(Paginated::for_request(items, page, total as u64))
    }

    /// Apply a partial update to a pharmacy.
    pub fn update_pharmacy(&self, id: i64, update: PharmacyUpdate) -> DbResult<Pharmacy> {
        update.validate()?;
        let mut pharmacy = self
            .get_pharmacy(id)?
            .ok_or_else(|| DbError::NotFound(format!("pharmacy {}", id)))?;

        update.apply(&mut pharmacy);
        pharmacy.updated_at = now();

        self.conn.execute(
            r#"
            UPDATE pharmacies SET
                name = ?2,
                logo_url = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
            params![pharmacy.id, pharmacy.name, pharmacy.logo_url, pharmacy.updated_at],
        )?;
        Ok(pharmacy)
    }

    /// Delete a pharmacy along with its branches and their inventory.
    pub fn delete_pharmacy(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM pharmacies WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

pub(crate) fn map_pharmacy(row: &Row<'_>) -> rusqlite::Result<Pharmacy> {
    Ok(Pharmacy {
        id: row.get(0)?,
        name: row.get(1)?,
        logo_url: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
