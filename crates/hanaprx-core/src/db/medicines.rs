//! Medicine catalog database operations.

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension, Row};

use super::branches::{map_branch_at, map_pharmacy_summary_at, BRANCH_COLUMN_COUNT};
use super::{now, stock_count, Database, DbError, DbResult};
use crate::models::{
    BranchStock, Medicine, MedicineListing, MedicineUpdate, NewMedicine, PageRequest, Paginated,
};

/// Case-insensitive substring predicate on brand or generic name. `?1` is the query text.
///
/// Uses the `fold_case` SQL function so non-ASCII letters fold too.
const MATCHES_QUERY: &str = "(?1 = '' \
     OR instr(fold_case(m.name), fold_case(?1)) > 0 \
     OR instr(fold_case(m.generic_name), fold_case(?1)) > 0)";

impl Database {
    /// Insert a new medicine.
    pub fn create_medicine(&self, input: &NewMedicine) -> DbResult<Medicine> {
        input.validate()?;
        let timestamp = now();

        self.conn.execute(
            r#"
            INSERT INTO medicines (name, generic_name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![input.name, input.generic_name, input.description, timestamp],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(medicine_id = id, name = %input.name, "Medicine created");

        Ok(Medicine {
            id,
            name: input.name.clone(),
            generic_name: input.generic_name.clone(),
            description: input.description.clone(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    /// Get a medicine by ID.
    pub fn get_medicine(&self, id: i64) -> DbResult<Option<Medicine>> {
        self.conn
            .query_row(
                r#"
                SELECT m.id, m.name, m.generic_name, m.description, m.created_at, m.updated_at
                FROM medicines m
                WHERE m.id = ?
                "#,
                [id],
                map_medicine,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a medicine with every branch that stocks it.
    pub fn get_medicine_listing(&self, id: i64) -> DbResult<Option<MedicineListing>> {
        let Some(medicine) = self.get_medicine(id)? else {
            return Ok(None);
        };

        let sql = format!("{} WHERE i.medicine_id = ?1 ORDER BY i.id", STOCK_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([id], map_stock_row)?;

        let mut stock = Vec::new();
        for row in rows {
            let (_, entry) = row?;
            stock.push(entry);
        }

        Ok(Some(MedicineListing { medicine, stock }))
    }

    /// List the whole catalog alphabetically.
    pub fn list_medicines(&self, page: PageRequest) -> DbResult<Paginated<Medicine>> {
        let items = self.query_medicines("", Some(page))?;
        let total = self.count_matching_medicines("")?;
        Ok(Paginated::for_request(items, page, total))
    }

    /// Apply a partial update to a medicine.
    pub fn update_medicine(&self, id: i64, update: MedicineUpdate) -> DbResult<Medicine> {
        update.validate()?;
        let mut medicine = self
            .get_medicine(id)?
            .ok_or_else(|| DbError::NotFound(format!("medicine {}", id)))?;

        update.apply(&mut medicine);
        medicine.updated_at = now();

        self.conn.execute(
            r#"
            UPDATE medicines SET
                name = ?2,
                generic_name = ?3,
                description = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                medicine.id,
                medicine.name,
                medicine.generic_name,
                medicine.description,
                medicine.updated_at,
            ],
        )?;
        Ok(medicine)
    }

    /// Delete a medicine and every inventory row for it.
    pub fn delete_medicine(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM medicines WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Medicines matching `query`, alphabetically, each with its inventory
    /// rows in insertion order. `window` bounds the medicines, not the rows.
    pub fn find_medicine_listings(
        &self,
        query: &str,
        window: Option<PageRequest>,
    ) -> DbResult<Vec<MedicineListing>> {
        let medicines = self.query_medicines(query, window)?;
        if medicines.is_empty() {
            return Ok(Vec::new());
        }

        let (limit, offset) = window_bounds(window);
        let sql = format!(
            r#"
            {}
            WHERE i.medicine_id IN (
                SELECT m.id FROM medicines m
                WHERE {}
                ORDER BY m.name COLLATE NOCASE, m.id
                LIMIT ?2 OFFSET ?3
            )
            ORDER BY i.id
            "#,
            STOCK_SELECT, MATCHES_QUERY
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![query, limit, offset], map_stock_row)?;

        let mut by_medicine: HashMap<i64, Vec<BranchStock>> = HashMap::new();
        for row in rows {
            let (medicine_id, entry) = row?;
            by_medicine.entry(medicine_id).or_default().push(entry);
        }

        Ok(medicines
            .into_iter()
            .map(|medicine| {
                let stock = by_medicine.remove(&medicine.id).unwrap_or_default();
                MedicineListing { medicine, stock }
            })
            .collect())
    }

    /// Count medicines matching `query`, ignoring pagination.
    pub fn count_matching_medicines(&self, query: &str) -> DbResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM medicines m WHERE {}", MATCHES_QUERY);
        let count: i64 = self.conn.query_row(&sql, [query], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// First `limit` medicines matching `query`, alphabetically.
    pub fn query_medicines_limited(&self, query: &str, limit: u32) -> DbResult<Vec<Medicine>> {
        self.query_medicines(query, Some(PageRequest { page: 1, limit }))
    }

    fn query_medicines(&self, query: &str, window: Option<PageRequest>) -> DbResult<Vec<Medicine>> {
        let (limit, offset) = window_bounds(window);
        let sql = format!(
            r#"
            SELECT m.id, m.name, m.generic_name, m.description, m.created_at, m.updated_at
            FROM medicines m
            WHERE {}
            ORDER BY m.name COLLATE NOCASE, m.id
            LIMIT ?2 OFFSET ?3
            "#,
            MATCHES_QUERY
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![query, limit, offset], map_medicine)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }
}

/// Inventory row joined with its branch and pharmacy.
///
/// Branch columns must stay in [`map_branch_at`] order.
const STOCK_SELECT: &str = "SELECT i.id, i.medicine_id, i.stock_count, i.price, \
     b.id, b.pharmacy_id, b.name, b.address, b.latitude, \
     b.longitude, b.contact_number, b.business_hours, b.created_at, b.updated_at, \
     p.id, p.name, p.logo_url \
     FROM inventory i \
     JOIN branches b ON b.id = i.branch_id \
     JOIN pharmacies p ON p.id = b.pharmacy_id";

/// SQLite treats a negative LIMIT as unbounded.
fn window_bounds(window: Option<PageRequest>) -> (i64, i64) {
    match window {
        Some(page) => (i64::from(page.limit), page.offset() as i64),
        None => (-1, 0),
    }
}

pub(crate) fn map_medicine(row: &Row<'_>) -> rusqlite::Result<Medicine> {
    map_medicine_at(row, 0)
}

pub(crate) fn map_medicine_at(row: &Row<'_>, start: usize) -> rusqlite::Result<Medicine> {
    Ok(Medicine {
        id: row.get(start)?,
        name: row.get(start + 1)?,
        generic_name: row.get(start + 2)?,
        description: row.get(start + 3)?,
        created_at: row.get(start + 4)?,
        updated_at: row.get(start + 5)?,
    })
}

fn map_stock_row(row: &Row<'_>) -> rusqlite::Result<(i64, BranchStock)> {
    let medicine_id: i64 = row.get(1)?;
    Ok((
        medicine_id,
        BranchStock {
            inventory_id: row.get(0)?,
            stock_count: stock_count(row.get(2)?),
            price: row.get(3)?,
            branch: map_branch_at(row, 4)?,
            pharmacy: map_pharmacy_summary_at(row, 4 + BRANCH_COLUMN_COUNT)?,
        },
    ))
}
