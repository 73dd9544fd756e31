//! Inventory database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::branches::{map_branch_at, map_pharmacy_summary_at, BRANCH_COLUMNS, BRANCH_COLUMN_COUNT};
use super::medicines::map_medicine_at;
use super::{map_unique_violation, now, stock_count, Database, DbError, DbResult};
use crate::models::{
    round_price, InventoryDetail, InventoryRecord, InventoryUpdate, NewInventory, PageRequest,
    Paginated,
};

const INVENTORY_COLUMNS: &str =
    "i.id, i.branch_id, i.medicine_id, i.stock_count, i.price, i.created_at, i.updated_at";

const INVENTORY_COLUMN_COUNT: usize = 7;

impl Database {
    /// Add a medicine to a branch's inventory.
    ///
    /// Each (branch, medicine) pair may only be listed once. The reference
    /// checks and the insert run in one transaction.
    pub fn create_inventory(&self, input: &NewInventory) -> DbResult<InventoryRecord> {
        input.validate()?;
        let tx = self.transaction()?;
        if self.get_branch(input.branch_id)?.is_none() {
            return Err(DbError::NotFound(format!("branch {}", input.branch_id)));
        }
        if self.get_medicine(input.medicine_id)?.is_none() {
            return Err(DbError::NotFound(format!("medicine {}", input.medicine_id)));
        }
        if self
            .find_inventory_for(input.branch_id, input.medicine_id)?
            .is_some()
        {
            tracing::warn!(
                branch_id = input.branch_id,
                medicine_id = input.medicine_id,
                "Rejected duplicate inventory record"
            );
            return Err(DbError::Conflict(duplicate_message()));
        }

        let price = round_price(input.price);
        let timestamp = now();

        tx.execute(
            r#"
            INSERT INTO inventory (
                branch_id, medicine_id, stock_count, price, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![input.branch_id, input.medicine_id, input.stock_count, price, timestamp],
        )
        .map_err(|e| map_unique_violation(e, &duplicate_message()))?;

        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::debug!(
            inventory_id = id,
            branch_id = input.branch_id,
            medicine_id = input.medicine_id,
            "Inventory record created"
        );

        Ok(InventoryRecord {
            id,
            branch_id: input.branch_id,
            medicine_id: input.medicine_id,
            stock_count: input.stock_count,
            price,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    /// Get an inventory record by ID.
    pub fn get_inventory(&self, id: i64) -> DbResult<Option<InventoryRecord>> {
        let sql = format!("SELECT {} FROM inventory i WHERE i.id = ?", INVENTORY_COLUMNS);
        self.conn
            .query_row(&sql, [id], |row| map_inventory_at(row, 0))
            .optional()
            .map_err(Into::into)
    }

    /// Get the record for a (branch, medicine) pair, if the branch lists it.
    pub fn find_inventory_for(
        &self,
        branch_id: i64,
        medicine_id: i64,
    ) -> DbResult<Option<InventoryRecord>> {
        let sql = format!(
            "SELECT {} FROM inventory i WHERE i.branch_id = ?1 AND i.medicine_id = ?2",
            INVENTORY_COLUMNS
        );
        self.conn
            .query_row(&sql, params![branch_id, medicine_id], |row| {
                map_inventory_at(row, 0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Get an inventory record with its branch, pharmacy and medicine.
    pub fn get_inventory_detail(&self, id: i64) -> DbResult<Option<InventoryDetail>> {
        let sql = format!("{} WHERE i.id = ?1", detail_select());
        self.conn
            .query_row(&sql, [id], map_detail)
            .optional()
            .map_err(Into::into)
    }

    /// List inventory, most recently updated first, optionally filtered by
    /// branch and/or medicine.
    pub fn list_inventory(
        &self,
        page: PageRequest,
        branch_id: Option<i64>,
        medicine_id: Option<i64>,
    ) -> DbResult<Paginated<InventoryDetail>> {
        let sql = format!(
            r#"
            {}
            WHERE (?1 IS NULL OR i.branch_id = ?1)
              AND (?2 IS NULL OR i.medicine_id = ?2)
            ORDER BY i.updated_at DESC, i.id DESC
            LIMIT ?3 OFFSET ?4
            "#,
            detail_select()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![branch_id, medicine_id, page.limit, page.offset() as i64],
            map_detail,
        )?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        let total: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM inventory
            WHERE (?1 IS NULL OR branch_id = ?1)
              AND (?2 IS NULL OR medicine_id = ?2)
            "#,
            params![branch_id, medicine_id],
            |row| row.get(0),
        )?;

        Ok(Paginated::for_request(items, page, total as u64))
    }

    /// Everything a branch carries, alphabetically by medicine.
    pub fn list_branch_inventory(&self, branch_id: i64) -> DbResult<Vec<InventoryDetail>> {
        let sql = format!(
            "{} WHERE i.branch_id = ?1 ORDER BY m.name COLLATE NOCASE, m.id",
            detail_select()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([branch_id], map_detail)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Restock and/or reprice an inventory record.
    ///
    /// An empty update returns the record untouched.
    pub fn update_inventory(&self, id: i64, update: InventoryUpdate) -> DbResult<InventoryRecord> {
        update.validate()?;
        let mut record = self
            .get_inventory(id)?
            .ok_or_else(|| DbError::NotFound(format!("inventory record {}", id)))?;

        if update.is_empty() {
            return Ok(record);
        }

        if let Some(stock_count) = update.stock_count {
            record.stock_count = stock_count;
        }
        if let Some(price) = update.price {
            record.price = round_price(price);
        }
        record.updated_at = now();

        self.conn.execute(
            r#"
            UPDATE inventory SET
                stock_count = ?2,
                price = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
            params![record.id, record.stock_count, record.price, record.updated_at],
        )?;

        tracing::debug!(
            inventory_id = id,
            stock_count = record.stock_count,
            price = record.price,
            "Inventory record updated"
        );
        Ok(record)
    }

    /// Remove a medicine from a branch.
    pub fn delete_inventory(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM inventory WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

fn duplicate_message() -> String {
    "Inventory record already exists for this branch and medicine".to_string()
}

fn detail_select() -> String {
    format!(
        r#"
        SELECT {}, {}, p.id, p.name, p.logo_url,
               m.id, m.name, m.generic_name, m.description, m.created_at, m.updated_at
        FROM inventory i
        JOIN branches b ON b.id = i.branch_id
        JOIN pharmacies p ON p.id = b.pharmacy_id
        JOIN medicines m ON m.id = i.medicine_id
        "#,
        INVENTORY_COLUMNS, BRANCH_COLUMNS
    )
}

fn map_inventory_at(row: &Row<'_>, start: usize) -> rusqlite::Result<InventoryRecord> {
    Ok(InventoryRecord {
        id: row.get(start)?,
        branch_id: row.get(start + 1)?,
        medicine_id: row.get(start + 2)?,
        stock_count: stock_count(row.get(start + 3)?),
        price: row.get(start + 4)?,
        created_at: row.get(start + 5)?,
        updated_at: row.get(start + 6)?,
    })
}

fn map_detail(row: &Row<'_>) -> rusqlite::Result<InventoryDetail> {
    let branch_start = INVENTORY_COLUMN_COUNT;
    let pharmacy_start = branch_start + BRANCH_COLUMN_COUNT;
    let medicine_start = pharmacy_start + 3;

    Ok(InventoryDetail {
        record: map_inventory_at(row, 0)?,
        branch: map_branch_at(row, branch_start)?,
        pharmacy: map_pharmacy_summary_at(row, pharmacy_start)?,
        medicine: map_medicine_at(row, medicine_start)?,
    })
}
