//! Per-branch stock and price models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Branch, Medicine, PharmacySummary, ValidationError};

/// Stock counts at or below this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Availability label derived from a stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl Availability {
    /// Classify a stock count using the standard low-stock threshold.
    pub fn classify(stock_count: u32) -> Self {
        Self::classify_with_threshold(stock_count, LOW_STOCK_THRESHOLD)
    }

    /// Classify a stock count: 0 is out of stock, up to `low_stock_threshold`
    /// is low stock, anything above is in stock.
    pub fn classify_with_threshold(stock_count: u32, low_stock_threshold: u32) -> Self {
        if stock_count == 0 {
            Availability::OutOfStock
        } else if stock_count <= low_stock_threshold {
            Availability::LowStock
        } else {
            Availability::InStock
        }
    }

    /// The label as shown to shoppers.
    pub fn label(self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::LowStock => "Low Stock",
            Availability::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Availability {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In Stock" => Ok(Availability::InStock),
            "Low Stock" => Ok(Availability::LowStock),
            "Out of Stock" => Ok(Availability::OutOfStock),
            other => Err(ValidationError::Availability(other.to_string())),
        }
    }
}

/// Stock count and price of one medicine at one branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: i64,
    pub branch_id: i64,
    pub medicine_id: i64,
    pub stock_count: u32,
    /// Unit price, two decimal places
    pub price: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// An inventory record with the entities it points at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDetail {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub branch: Branch,
    pub pharmacy: PharmacySummary,
    pub medicine: Medicine,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewInventory {
    pub branch_id: i64,
    pub medicine_id: i64,
    pub stock_count: u32,
    pub price: f64,
}

/// Restock and/or reprice. The (branch, medicine) pair never changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub stock_count: Option<u32>,
    pub price: Option<f64>,
}

impl NewInventory {
    pub fn new(branch_id: i64, medicine_id: i64, stock_count: u32, price: f64) -> Self {
        Self {
            branch_id,
            medicine_id,
            stock_count,
            price,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_price(self.price)
    }
}

impl InventoryUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.price {
            Some(price) => validate_price(price),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stock_count.is_none() && self.price.is_none()
    }
}

impl InventoryRecord {
    pub fn availability(&self, low_stock_threshold: u32) -> Availability {
        Availability::classify_with_threshold(self.stock_count, low_stock_threshold)
    }
}

/// Round a price to whole cents.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Checked after rounding to cents, as stored.
fn validate_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() && round_price(price) > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::Price(price))
    }
}
