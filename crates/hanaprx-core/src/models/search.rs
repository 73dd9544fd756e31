//! Search result and pagination models.

use serde::{Deserialize, Serialize};

use super::{Availability, Branch, Medicine, PharmacySummary};

/// Medicine fields exposed in a search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSnapshot {
    pub id: i64,
    pub name: String,
    pub generic_name: String,
    pub description: Option<String>,
}

/// Branch fields exposed in a search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchSnapshot {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_number: Option<String>,
    pub business_hours: Option<String>,
}

/// One medicine offered at one branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub medicine: MedicineSnapshot,
    pub branch: BranchSnapshot,
    pub pharmacy: PharmacySummary,
    pub price: f64,
    pub stock_count: u32,
    pub availability: Availability,
    /// Kilometers from the caller, two decimal places; null without caller coordinates
    pub distance: Option<f64>,
}

/// Autocomplete suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: i64,
    pub name: String,
    pub generic_name: String,
}

/// A medicine together with every branch that lists it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineListing {
    pub medicine: Medicine,
    pub stock: Vec<BranchStock>,
}

/// A single inventory row as seen from a medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchStock {
    pub inventory_id: i64,
    pub branch: Branch,
    pub pharmacy: PharmacySummary,
    pub stock_count: u32,
    pub price: f64,
}

/// Default page size for paginated reads.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page number and page size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Build a request, clamping `page` to at least 1 and `limit` to `[1, max_limit]`.
    pub fn clamped(page: i64, limit: i64, max_limit: u32) -> Self {
        let max_limit = i64::from(max_limit.max(1));
        Self {
            page: page.clamp(1, i64::from(u32::MAX)) as u32,
            limit: limit.clamp(1, max_limit) as u32,
        }
    }

    /// Number of items to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination envelope metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// A page of items plus its pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        Self {
            data,
            pagination: Pagination::new(page, limit, total),
        }
    }

    pub fn for_request(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self::new(data, request.page, request.limit, total)
    }
}

impl<T: Serialize> Paginated<T> {
    /// Serialize to the `{ data, pagination }` JSON envelope.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&Medicine> for MedicineSnapshot {
    fn from(medicine: &Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name.clone(),
            generic_name: medicine.generic_name.clone(),
            description: medicine.description.clone(),
        }
    }
}

impl From<&Medicine> for Suggestion {
    fn from(medicine: &Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name.clone(),
            generic_name: medicine.generic_name.clone(),
        }
    }
}

impl From<&Branch> for BranchSnapshot {
    fn from(branch: &Branch) -> Self {
        Self {
            id: branch.id,
            name: branch.name.clone(),
            address: branch.address.clone(),
            latitude: branch.latitude,
            longitude: branch.longitude,
            contact_number: branch.contact_number.clone(),
            business_hours: branch.business_hours.clone(),
        }
    }
}
