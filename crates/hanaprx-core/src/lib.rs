//! HanapRx Core Library
//!
//! Medicine price and availability lookup across pharmacy branches.
//!
//! # Architecture
//!
//! ```text
//! request params ──► SearchQuery ──► SearchEngine
//!                                        │
//!                         ┌──────────────┴──────────────┐
//!                         ▼                             ▼
//!                 medicines matching q          inventory rows per
//!                 (name / generic name)         medicine + branch + pharmacy
//!                         └──────────────┬──────────────┘
//!                                        ▼
//!                     flatten → distance → availability tier
//!                                        ▼
//!                          filter → sort → pagination envelope
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite persistence for pharmacies, branches, medicines and inventory
//! - [`models`]: Domain types and input validation
//! - [`search`]: Search engine, ranking and autocomplete
//! - [`geo`]: Great-circle distance
//! - [`config`]: TOML settings
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod db;
pub mod geo;
pub mod logging;
pub mod models;
pub mod search;

// Re-export commonly used types
pub use config::{Config, PaginationScope, SearchConfig, Settings};
pub use db::{Database, DbError};
pub use geo::{haversine_distance, Coordinate};
pub use models::{
    Availability, Branch, InventoryRecord, Medicine, Paginated, Pharmacy, SearchResult, Suggestion,
};
pub use search::{MedicineSource, QueryError, SearchEngine, SearchError, SearchQuery, SortBy};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use models::{InventoryUpdate, NewBranch, NewInventory, NewMedicine, NewPharmacy};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HanapRxError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<DbError> for HanapRxError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => HanapRxError::NotFound(msg),
            DbError::Conflict(msg) => HanapRxError::Conflict(msg),
            DbError::Validation(err) => HanapRxError::InvalidInput(err.to_string()),
            other => HanapRxError::DatabaseError(other.to_string()),
        }
    }
}

impl From<SearchError> for HanapRxError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Database(err) => err.into(),
        }
    }
}

impl From<QueryError> for HanapRxError {
    fn from(e: QueryError) -> Self {
        HanapRxError::InvalidInput(e.to_string())
    }
}

impl From<config::ConfigError> for HanapRxError {
    fn from(e: config::ConfigError) -> Self {
        HanapRxError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for HanapRxError {
    fn from(e: serde_json::Error) -> Self {
        HanapRxError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for HanapRxError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        HanapRxError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<HanapRxCore>, HanapRxError> {
    let db = Database::open(&path)?;
    Ok(HanapRxCore::wrap(db, SearchConfig::default()))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<HanapRxCore>, HanapRxError> {
    let db = Database::open_in_memory()?;
    Ok(HanapRxCore::wrap(db, SearchConfig::default()))
}

/// Open the database named by a config file (or the default locations).
///
/// Also installs the configured log subscriber unless one is already set.
#[uniffi::export]
pub fn open_with_config(config_path: Option<String>) -> Result<Arc<HanapRxCore>, HanapRxError> {
    let config = Config::load(config_path.as_deref().map(std::path::Path::new))?;
    if let Err(e) = logging::init_with_config(&config.settings.logging) {
        tracing::debug!(error = %e, "Keeping existing log subscriber");
    }
    tracing::info!(
        config = ?config.path,
        database = %config.settings.database.path.display(),
        "Opening database"
    );
    let db = Database::open(&config.settings.database.path)?;
    Ok(HanapRxCore::wrap(db, config.settings.search))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct HanapRxCore {
    db: Arc<Mutex<Database>>,
    search_config: SearchConfig,
}

impl HanapRxCore {
    fn wrap(db: Database, search_config: SearchConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            search_config,
        })
    }

    fn run_search(&self, query: &SearchQuery) -> Result<Paginated<SearchResult>, HanapRxError> {
        let db = self.db.lock()?;
        let engine = SearchEngine::with_config(&*db, self.search_config.clone());
        Ok(engine.search(query)?)
    }
}

#[uniffi::export]
impl HanapRxCore {
    // =========================================================================
    // Search
    // =========================================================================

    /// Search medicines across branches.
    pub fn search(&self, request: FfiSearchRequest) -> Result<FfiSearchPage, HanapRxError> {
        let query = SearchQuery::from_params(&request.into_params(), &self.search_config)?;
        Ok(self.run_search(&query)?.into())
    }

    /// Search with raw request parameters; returns the JSON envelope.
    pub fn search_json(&self, params: HashMap<String, String>) -> Result<String, HanapRxError> {
        let query = SearchQuery::from_params(&params, &self.search_config)?;
        Ok(self.run_search(&query)?.to_json()?)
    }

    /// Medicine name suggestions for a partial query.
    pub fn autocomplete(&self, query: String) -> Result<Vec<FfiSuggestion>, HanapRxError> {
        let db = self.db.lock()?;
        let engine = SearchEngine::with_config(&*db, self.search_config.clone());
        let suggestions = engine.autocomplete(&query)?;
        Ok(suggestions.into_iter().map(|s| s.into()).collect())
    }

    // =========================================================================
    // Catalog Maintenance
    // =========================================================================

    pub fn create_pharmacy(
        &self,
        name: String,
        logo_url: Option<String>,
    ) -> Result<FfiPharmacy, HanapRxError> {
        let db = self.db.lock()?;
        let pharmacy = db.create_pharmacy(&NewPharmacy { name, logo_url })?;
        Ok(pharmacy.into())
    }

    pub fn create_branch(&self, branch: FfiNewBranch) -> Result<FfiBranch, HanapRxError> {
        let db = self.db.lock()?;
        let created = db.create_branch(&branch.into())?;
        Ok(created.into())
    }

    pub fn create_medicine(
        &self,
        name: String,
        generic_name: String,
        description: Option<String>,
    ) -> Result<FfiMedicine, HanapRxError> {
        let db = self.db.lock()?;
        let mut input = NewMedicine::new(name, generic_name);
        input.description = description;
        let medicine = db.create_medicine(&input)?;
        Ok(medicine.into())
    }

    /// Get a medicine by ID.
    pub fn get_medicine(&self, id: i64) -> Result<Option<FfiMedicine>, HanapRxError> {
        let db = self.db.lock()?;
        let medicine = db.get_medicine(id)?;
        Ok(medicine.map(|m| m.into()))
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Stock a medicine at a branch. Fails with `Conflict` if the pair exists.
    pub fn create_inventory(
        &self,
        branch_id: i64,
        medicine_id: i64,
        stock_count: u32,
        price: f64,
    ) -> Result<FfiInventory, HanapRxError> {
        let db = self.db.lock()?;
        let record =
            db.create_inventory(&NewInventory::new(branch_id, medicine_id, stock_count, price))?;
        Ok(self.inventory_record(record))
    }

    /// Restock and/or reprice an inventory record.
    pub fn update_inventory(
        &self,
        id: i64,
        stock_count: Option<u32>,
        price: Option<f64>,
    ) -> Result<FfiInventory, HanapRxError> {
        let db = self.db.lock()?;
        let record = db.update_inventory(id, InventoryUpdate { stock_count, price })?;
        Ok(self.inventory_record(record))
    }

    /// Returns false when no record had that ID.
    pub fn delete_inventory(&self, id: i64) -> Result<bool, HanapRxError> {
        let db = self.db.lock()?;
        Ok(db.delete_inventory(id)?)
    }
}

impl HanapRxCore {
    fn inventory_record(&self, record: InventoryRecord) -> FfiInventory {
        let availability = record.availability(self.search_config.low_stock_threshold);
        FfiInventory {
            id: record.id,
            branch_id: record.branch_id,
            medicine_id: record.medicine_id,
            stock_count: record.stock_count,
            price: record.price,
            availability: availability.to_string(),
        }
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe search request. Unset fields take their defaults.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiSearchRequest {
    pub query: String,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_by: Option<String>,
    pub availability: Option<String>,
}

impl FfiSearchRequest {
    fn into_params(self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("q".to_string(), self.query);
        let optional = [
            ("page", self.page.map(|v| v.to_string())),
            ("limit", self.limit.map(|v| v.to_string())),
            ("lat", self.latitude.map(|v| v.to_string())),
            ("lng", self.longitude.map(|v| v.to_string())),
            ("sortBy", self.sort_by),
            ("availability", self.availability),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.insert(key.to_string(), value);
            }
        }
        params
    }
}

/// FFI-safe page of search results.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSearchPage {
    pub results: Vec<FfiSearchResult>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<Paginated<SearchResult>> for FfiSearchPage {
    fn from(page: Paginated<SearchResult>) -> Self {
        Self {
            results: page.data.into_iter().map(|r| r.into()).collect(),
            page: page.pagination.page,
            limit: page.pagination.limit,
            total: page.pagination.total,
            total_pages: page.pagination.total_pages,
        }
    }
}

/// FFI-safe search row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSearchResult {
    pub medicine_id: i64,
    pub medicine_name: String,
    pub generic_name: String,
    pub branch_id: i64,
    pub branch_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pharmacy_id: i64,
    pub pharmacy_name: String,
    pub pharmacy_logo_url: Option<String>,
    pub price: f64,
    pub stock_count: u32,
    pub availability: String,
    pub distance_km: Option<f64>,
}

impl From<SearchResult> for FfiSearchResult {
    fn from(row: SearchResult) -> Self {
        Self {
            medicine_id: row.medicine.id,
            medicine_name: row.medicine.name,
            generic_name: row.medicine.generic_name,
            branch_id: row.branch.id,
            branch_name: row.branch.name,
            address: row.branch.address,
            latitude: row.branch.latitude,
            longitude: row.branch.longitude,
            pharmacy_id: row.pharmacy.id,
            pharmacy_name: row.pharmacy.name,
            pharmacy_logo_url: row.pharmacy.logo_url,
            price: row.price,
            stock_count: row.stock_count,
            availability: row.availability.to_string(),
            distance_km: row.distance,
        }
    }
}

/// FFI-safe autocomplete suggestion.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSuggestion {
    pub id: i64,
    pub name: String,
    pub generic_name: String,
}

impl From<Suggestion> for FfiSuggestion {
    fn from(s: Suggestion) -> Self {
        Self {
            id: s.id,
            name: s.name,
            generic_name: s.generic_name,
        }
    }
}

/// FFI-safe pharmacy.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPharmacy {
    pub id: i64,
    pub name: String,
    pub logo_url: Option<String>,
}

impl From<Pharmacy> for FfiPharmacy {
    fn from(pharmacy: Pharmacy) -> Self {
        Self {
            id: pharmacy.id,
            name: pharmacy.name,
            logo_url: pharmacy.logo_url,
        }
    }
}

/// FFI-safe branch input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewBranch {
    pub pharmacy_id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_number: Option<String>,
    pub business_hours: Option<String>,
}

impl From<FfiNewBranch> for NewBranch {
    fn from(branch: FfiNewBranch) -> Self {
        NewBranch {
            pharmacy_id: branch.pharmacy_id,
            name: branch.name,
            address: branch.address,
            latitude: branch.latitude,
            longitude: branch.longitude,
            contact_number: branch.contact_number,
            business_hours: branch.business_hours,
        }
    }
}

/// FFI-safe branch.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBranch {
    pub id: i64,
    pub pharmacy_id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_number: Option<String>,
    pub business_hours: Option<String>,
}

impl From<Branch> for FfiBranch {
    fn from(branch: Branch) -> Self {
        Self {
            id: branch.id,
            pharmacy_id: branch.pharmacy_id,
            name: branch.name,
            address: branch.address,
            latitude: branch.latitude,
            longitude: branch.longitude,
            contact_number: branch.contact_number,
            business_hours: branch.business_hours,
        }
    }
}

/// FFI-safe medicine.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicine {
    pub id: i64,
    pub name: String,
    pub generic_name: String,
    pub description: Option<String>,
}

impl From<Medicine> for FfiMedicine {
    fn from(medicine: Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name,
            generic_name: medicine.generic_name,
            description: medicine.description,
        }
    }
}

/// FFI-safe inventory record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInventory {
    pub id: i64,
    pub branch_id: i64,
    pub medicine_id: i64,
    pub stock_count: u32,
    pub price: f64,
    pub availability: String,
}
