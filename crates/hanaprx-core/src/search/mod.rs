//! Medicine search across branch inventory.
//!
//! Pipeline: name match → inventory fan-out → distance + availability →
//! availability filter → sort → pagination envelope

mod autocomplete;
mod query;
pub mod ranking;

pub use autocomplete::*;
pub use query::*;

use crate::config::{PaginationScope, SearchConfig};
use crate::db::{Database, DbResult};
use crate::models::{Medicine, MedicineListing, PageRequest, Paginated, SearchResult, Suggestion};
use thiserror::Error;

/// Search errors.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),
}

pub type EngineResult<T> = Result<T, SearchError>;

/// Read access the search engine needs from storage.
pub trait MedicineSource {
    /// Medicines whose brand or generic name contains `query`
    /// (case-insensitive), ordered by name, each with all of its inventory
    /// rows. `window` bounds the medicines; `None` returns every match.
    fn find_medicines(
        &self,
        query: &str,
        window: Option<PageRequest>,
    ) -> DbResult<Vec<MedicineListing>>;

    /// Number of medicines matching `query`, regardless of pagination.
    fn count_medicines(&self, query: &str) -> DbResult<u64>;

    /// Up to `limit` medicines matching `query`, ordered by name.
    fn suggest_medicines(&self, query: &str, limit: u32) -> DbResult<Vec<Medicine>>;
}

impl MedicineSource for Database {
    fn find_medicines(
        &self,
        query: &str,
        window: Option<PageRequest>,
    ) -> DbResult<Vec<MedicineListing>> {
        self.find_medicine_listings(query, window)
    }

    fn count_medicines(&self, query: &str) -> DbResult<u64> {
        self.count_matching_medicines(query)
    }

    fn suggest_medicines(&self, query: &str, limit: u32) -> DbResult<Vec<Medicine>> {
        self.query_medicines_limited(query, limit)
    }
}

/// Runs searches and autocomplete against a [`MedicineSource`].
pub struct SearchEngine<'a, S: MedicineSource + ?Sized = Database> {
    source: &'a S,
    config: SearchConfig,
}

impl<'a, S: MedicineSource + ?Sized> SearchEngine<'a, S> {
    /// Create an engine with default settings.
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, SearchConfig::default())
    }

    pub fn with_config(source: &'a S, config: SearchConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search medicines and return one row per (medicine, branch).
    pub fn search(&self, query: &SearchQuery) -> EngineResult<Paginated<SearchResult>> {
        let result = match self.config.pagination_scope {
            PaginationScope::Medicines => {
                let listings = self.source.find_medicines(&query.text, Some(query.page))?;
                let total = self.source.count_medicines(&query.text)?;
                let rows = self.rank(listings, query);
                Paginated::for_request(rows, query.page, total)
            }
            PaginationScope::Rows => {
                let listings = self.source.find_medicines(&query.text, None)?;
                let rows = self.rank(listings, query);
                let total = rows.len() as u64;
                Paginated::for_request(ranking::page_rows(rows, query.page), query.page, total)
            }
        };

        tracing::debug!(
            query = %query.text,
            page = query.page.page,
            limit = query.page.limit,
            rows = result.data.len(),
            total = result.pagination.total,
            scope = ?self.config.pagination_scope,
            "Search"
        );
        Ok(result)
    }

    /// Name suggestions for a partial query.
    pub fn autocomplete(&self, query: &str) -> EngineResult<Vec<Suggestion>> {
        suggest(self.source, query, &self.config)
    }

    fn rank(&self, listings: Vec<MedicineListing>, query: &SearchQuery) -> Vec<SearchResult> {
        let mut rows = ranking::flatten(listings, query.origin, self.config.low_stock_threshold);
        ranking::retain_availability(&mut rows, query.availability);
        ranking::sort_rows(&mut rows, query.sort);
        rows
    }
}
