//! Medicine name suggestions for the search box.

use crate::config::SearchConfig;
use crate::models::Suggestion;

use super::{EngineResult, MedicineSource};

/// Suggest medicines whose brand or generic name contains `query`.
///
/// Queries shorter than `autocomplete_min_chars` return nothing without
/// touching the source.
pub fn suggest<S: MedicineSource + ?Sized>(
    source: &S,
    query: &str,
    config: &SearchConfig,
) -> EngineResult<Vec<Suggestion>> {
    if query.chars().count() < config.autocomplete_min_chars {
        return Ok(Vec::new());
    }

    let medicines = source.suggest_medicines(query, config.autocomplete_limit)?;
    tracing::debug!(query, matches = medicines.len(), "Autocomplete");

    Ok(medicines.iter().map(Suggestion::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbResult;
    use crate::models::{Medicine, MedicineListing, PageRequest};
    use std::cell::Cell;

    /// Source that records how often it is read.
    #[derive(Default)]
    struct CountingSource {
        reads: Cell<usize>,
    }

    impl MedicineSource for CountingSource {
        fn find_medicines(
            &self,
            _query: &str,
            _window: Option<PageRequest>,
        ) -> DbResult<Vec<MedicineListing>> {
            self.reads.set(self.reads.get() + 1);
            Ok(Vec::new())
        }

        fn count_medicines(&self, _query: &str) -> DbResult<u64> {
            self.reads.set(self.reads.get() + 1);
            Ok(0)
        }

        fn suggest_medicines(&self, query: &str, limit: u32) -> DbResult<Vec<Medicine>> {
            self.reads.set(self.reads.get() + 1);
            Ok((0..limit + 5)
                .map(|i| Medicine {
                    id: i64::from(i),
                    name: format!("{}{}", query, i),
                    generic_name: "Generic".into(),
                    description: None,
                    created_at: String::new(),
                    updated_at: String::new(),
                })
                .take(limit as usize)
                .collect())
        }
    }

    #[test]
    fn test_short_query_skips_read() {
        let source = CountingSource::default();
        let config = SearchConfig::default();

        assert!(suggest(&source, "b", &config).unwrap().is_empty());
        assert!(suggest(&source, "", &config).unwrap().is_empty());
        assert_eq!(source.reads.get(), 0);
    }

    #[test]
    fn test_limit_passed_to_source() {
        let source = CountingSource::default();
        let config = SearchConfig::default();

        let suggestions = suggest(&source, "bi", &config).unwrap();
        assert_eq!(suggestions.len(), 10);
        assert_eq!(source.reads.get(), 1);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let source = CountingSource::default();
        let config = SearchConfig::default();

        // One multi-byte character is still one character
        assert!(suggest(&source, "é", &config).unwrap().is_empty());
        assert_eq!(source.reads.get(), 0);
    }
}
