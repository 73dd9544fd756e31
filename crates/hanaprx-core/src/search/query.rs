//! Typed search options and request-parameter parsing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SearchConfig;
use crate::geo::Coordinate;
use crate::models::{Availability, PageRequest};

/// Malformed search parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Parameter {param} must be an integer, got {value:?}")]
    InvalidNumber { param: &'static str, value: String },

    #[error("Parameter {param} must be a coordinate in range, got {value:?}")]
    InvalidCoordinate { param: &'static str, value: String },

    #[error("Unknown availability filter: {0:?}")]
    InvalidAvailability(String),
}

/// Sort key for search rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Cheapest first
    Price,
    /// Nearest first; rows without a distance go last
    Distance,
}

impl SortBy {
    /// Parse a `sortBy` value. Unrecognized keys mean "no sort".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "price" => Some(SortBy::Price),
            "distance" => Some(SortBy::Distance),
            _ => None,
        }
    }
}

/// Fully validated search options.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Substring matched against brand and generic names; empty matches all
    pub text: String,
    pub page: PageRequest,
    /// Caller location; enables distances
    pub origin: Option<Coordinate>,
    pub sort: Option<SortBy>,
    pub availability: Option<Availability>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page: PageRequest::default(),
            origin: None,
            sort: None,
            availability: None,
        }
    }

    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    pub fn near(mut self, origin: Coordinate) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn availability(mut self, availability: Availability) -> Self {
        self.availability = Some(availability);
        self
    }

    /// Build options from raw request parameters
    /// (`q`, `page`, `limit`, `lat`, `lng`, `sortBy`, `availability`).
    ///
    /// Empty values count as absent. `page` and `limit` are clamped rather
    /// than rejected; a lone `lat` or `lng` leaves the origin unset.
    pub fn from_params(
        params: &HashMap<String, String>,
        config: &SearchConfig,
    ) -> Result<Self, QueryError> {
        let get = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());

        let page = parse_int("page", get("page"))?.unwrap_or(1);
        let limit = parse_int("limit", get("limit"))?.unwrap_or(i64::from(config.default_page_size));

        let lat = parse_coordinate("lat", get("lat"), 90.0)?;
        let lng = parse_coordinate("lng", get("lng"), 180.0)?;
        let origin = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };

        let availability = get("availability")
            .map(|value| {
                value
                    .parse::<Availability>()
                    .map_err(|_| QueryError::InvalidAvailability(value.to_string()))
            })
            .transpose()?;

        Ok(Self {
            text: get("q").unwrap_or_default().to_string(),
            page: PageRequest::clamped(page, limit, config.max_page_size),
            origin,
            sort: get("sortBy").and_then(SortBy::parse),
            availability,
        })
    }
}

fn parse_int(param: &'static str, value: Option<&str>) -> Result<Option<i64>, QueryError> {
    value
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| QueryError::InvalidNumber {
                param,
                value: raw.to_string(),
            })
        })
        .transpose()
}

fn parse_coordinate(
    param: &'static str,
    value: Option<&str>,
    bound: f64,
) -> Result<Option<f64>, QueryError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && (-bound..=bound).contains(&parsed) => Ok(Some(parsed)),
        _ => Err(QueryError::InvalidCoordinate {
            param,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse(pairs: &[(&str, &str)]) -> Result<SearchQuery, QueryError> {
        SearchQuery::from_params(&params(pairs), &SearchConfig::default())
    }

    #[test]
    fn test_defaults() {
        let query = parse(&[]).unwrap();
        assert_eq!(query, SearchQuery::new(""));
        assert_eq!(query.page, PageRequest { page: 1, limit: 20 });
    }

    #[test]
    fn test_full_parameter_set() {
        let query = parse(&[
            ("q", "biogesic"),
            ("page", "2"),
            ("limit", "5"),
            ("lat", "10.3157"),
            ("lng", "123.8854"),
            ("sortBy", "distance"),
            ("availability", "Low Stock"),
        ])
        .unwrap();

        assert_eq!(query.text, "biogesic");
        assert_eq!(query.page, PageRequest { page: 2, limit: 5 });
        assert_eq!(query.origin, Some(Coordinate::new(10.3157, 123.8854)));
        assert_eq!(query.sort, Some(SortBy::Distance));
        assert_eq!(query.availability, Some(Availability::LowStock));
    }

    #[test]
    fn test_page_and_limit_are_clamped() {
        let query = parse(&[("page", "0"), ("limit", "1000")]).unwrap();
        assert_eq!(query.page, PageRequest { page: 1, limit: 100 });

        let query = parse(&[("page", "-3"), ("limit", "0")]).unwrap();
        assert_eq!(query.page, PageRequest { page: 1, limit: 1 });
    }

    #[test]
    fn test_non_numeric_page_rejected() {
        assert!(matches!(
            parse(&[("page", "two")]),
            Err(QueryError::InvalidNumber { param: "page", .. })
        ));
        assert!(matches!(
            parse(&[("limit", "1.5")]),
            Err(QueryError::InvalidNumber { param: "limit", .. })
        ));
    }

    #[test]
    fn test_coordinates() {
        // Only one half of the pair: no origin
        assert_eq!(parse(&[("lat", "10.3")]).unwrap().origin, None);

        assert!(matches!(
            parse(&[("lat", "91"), ("lng", "0")]),
            Err(QueryError::InvalidCoordinate { param: "lat", .. })
        ));
        assert!(matches!(
            parse(&[("lat", "0"), ("lng", "NaN")]),
            Err(QueryError::InvalidCoordinate { param: "lng", .. })
        ));

        // Zero is a real coordinate
        assert_eq!(
            parse(&[("lat", "0"), ("lng", "0")]).unwrap().origin,
            Some(Coordinate::new(0.0, 0.0))
        );
    }

    #[test]
    fn test_unknown_sort_is_ignored() {
        assert_eq!(parse(&[("sortBy", "rating")]).unwrap().sort, None);
        assert_eq!(parse(&[("sortBy", "price")]).unwrap().sort, Some(SortBy::Price));
    }

    #[test]
    fn test_unknown_availability_rejected() {
        assert_eq!(
            parse(&[("availability", "Plenty")]),
            Err(QueryError::InvalidAvailability("Plenty".into()))
        );
    }

    #[test]
    fn test_empty_values_are_absent() {
        let query = parse(&[("q", ""), ("sortBy", ""), ("availability", ""), ("page", "")]).unwrap();
        assert_eq!(query, SearchQuery::new(""));
    }
}
