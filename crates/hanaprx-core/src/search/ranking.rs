//! Row building, filtering and ordering for search results.

use crate::geo::{round_km, Coordinate};
use crate::models::{
    Availability, BranchSnapshot, MedicineListing, MedicineSnapshot, PageRequest, SearchResult,
};

use super::SortBy;

/// Expand each medicine into one row per branch that lists it.
///
/// Rows keep the listing order. Distances are filled in only when `origin`
/// is present.
pub fn flatten(
    listings: Vec<MedicineListing>,
    origin: Option<Coordinate>,
    low_stock_threshold: u32,
) -> Vec<SearchResult> {
    listings
        .into_iter()
        .flat_map(|listing| {
            let medicine = MedicineSnapshot::from(&listing.medicine);
            listing.stock.into_iter().map(move |entry| SearchResult {
                medicine: medicine.clone(),
                branch: BranchSnapshot::from(&entry.branch),
                distance: origin.map(|from| round_km(from.distance_to(&entry.branch.coordinate()))),
                availability: Availability::classify_with_threshold(
                    entry.stock_count,
                    low_stock_threshold,
                ),
                pharmacy: entry.pharmacy,
                price: entry.price,
                stock_count: entry.stock_count,
            })
        })
        .collect()
}

/// Keep only rows with the requested availability.
pub fn retain_availability(rows: &mut Vec<SearchResult>, availability: Option<Availability>) {
    if let Some(wanted) = availability {
        rows.retain(|row| row.availability == wanted);
    }
}

/// Stable sort by the requested key; `None` keeps input order.
pub fn sort_rows(rows: &mut [SearchResult], sort: Option<SortBy>) {
    match sort {
        Some(SortBy::Price) => rows.sort_by(|a, b| a.price.total_cmp(&b.price)),
        Some(SortBy::Distance) => rows.sort_by(|a, b| distance_key(a).total_cmp(&distance_key(b))),
        None => {}
    }
}

/// Cut one page out of an already ordered row set.
pub fn page_rows(rows: Vec<SearchResult>, page: PageRequest) -> Vec<SearchResult> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    rows.into_iter()
        .skip(offset)
        .take(page.limit as usize)
        .collect()
}

fn distance_key(row: &SearchResult) -> f64 {
    row.distance.unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Branch, BranchStock, Medicine, PharmacySummary};

    fn medicine(id: i64, name: &str) -> Medicine {
        Medicine {
            id,
            name: name.into(),
            generic_name: "Generic".into(),
            description: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn stock(id: i64, lat: f64, lng: f64, stock_count: u32, price: f64) -> BranchStock {
        BranchStock {
            inventory_id: id,
            branch: Branch {
                id,
                pharmacy_id: 1,
                name: format!("Branch {}", id),
                address: "Cebu City".into(),
                latitude: lat,
                longitude: lng,
                contact_number: None,
                business_hours: None,
                created_at: String::new(),
                updated_at: String::new(),
            },
            pharmacy: PharmacySummary {
                id: 1,
                name: "Mercury Drug".into(),
                logo_url: None,
            },
            stock_count,
            price,
        }
    }

    fn listings() -> Vec<MedicineListing> {
        vec![
            MedicineListing {
                medicine: medicine(1, "Advil"),
                stock: vec![stock(1, 10.30, 123.90, 4, 12.0)],
            },
            MedicineListing {
                medicine: medicine(2, "Biogesic"),
                stock: vec![
                    stock(2, 10.2942, 123.9010, 0, 6.0),
                    stock(3, 10.3181, 123.9050, 25, 7.5),
                ],
            },
            MedicineListing {
                medicine: medicine(3, "Neozep"),
                stock: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_flatten_without_origin() {
        let rows = flatten(listings(), None, 10);

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.distance.is_none()));
        let availability: Vec<_> = rows.iter().map(|r| r.availability).collect();
        assert_eq!(
            availability,
            vec![
                Availability::LowStock,
                Availability::OutOfStock,
                Availability::InStock
            ]
        );
        assert_eq!(rows[1].medicine.name, "Biogesic");
    }

    #[test]
    fn test_flatten_with_origin_rounds_distance() {
        let origin = Coordinate::new(10.2942, 123.9010);
        let rows = flatten(listings(), Some(origin), 10);

        // Same spot as branch 2
        assert_eq!(rows[1].distance, Some(0.0));
        let d = rows[2].distance.unwrap();
        assert_eq!(d, (d * 100.0).round() / 100.0);
        assert!((d - 2.69).abs() < 0.05);
    }

    #[test]
    fn test_retain_availability() {
        let mut rows = flatten(listings(), None, 10);
        retain_availability(&mut rows, Some(Availability::OutOfStock));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock_count, 0);

        let mut rows = flatten(listings(), None, 10);
        retain_availability(&mut rows, None);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_sort_by_price() {
        let mut rows = flatten(listings(), None, 10);
        sort_rows(&mut rows, Some(SortBy::Price));

        let prices: Vec<_> = rows.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![6.0, 7.5, 12.0]);
    }

    #[test]
    fn test_sort_by_distance_puts_missing_last() {
        let mut rows = flatten(listings(), Some(Coordinate::new(10.3181, 123.9050)), 10);
        rows[0].distance = None;
        sort_rows(&mut rows, Some(SortBy::Distance));

        assert_eq!(rows[0].distance, Some(0.0));
        assert!(rows[1].distance.is_some());
        assert!(rows[2].distance.is_none());
    }

    #[test]
    fn test_sort_by_distance_without_origin_keeps_order() {
        let mut rows = flatten(listings(), None, 10);
        let before: Vec<_> = rows.iter().map(|r| r.branch.id).collect();
        sort_rows(&mut rows, Some(SortBy::Distance));
        let after: Vec<_> = rows.iter().map(|r| r.branch.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_page_rows() {
        let rows = flatten(listings(), None, 10);
        let page = page_rows(rows, PageRequest { page: 2, limit: 2 });
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].branch.id, 3);
    }
}
