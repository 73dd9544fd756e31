//! Property tests for distance, availability tiers and row ordering.

use hanaprx_core::geo::{haversine_distance, round_km, Coordinate, EARTH_RADIUS_KM};
use hanaprx_core::models::{Availability, NewBranch, NewInventory, NewMedicine, NewPharmacy};
use hanaprx_core::{Database, SearchEngine, SearchQuery, SortBy};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (-90.0_f64..=90.0, -180.0_f64..=180.0).prop_map(|(lat, lng)| Coordinate::new(lat, lng))
}

/// One medicine stocked at one branch per (lat, lng, stock, cents) tuple.
fn seeded_db(stock: &[(f64, f64, u32, u32)]) -> Database {
    let db = Database::open_in_memory().unwrap();
    let pharmacy = db.create_pharmacy(&NewPharmacy::new("Rose Pharmacy")).unwrap();
    let medicine = db
        .create_medicine(&NewMedicine::new("Solmux", "Carbocisteine"))
        .unwrap();

    for (i, &(lat, lng, count, cents)) in stock.iter().enumerate() {
        let branch = db
            .create_branch(&NewBranch::new(pharmacy.id, format!("Branch {}", i), "Cebu City", lat, lng))
            .unwrap();
        db.create_inventory(&NewInventory::new(branch.id, medicine.id, count, f64::from(cents) / 100.0))
            .unwrap();
    }
    db
}

fn stock_rows() -> impl Strategy<Value = Vec<(f64, f64, u32, u32)>> {
    prop::collection::vec(
        (9.5_f64..11.5, 123.0_f64..125.0, 0_u32..60, 1_u32..50_000),
        1..12,
    )
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn haversine_is_symmetric(a in coordinate(), b in coordinate()) {
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-9);
        prop_assert!(ab >= 0.0);
        prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
    }

    #[test]
    fn haversine_zero_for_same_point(a in coordinate()) {
        prop_assert_eq!(round_km(haversine_distance(&a, &a)), 0.0);
    }

    #[test]
    fn availability_tiers_follow_stock(stock in 0_u32..1_000) {
        let tier = Availability::classify(stock);
        let expected = if stock == 0 {
            Availability::OutOfStock
        } else if stock <= 10 {
            Availability::LowStock
        } else {
            Availability::InStock
        };
        prop_assert_eq!(tier, expected);
    }
}

proptest! {
    #![proptest_config(Config::with_cases(32))]
    #[test]
    fn price_sort_is_ascending(stock in stock_rows()) {
        let db = seeded_db(&stock);
        let engine = SearchEngine::new(&db);

        let result = engine.search(&SearchQuery::new("solmux").sort_by(SortBy::Price)).unwrap();

        prop_assert_eq!(result.data.len(), stock.len());
        prop_assert!(result.data.windows(2).all(|w| w[0].price <= w[1].price));
    }

    #[test]
    fn distance_sort_is_ascending(stock in stock_rows(), origin in coordinate()) {
        let db = seeded_db(&stock);
        let engine = SearchEngine::new(&db);

        let query = SearchQuery::new("carbo").near(origin).sort_by(SortBy::Distance);
        let result = engine.search(&query).unwrap();

        let distances: Vec<f64> = result.data.iter().map(|r| r.distance.unwrap()).collect();
        prop_assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn availability_filter_keeps_only_requested_tier(stock in stock_rows()) {
        let db = seeded_db(&stock);
        let engine = SearchEngine::new(&db);

        let mut seen = 0;
        for tier in [Availability::InStock, Availability::LowStock, Availability::OutOfStock] {
            let result = engine.search(&SearchQuery::new("").availability(tier)).unwrap();
            prop_assert!(result.data.iter().all(|r| r.availability == tier));
            seen += result.data.len();
        }
        prop_assert_eq!(seen, stock.len());
    }
}
