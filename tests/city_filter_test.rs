//! Scenario test: filtering a city roster through non-owning predicates.
//!
//! This test validates:
//! 1. A predicate passed as a callable reference selects exactly the matching
//!    records
//! 2. The relative order of the input survives filtering
//! 3. The input roster is left untouched
//! 4. Rebinding the same view switches the selection criteria

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use prometheus_fn_ref::util::telemetry::init_tracing;
use prometheus_fn_ref::FnRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct City {
    name: String,
    population: u64,
    country: String,
}

#[derive(Debug, Error)]
enum RosterError {
    #[error("malformed city roster: {0}")]
    Parse(#[from] serde_json::Error),
}

const CITY_ROSTER: &str = r#"[
  {"name": "Tokyo", "population": 37339804, "country": "Japan"},
  {"name": "Milan", "population": 3144473, "country": "Italy"},
  {"name": "Caracas", "population": 2945858, "country": "Venezuela"},
  {"name": "Hanoi", "population": 4874982, "country": "Vietnam"},
  {"name": "Santiago", "population": 6811595, "country": "Chile"},
  {"name": "Xi'An", "population": 8274651, "country": "China"},
  {"name": "Los Angeles", "population": 3983540, "country": "United States"},
  {"name": "Kinshasa", "population": 14970460, "country": "Democratic Republic of the Congo"},
  {"name": "Mexico City", "population": 21918936, "country": "Mexico"},
  {"name": "Shenzhen", "population": 12591696, "country": "China"},
  {"name": "Dubai", "population": 2921376, "country": "United Arab Emirates"},
  {"name": "Paris", "population": 11078546, "country": "France"},
  {"name": "Algiers", "population": 2809158, "country": "Algeria"},
  {"name": "Moscow", "population": 12593252, "country": "Russia"},
  {"name": "Shanghai", "population": 27795702, "country": "China"},
  {"name": "Lisbon", "population": 2971587, "country": "Portugal"},
  {"name": "Delhi", "population": 31181376, "country": "India"},
  {"name": "Bangalore", "population": 12764935, "country": "India"},
  {"name": "Dhaka", "population": 21741090, "country": "Bangladesh"},
  {"name": "Sao Paulo", "population": 22237472, "country": "Brazil"},
  {"name": "London", "population": 9425622, "country": "United Kingdom"},
  {"name": "Cairo", "population": 21322750, "country": "Egypt"},
  {"name": "Istanbul", "population": 15415197, "country": "Turkey"},
  {"name": "Berlin", "population": 3566791, "country": "Germany"},
  {"name": "Kolkata", "population": 14974073, "country": "India"},
  {"name": "Beijing", "population": 20896820, "country": "China"},
  {"name": "Madrid", "population": 6668865, "country": "Spain"},
  {"name": "Chengdu", "population": 9305116, "country": "China"},
  {"name": "Chongqing", "population": 16382376, "country": "China"},
  {"name": "New York City", "population": 8230290, "country": "United States"},
  {"name": "Mumbai", "population": 20667656, "country": "India"},
  {"name": "Manila", "population": 14158573, "country": "Philippines"},
  {"name": "Bangkok", "population": 10722815, "country": "Thailand"}
]"#;

fn load_cities() -> Result<Vec<City>, RosterError> {
    Ok(serde_json::from_str(CITY_ROSTER)?)
}

fn find_all_matching<'c>(
    cities: &'c [City],
    predicate: FnRef<'_, (&'c City,), bool>,
) -> Vec<City> {
    let mut matching = Vec::with_capacity(cities.len());
    for city in cities {
        if predicate.call((city,)) {
            matching.push(city.clone());
        }
    }
    matching.shrink_to_fit();
    matching
}

#[test]
fn test_roster_has_expected_size() -> Result<()> {
    let cities = load_cities()?;
    assert_eq!(cities.len(), 33);
    Ok(())
}

#[test]
fn test_population_filter_preserves_order_and_input() -> Result<()> {
    init_tracing();
    let cities = load_cities()?;
    let snapshot = cities.clone();

    let over_ten_million = |city: &City| city.population > 10_000_000;
    let megacities = find_all_matching(&cities, FnRef::new(&over_ten_million));

    let names: Vec<&str> = megacities.iter().map(|city| city.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Tokyo",
            "Kinshasa",
            "Mexico City",
            "Shenzhen",
            "Paris",
            "Moscow",
            "Shanghai",
            "Delhi",
            "Bangalore",
            "Dhaka",
            "Sao Paulo",
            "Cairo",
            "Istanbul",
            "Kolkata",
            "Beijing",
            "Chongqing",
            "Mumbai",
            "Manila",
            "Bangkok",
        ]
    );

    // Filtering reads the roster; it never reorders or mutates it.
    assert_eq!(cities, snapshot);
    tracing::debug!(matches = megacities.len(), "population filter complete");
    Ok(())
}

#[test]
fn test_rebound_predicate_switches_criteria() -> Result<()> {
    let cities = load_cities()?;

    let over_ten_million = |city: &City| city.population > 10_000_000;
    let in_china = |city: &City| city.country == "China";

    let mut predicate = FnRef::new(&over_ten_million);
    assert_eq!(find_all_matching(&cities, predicate).len(), 19);

    predicate = FnRef::new(&in_china);
    let chinese = find_all_matching(&cities, predicate);
    let names: Vec<&str> = chinese.iter().map(|city| city.name.as_str()).collect();
    assert_eq!(
        names,
        ["Xi'An", "Shenzhen", "Shanghai", "Beijing", "Chengdu", "Chongqing"]
    );
    Ok(())
}

#[test]
fn test_no_matches_yields_empty_roster() -> Result<()> {
    let cities = load_cities()?;
    let impossible = |city: &City| city.population > 40_000_000;
    assert!(find_all_matching(&cities, FnRef::new(&impossible)).is_empty());
    Ok(())
}
