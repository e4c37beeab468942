//! Country catalogs and assumption override resolution.

use feasibility_core::{
    compliance::RuleCatalog,
    config::{
        resolve_assumptions, AssumptionCatalog, AssumptionOverrides, ConstructionCostTiers,
        CountryCostAssumptions, OccupancyOverrides,
    },
    types::FinishLevel,
};
use std::path::PathBuf;

fn data_dir() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../data")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn unknown_country_falls_back_to_default() {
    let catalog = AssumptionCatalog::default_test();
    assert_eq!(catalog.default_country(), "US");
    assert_eq!(catalog.for_country("ZZ").country_code, "US");
    assert_eq!(catalog.for_country("ke").country_code, "KE", "lookup ignores case");
    assert_eq!(catalog.country_codes(), vec!["KE", "US"]);
}

#[test]
fn finish_levels_map_to_tiers() {
    let tiers = ConstructionCostTiers { basic: 1.0, standard: 2.0, improved: 3.0 };
    assert_eq!(tiers.for_finish(FinishLevel::Basic), 1.0);
    assert_eq!(tiers.for_finish(FinishLevel::Standard), 2.0);
    assert_eq!(tiers.for_finish(FinishLevel::Improved), 3.0);
    assert_eq!(FinishLevel::default(), FinishLevel::Standard);
}

#[test]
fn no_overrides_resolves_to_country_data() {
    let catalog = AssumptionCatalog::default_test();
    let us = catalog.for_country("US");
    assert_eq!(&resolve_assumptions(us, None, None), us);
}

#[test]
fn scenario_beats_project_beats_country() {
    let catalog = AssumptionCatalog::default_test();
    let us = catalog.for_country("US");

    let project = AssumptionOverrides {
        construction_costs: Some(ConstructionCostTiers {
            basic: 900.0,
            standard: 1_000.0,
            improved: 1_100.0,
        }),
        occupancy: Some(OccupancyOverrides {
            one_bedroom: Some(1.5),
            two_bedroom: Some(2.5),
            ..Default::default()
        }),
        ..Default::default()
    };
    let scenario = AssumptionOverrides {
        occupancy: Some(OccupancyOverrides {
            two_bedroom: Some(3.2),
            ..Default::default()
        }),
        ..Default::default()
    };

    let resolved = resolve_assumptions(us, Some(&project), Some(&scenario));

    assert_eq!(resolved.construction_costs.standard, 1_000.0, "project tier");
    assert_eq!(resolved.occupancy.one_bedroom, 1.5, "project occupancy");
    assert_eq!(resolved.occupancy.two_bedroom, 3.2, "scenario occupancy");
    assert_eq!(resolved.occupancy.three_bedroom, 4.1, "country occupancy");
    assert_eq!(resolved.utility_consumption, us.utility_consumption);
    assert_eq!(resolved.country_code, "US");
}

#[test]
fn missing_occupancy_uses_defaults() {
    let json = r#"{
        "country_code": "XX",
        "currency": "XXX",
        "construction_costs": { "basic": 1, "standard": 2, "improved": 3 },
        "infrastructure_costs": {
            "water_connection": 1, "sewer_connection": 1,
            "electrical_connection": 1, "road_per_meter": 1
        },
        "utility_consumption": {
            "water_liters_per_person": 100,
            "electricity_kwh_per_person": 2,
            "waste_kg_per_person": 0.5
        },
        "density_thresholds": { "low": 0, "medium": 50, "high": 150, "very_high": 300 },
        "infrastructure_thresholds": {
            "warning": { "water_liters_per_day": 1000, "population": 10 },
            "exceeds": { "water_liters_per_day": 2000, "population": 20 }
        },
        "visualization": { "bedroom": 10, "living_room": 15, "kitchen": 8, "bathroom": 4 }
    }"#;
    let parsed: CountryCostAssumptions = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.occupancy.one_bedroom, 2.0);
    assert_eq!(parsed.occupancy.two_bedroom, 3.0);
    assert_eq!(parsed.occupancy.three_bedroom, 4.0);
    assert_eq!(parsed.occupancy.single_family, 4.0);
}

#[test]
fn shipped_catalogs_load() {
    let assumptions = AssumptionCatalog::load(&data_dir()).unwrap();
    assert_eq!(assumptions.default_country(), "US");
    for code in ["US", "KE", "IN", "MX"] {
        assert_eq!(assumptions.for_country(code).country_code, code);
    }

    let rules = RuleCatalog::load(&data_dir()).unwrap();
    assert!(!rules.rules_for("US", None).is_empty());
    assert!(rules.rules_for("US", Some("Boston")).len() > rules.rules_for("US", None).len());
}

#[test]
fn missing_data_dir_is_an_error() {
    let err = AssumptionCatalog::load("/nonexistent/data").unwrap_err();
    assert!(err.to_string().contains("Cannot read"), "got: {err}");
}
