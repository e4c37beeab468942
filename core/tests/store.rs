//! SQLite repository: round trips, ordering, cascading deletes.

use feasibility_core::{
    config::AssumptionCatalog,
    demand_forecast::{forecast, ForecastHorizon},
    project::{AreaUnit, LandArea, Project},
    results_calculator::compute_record,
    scenario::{ScenarioRecord, UnitMix},
    store::{ScenarioRepository, SqliteStore},
    types::BudgetRange,
};

fn store() -> SqliteStore {
    let store = SqliteStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn project() -> Project {
    Project::new(
        "Harbor View",
        "US",
        BudgetRange::new(1_000_000.0, 5_000_000.0),
        LandArea { value: 1.5, unit: AreaUnit::Hectares },
    )
    .with_city("Boston")
    .with_population(42_000)
}

#[test]
fn project_round_trip() {
    let store = store();
    let p = project();
    store.put_project(&p).unwrap();

    assert_eq!(store.get_project(&p.id).unwrap(), Some(p.clone()));
    assert_eq!(store.get_project("missing").unwrap(), None);
    assert_eq!(store.project_count().unwrap(), 1);
}

#[test]
fn put_project_updates_in_place() {
    let store = store();
    let mut p = project();
    store.put_project(&p).unwrap();

    p.name = "Harbor View II".into();
    p.current_population = 50_000;
    store.put_project(&p).unwrap();

    let loaded = store.get_project(&p.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Harbor View II");
    assert_eq!(loaded.current_population, 50_000);
    assert_eq!(store.project_count().unwrap(), 1);
}

#[test]
fn scenarios_round_trip_in_insertion_order() {
    let store = store();
    let p = project();
    store.put_project(&p).unwrap();

    let a = ScenarioRecord::apartment(&p.id, "A", 6, 3, UnitMix::new(30.0, 40.0, 30.0));
    let b = ScenarioRecord::single_family(&p.id, "B", 12);
    let c = ScenarioRecord::mixed(&p.id, "C", 20, 15, 5);
    for s in [&a, &b, &c] {
        store.put_scenario(s).unwrap();
    }
    // Re-saving must not move a scenario to the end.
    store.put_scenario(&a).unwrap();

    let names: Vec<String> = store
        .scenarios_for_project(&p.id)
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(store.get_scenario(&b.id).unwrap(), Some(b));
    assert_eq!(store.scenario_count(&p.id).unwrap(), 3);
}

#[test]
fn scenario_requires_existing_project() {
    let store = store();
    let orphan = ScenarioRecord::single_family("no-such-project", "orphan", 4);
    assert!(store.put_scenario(&orphan).is_err());
}

#[test]
fn deleting_a_project_removes_its_scenarios_and_forecast() {
    let store = store();
    let p = project();
    store.put_project(&p).unwrap();
    let s = ScenarioRecord::single_family(&p.id, "houses", 8);
    store.put_scenario(&s).unwrap();
    store
        .put_forecast(&forecast(&p.id, 42_000, 2.0, ForecastHorizon::FiveYears))
        .unwrap();

    assert!(store.delete_project(&p.id).unwrap());
    assert_eq!(store.get_scenario(&s.id).unwrap(), None);
    assert_eq!(store.get_forecast(&p.id).unwrap(), None);
    assert_eq!(store.scenario_count(&p.id).unwrap(), 0);
    assert!(!store.delete_project(&p.id).unwrap(), "second delete finds nothing");
}

#[test]
fn deleting_a_scenario_leaves_siblings() {
    let store = store();
    let p = project();
    store.put_project(&p).unwrap();
    let keep = ScenarioRecord::single_family(&p.id, "keep", 8);
    let drop = ScenarioRecord::single_family(&p.id, "drop", 9);
    store.put_scenario(&keep).unwrap();
    store.put_scenario(&drop).unwrap();

    assert!(store.delete_scenario(&drop.id).unwrap());
    assert!(!store.delete_scenario(&drop.id).unwrap());
    let remaining = store.scenarios_for_project(&p.id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
}

#[test]
fn latest_forecast_replaces_the_previous_one() {
    let store = store();
    let p = project();
    store.put_project(&p).unwrap();

    store
        .put_forecast(&forecast(&p.id, 42_000, 2.0, ForecastHorizon::FiveYears))
        .unwrap();
    let latest = forecast(&p.id, 42_000, 3.0, ForecastHorizon::TwentyYears);
    store.put_forecast(&latest).unwrap();

    assert_eq!(store.get_forecast(&p.id).unwrap(), Some(latest));
}

#[test]
fn put_results_embeds_results_in_the_scenario() {
    let store = store();
    let p = project();
    store.put_project(&p).unwrap();
    let s = ScenarioRecord::single_family(&p.id, "houses", 8);
    store.put_scenario(&s).unwrap();

    let catalog = AssumptionCatalog::default_test();
    let results = compute_record(
        &s,
        &p.budget,
        p.land_area.hectares(),
        catalog.for_country("US"),
        None,
    )
    .unwrap();

    store.put_results(&s.id, &results, 7).unwrap();
    let stored = store.get_scenario(&s.id).unwrap().unwrap();
    let cached = stored.results.expect("results embedded");
    assert_eq!(cached.total_units, results.total_units);
    assert_eq!(cached.unit_counts, results.unit_counts);
    assert!((cached.total_project_cost - results.total_project_cost).abs() < 1e-6);
    assert_eq!(stored.input_fingerprint, Some(7));

    assert!(store.put_results("missing", &results, 7).is_err());
}
