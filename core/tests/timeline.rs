//! Construction timeline: phase layout, monthly cost curve.

use feasibility_core::{
    config::AssumptionCatalog,
    results_calculator::{compute_record, ScenarioResults},
    scenario::{ScenarioRecord, UnitMix},
    timeline::{generate, generate_with, PhaseId, ProjectTimeline, TimelineSettings},
    types::BudgetRange,
};

fn apartment_results() -> ScenarioResults {
    let record = ScenarioRecord::apartment("p-1", "block", 8, 4, UnitMix::new(40.0, 35.0, 25.0));
    let catalog = AssumptionCatalog::default_test();
    compute_record(
        &record,
        &BudgetRange::new(0.0, 10_000_000.0),
        1.0,
        catalog.for_country("US"),
        None,
    )
    .unwrap()
}

fn assert_well_formed(t: &ProjectTimeline) {
    let total: u32 = t.phases.iter().map(|p| p.duration_months).sum();
    assert_eq!(total, t.total_duration_months, "durations must sum to the total");

    assert_eq!(t.phases.first().map(|p| p.start_month), Some(0));
    for pair in t.phases.windows(2) {
        assert_eq!(
            pair[0].end_month, pair[1].start_month,
            "{:?} and {:?} must be contiguous",
            pair[0].id, pair[1].id
        );
    }
    assert_eq!(
        t.phases.last().map(|p| p.end_month),
        Some(t.total_duration_months)
    );

    assert_eq!(t.monthly_breakdown.len(), t.total_duration_months as usize);
    let monthly: f64 = t.monthly_breakdown.iter().map(|m| m.amount).sum();
    assert!(
        (monthly - t.total_cost).abs() < 1e-6 * t.total_cost.max(1.0),
        "monthly costs {monthly} must sum to {}",
        t.total_cost
    );
}

#[test]
fn standard_schedule_has_six_sequential_phases() {
    let results = apartment_results();
    let t = generate(Some(&results), 24);

    let ids: Vec<PhaseId> = t.phases.iter().map(|p| p.id).collect();
    assert_eq!(
        ids,
        vec![
            PhaseId::PlanningPermitting,
            PhaseId::SitePreparation,
            PhaseId::Foundation,
            PhaseId::Structure,
            PhaseId::Finishing,
            PhaseId::Handover,
        ]
    );
    assert_eq!(t.critical_path, ids);
    assert!(t.phases[0].dependencies.is_empty());
    for pair in t.phases.windows(2) {
        assert_eq!(pair[1].dependencies, vec![pair[0].id]);
    }
    assert_well_formed(&t);
}

#[test]
fn phase_costs_follow_weights() {
    let results = apartment_results();
    let t = generate(Some(&results), 24);

    assert_eq!(t.total_cost, results.total_project_cost);
    let structure = t.phases.iter().find(|p| p.id == PhaseId::Structure).unwrap();
    assert!((structure.cost - results.total_project_cost * 0.35).abs() < 1e-6);
    let phase_total: f64 = t.phases.iter().map(|p| p.cost).sum();
    assert!((phase_total - results.total_project_cost).abs() < 1e-6);
    assert!(structure.labor_units > 0);
}

#[test]
fn every_duration_is_well_formed() {
    let results = apartment_results();
    for months in 0..=60 {
        let t = generate(Some(&results), months);
        if months == 0 {
            assert!(t.monthly_breakdown.is_empty());
            assert!(t.phases.iter().all(|p| p.duration_months == 0));
            continue;
        }
        assert_well_formed(&t);
    }
}

#[test]
fn short_schedule_books_zero_length_phases_somewhere() {
    let results = apartment_results();
    let t = generate(Some(&results), 3);

    assert!(t.phases.iter().any(|p| p.duration_months == 0));
    assert_well_formed(&t);
}

#[test]
fn cumulative_cost_ends_at_total() {
    let results = apartment_results();
    let t = generate(Some(&results), 18);

    let last = t.monthly_breakdown.last().unwrap();
    assert_eq!(last.month, 18);
    assert!((last.cumulative - results.total_project_cost).abs() < 1e-6);
    for pair in t.monthly_breakdown.windows(2) {
        assert!(pair[1].cumulative >= pair[0].cumulative);
    }
}

#[test]
fn blank_project_still_gets_a_schedule() {
    let t = generate(None, 12);

    assert_eq!(t.phases.len(), 6);
    assert_eq!(t.total_cost, 0.0);
    assert!(t.phases.iter().all(|p| p.cost == 0.0 && p.labor_units == 0));
    assert_well_formed(&t);
}

#[test]
fn custom_settings_change_the_split() {
    let mut settings = TimelineSettings::default();
    settings.phases.truncate(2);
    settings.phases[0].duration_share = 1.0;
    settings.phases[1].duration_share = 3.0;

    let results = apartment_results();
    let t = generate_with(Some(&results), 12, &settings);

    assert_eq!(t.phases.len(), 2);
    assert_eq!(t.phases[0].duration_months, 3);
    assert_eq!(t.phases[1].duration_months, 9);
    assert_well_formed(&t);
}
