//! Investment returns: financing, profit, IRR, payback, affordability
//! and sensitivity.

use feasibility_core::{
    config::AssumptionCatalog,
    investment::{
        annual_irr_percentage, evaluate, monthly_irr, monthly_payment, payback_month,
        present_value, AffordabilityTarget, FinancingTerms, InvestmentScenario, LoanType,
        SensitivityVariant, UnitPricing, MAX_PHASE_MONTHS,
    },
    results_calculator::{compute_record, ScenarioResults},
    scenario::ScenarioRecord,
    types::BudgetRange,
};

/// Ten 100 m² houses at the US standard tier: 1.6M construction plus
/// 150k infrastructure.
fn ten_houses() -> ScenarioResults {
    let mut record = ScenarioRecord::single_family("p-1", "ten houses", 10);
    record.house_size = Some(100.0);
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

fn interest_free_sale() -> InvestmentScenario {
    InvestmentScenario {
        financing: FinancingTerms {
            loan_type: LoanType::Construction,
            loan_amount: None,
            annual_interest_rate: 0.0,
            term_months: 24,
            down_payment_percentage: 20.0,
        },
        pricing: UnitPricing {
            single_family: 300_000.0,
            ..UnitPricing::default()
        },
        occupancy_rate: 100.0,
        soft_cost_percentage: 15.0,
        marketing_budget: 37_500.0,
        construction_months: 12,
        sales_months: 12,
        affordability: AffordabilityTarget {
            target_annual_income: 60_000.0,
            housing_cost_ratio: 30.0,
            mortgage_rate: 0.0,
            mortgage_term_years: 30,
        },
    }
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "{what}: expected {expected}, got {actual}"
    );
}

#[test]
fn zero_rate_payment_is_principal_over_term() {
    assert_close(monthly_payment(120_000.0, 0.0, 12), 10_000.0, "P/n");
    assert_eq!(monthly_payment(120_000.0, 6.0, 0), 0.0, "zero term");
}

#[test]
fn annuity_payment_matches_textbook_value() {
    // 100 000 over 30 years at 6 %: 599.55 a month.
    let payment = monthly_payment(100_000.0, 6.0, 360);
    assert!((payment - 599.55).abs() < 0.01, "got {payment}");
    assert!((present_value(payment, 6.0, 360) - 100_000.0).abs() < 1e-6);
}

#[test]
fn base_case_profit_and_roi() {
    let r = evaluate(&interest_free_sale(), &ten_houses());

    assert_close(r.hard_costs, 1_750_000.0, "hard costs");
    assert_close(r.soft_costs, 262_500.0, "soft costs");
    assert_close(r.total_project_cost, 2_050_000.0, "project cost");
    assert_close(r.loan.loan_amount, 1_640_000.0, "80 % of project cost");
    assert_eq!(r.loan.loan_type, LoanType::Construction);
    assert_close(r.interest_expense, 0.0, "interest-free");
    assert_close(r.revenue, 3_000_000.0, "10 × 300k");
    assert_close(r.market_price_per_unit, 300_000.0, "price per unit");
    assert_close(r.net_profit, 950_000.0, "profit");
    assert_close(r.roi_percentage, 950_000.0 / 2_050_000.0 * 100.0, "ROI");
    assert_close(r.profit_margin_percentage, 950_000.0 / 3_000_000.0 * 100.0, "margin");
    assert_close(r.break_even_occupancy.unwrap(), 2_050_000.0 / 3_000_000.0 * 100.0, "break-even");
}

#[test]
fn explicit_loan_amount_accrues_interest() {
    let mut inv = interest_free_sale();
    inv.financing.loan_amount = Some(1_000_000.0);
    inv.financing.annual_interest_rate = 8.0;
    let r = evaluate(&inv, &ten_houses());

    assert_close(r.loan.loan_amount, 1_000_000.0, "explicit loan");
    let expected_interest = monthly_payment(1_000_000.0, 8.0, 24) * 24.0 - 1_000_000.0;
    assert_close(r.interest_expense, expected_interest, "interest");
    assert_close(r.total_expenses, 2_050_000.0 + expected_interest, "expenses include interest");
    assert!(r.net_profit < 950_000.0);
}

#[test]
fn cash_flows_cover_build_and_sales_months() {
    let r = evaluate(&interest_free_sale(), &ten_houses());

    assert_eq!(r.monthly_cash_flows.len(), 24);
    assert!(r.monthly_cash_flows[..12].iter().all(|cf| *cf < 0.0));
    assert!(r.monthly_cash_flows[12..].iter().all(|cf| *cf > 0.0));
    let net: f64 = r.monthly_cash_flows.iter().sum();
    assert_close(net, r.net_profit, "cash flows net to profit");
    // 2 012 500 out over a year, 246 875 back per month: even after 9 sales months.
    assert_eq!(r.payback_month, Some(21));
    assert!(r.irr_percentage > 0.0, "profitable project, IRR {}", r.irr_percentage);
}

#[test]
fn irr_falls_back_to_zero_without_sign_change() {
    let losses = vec![-1_000.0; 6];
    assert_eq!(monthly_irr(&losses), None);
    assert_eq!(annual_irr_percentage(&losses), 0.0);
    assert_eq!(annual_irr_percentage(&[]), 0.0);
}

#[test]
fn irr_recovers_known_rate() {
    // -1000 now, +1100 in one month: 10 % a month.
    let r = monthly_irr(&[-1_000.0, 1_100.0]).unwrap();
    assert!((r - 0.10).abs() < 1e-6, "got {r}");
}

#[test]
fn payback_month_is_first_non_negative_cumulative() {
    assert_eq!(payback_month(&[-100.0, -100.0, 150.0, 100.0]), Some(4));
    assert_eq!(payback_month(&[50.0]), Some(1));
    assert_eq!(payback_month(&[-100.0, 20.0, 20.0]), None);
}

#[test]
fn sensitivity_cases_move_profit_the_right_way() {
    let mut inv = interest_free_sale();
    inv.occupancy_rate = 90.0;
    let r = evaluate(&inv, &ten_houses());

    let variants: Vec<SensitivityVariant> = r.sensitivity.iter().map(|c| c.variant).collect();
    assert_eq!(
        variants,
        vec![
            SensitivityVariant::ConstructionCostPlus10,
            SensitivityVariant::ConstructionCostMinus10,
            SensitivityVariant::Occupancy85,
            SensitivityVariant::Occupancy100,
        ]
    );
    let profit = |v: SensitivityVariant| {
        r.sensitivity.iter().find(|c| c.variant == v).unwrap().net_profit
    };
    assert!(profit(SensitivityVariant::ConstructionCostPlus10) < r.net_profit);
    assert!(profit(SensitivityVariant::ConstructionCostMinus10) > r.net_profit);
    assert!(profit(SensitivityVariant::Occupancy85) < r.net_profit);
    assert!(profit(SensitivityVariant::Occupancy100) > r.net_profit);
}

#[test]
fn no_subsidy_when_buyers_can_afford_market_price() {
    let r = evaluate(&interest_free_sale(), &ten_houses());

    // 60 000 × 30 % / 12 = 1 500 a month for 360 months, interest-free.
    assert_close(r.affordable_price, 540_000.0, "affordable price");
    assert!(r.affordability_gap < 0.0);
    assert_eq!(r.subsidy_required, 0.0);
}

#[test]
fn subsidy_covers_the_gap_for_every_unit() {
    let mut inv = interest_free_sale();
    inv.affordability.target_annual_income = 24_000.0;
    let r = evaluate(&inv, &ten_houses());

    assert_close(r.affordable_price, 216_000.0, "affordable price");
    assert_close(r.affordability_gap, 84_000.0, "gap per unit");
    assert_close(r.subsidy_required, 840_000.0, "gap × 10 units");
}

#[test]
fn unpriced_units_have_no_break_even() {
    let mut inv = interest_free_sale();
    inv.pricing = UnitPricing::default();
    let r = evaluate(&inv, &ten_houses());

    assert_eq!(r.revenue, 0.0);
    assert_eq!(r.break_even_occupancy, None);
    assert_eq!(r.payback_month, None);
    assert_eq!(r.irr_percentage, 0.0);
}

#[test]
fn modeled_horizon_is_capped() {
    let mut inv = interest_free_sale();
    inv.construction_months = u32::MAX;
    inv.sales_months = u32::MAX;
    let r = evaluate(&inv, &ten_houses());

    assert_eq!(r.monthly_cash_flows.len(), 2 * MAX_PHASE_MONTHS as usize);
    let net: f64 = r.monthly_cash_flows.iter().sum();
    assert_close(net, r.net_profit, "capped cash flows still net to profit");
    assert!(r.irr_percentage.is_finite());
}

#[test]
fn endless_mortgage_term_does_not_overflow() {
    let mut inv = interest_free_sale();
    inv.affordability.mortgage_rate = 6.0;
    inv.affordability.mortgage_term_years = u32::MAX;
    let r = evaluate(&inv, &ten_houses());

    // 1 500 a month at 0.5 % approaches the perpetuity value of 300 000.
    assert!((r.affordable_price - 300_000.0).abs() < 1.0, "got {}", r.affordable_price);
}

#[test]
fn investment_total_is_the_roi_denominator() {
    let houses = ten_houses();
    let r = evaluate(&interest_free_sale(), &houses);

    assert_close(
        r.total_project_cost,
        r.hard_costs + r.soft_costs + r.marketing_costs,
        "hard + soft + marketing",
    );
    assert!((r.total_project_cost - houses.total_project_cost).abs() > 1.0);
    assert_close(r.roi_percentage, r.net_profit / r.total_project_cost * 100.0, "ROI");
}
