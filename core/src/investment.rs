//! Investment returns: financing cost, revenue, profit, ROI/IRR,
//! payback, affordability gap and sensitivity for one scenario.
//!
//! Pure. The only iterative step is the IRR solver, which is capped at
//! `IRR_MAX_ITERATIONS` and falls back to 0 % instead of failing.

use crate::{
    results_calculator::{ScenarioResults, UnitCounts},
    types::ratio_or_zero,
};
use serde::{Deserialize, Serialize};

pub const IRR_MAX_ITERATIONS: u32 = 200;
pub const IRR_TOLERANCE: f64 = 1e-7;
/// Monthly-rate bracket searched by the IRR solver.
const IRR_LOWER_BOUND: f64 = -0.5;
const IRR_UPPER_BOUND: f64 = 1.0;
/// Longest build-out or sell-down modeled, months. Caps the cash-flow
/// vector the IRR solver walks on every iteration.
pub const MAX_PHASE_MONTHS: u32 = 300;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    #[default]
    Conventional,
    Construction,
    Government,
    Bridge,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FinancingTerms {
    #[serde(default)]
    pub loan_type: LoanType,
    /// Defaults to the project cost not covered by the down payment.
    #[serde(default)]
    pub loan_amount: Option<f64>,
    /// Annual, percent.
    pub annual_interest_rate: f64,
    pub term_months: u32,
    pub down_payment_percentage: f64,
}

/// Sale price per unit, by unit type.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct UnitPricing {
    #[serde(default)]
    pub one_bedroom: f64,
    #[serde(default)]
    pub two_bedroom: f64,
    #[serde(default)]
    pub three_bedroom: f64,
    #[serde(default)]
    pub single_family: f64,
}

impl UnitPricing {
    fn gross_sales(&self, counts: &UnitCounts) -> f64 {
        self.one_bedroom * counts.one_bedroom as f64
            + self.two_bedroom * counts.two_bedroom as f64
            + self.three_bedroom * counts.three_bedroom as f64
            + self.single_family * counts.single_family as f64
    }
}

/// Who the units must be affordable to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AffordabilityTarget {
    pub target_annual_income: f64,
    /// Share of income that may go to housing, percent.
    #[serde(default = "default_housing_cost_ratio")]
    pub housing_cost_ratio: f64,
    /// Buyer mortgage rate, annual percent.
    pub mortgage_rate: f64,
    pub mortgage_term_years: u32,
}

fn default_housing_cost_ratio() -> f64 { 30.0 }

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InvestmentScenario {
    pub financing: FinancingTerms,
    pub pricing: UnitPricing,
    /// Share of units sold or leased, percent.
    pub occupancy_rate: f64,
    #[serde(default = "default_soft_cost_percentage")]
    pub soft_cost_percentage: f64,
    #[serde(default)]
    pub marketing_budget: f64,
    pub construction_months: u32,
    pub sales_months: u32,
    pub affordability: AffordabilityTarget,
}

fn default_soft_cost_percentage() -> f64 { 15.0 }

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LoanSummary {
    pub loan_type: LoanType,
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariant {
    ConstructionCostPlus10,
    ConstructionCostMinus10,
    Occupancy85,
    Occupancy100,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensitivityCase {
    pub variant: SensitivityVariant,
    pub net_profit: f64,
    pub roi_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestmentResults {
    pub loan: LoanSummary,
    // Revenue
    pub revenue: f64,
    pub market_price_per_unit: f64,
    // Expenses
    pub hard_costs: f64,
    pub soft_costs: f64,
    pub marketing_costs: f64,
    pub interest_expense: f64,
    /// Hard + soft + marketing; the ROI denominator. Not `ScenarioResults::total_project_cost`.
    pub total_project_cost: f64,
    pub total_expenses: f64,
    // Bottom line
    pub net_profit: f64,
    pub roi_percentage: f64,
    pub profit_margin_percentage: f64,
    pub irr_percentage: f64,
    pub payback_month: Option<u32>,
    pub break_even_occupancy: Option<f64>,
    // Affordability
    pub affordable_price: f64,
    pub affordability_gap: f64,
    pub subsidy_required: f64,
    pub monthly_cash_flows: Vec<f64>,
    pub sensitivity: Vec<SensitivityCase>,
}

/// Standard annuity payment. Zero interest gives `principal / n`;
/// a zero term gives 0.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return 0.0;
    }
    let n = term_months as f64;
    let r = annual_rate_pct / 12.0 / 100.0;
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Present value of `payment` per month for `term_months` at an annual rate.
pub fn present_value(payment: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    let n = term_months as f64;
    let r = annual_rate_pct / 12.0 / 100.0;
    if r == 0.0 {
        payment * n
    } else {
        payment * (1.0 - (1.0 + r).powf(-n)) / r
    }
}

fn npv(monthly_rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + monthly_rate).powi(t as i32))
        .sum()
}

/// Monthly IRR by bisection. `None` when the series has no sign change
/// or the bracket holds no root.
pub fn monthly_irr(cash_flows: &[f64]) -> Option<f64> {
    let has_outflow = cash_flows.iter().any(|cf| *cf < 0.0);
    let has_inflow = cash_flows.iter().any(|cf| *cf > 0.0);
    if !(has_outflow && has_inflow) {
        return None;
    }

    let mut low = IRR_LOWER_BOUND;
    let mut high = IRR_UPPER_BOUND;
    let mut npv_low = npv(low, cash_flows);
    let npv_high = npv(high, cash_flows);
    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..IRR_MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(mid, cash_flows);
        if npv_mid.abs() < IRR_TOLERANCE || (high - low) / 2.0 < IRR_TOLERANCE {
            return Some(mid);
        }
        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }
    None
}

/// Annualized IRR in percent; 0 when the solver finds no root.
pub fn annual_irr_percentage(cash_flows: &[f64]) -> f64 {
    match monthly_irr(cash_flows) {
        Some(r) => ((1.0 + r).powi(12) - 1.0) * 100.0,
        None => {
            log::warn!(
                "IRR did not converge over {} monthly cash flows; reporting 0%",
                cash_flows.len()
            );
            0.0
        }
    }
}

/// First 1-based month whose cumulative cash flow is non-negative.
pub fn payback_month(cash_flows: &[f64]) -> Option<u32> {
    let mut cumulative = 0.0;
    for (i, cf) in cash_flows.iter().enumerate() {
        cumulative += cf;
        if cumulative >= 0.0 {
            return Some(i as u32 + 1);
        }
    }
    None
}

/// Everything the full model derives for one set of knobs.
struct ModelRun {
    loan: LoanSummary,
    revenue: f64,
    hard_costs: f64,
    soft_costs: f64,
    total_project_cost: f64,
    total_expenses: f64,
    net_profit: f64,
    roi_percentage: f64,
    cash_flows: Vec<f64>,
}

fn run_model(
    investment: &InvestmentScenario,
    results: &ScenarioResults,
    cost_multiplier: f64,
    occupancy_rate: f64,
) -> ModelRun {
    let hard_costs = (results.construction_cost + results.infrastructure_cost) * cost_multiplier;
    let soft_costs = hard_costs * investment.soft_cost_percentage / 100.0;
    let marketing = investment.marketing_budget;
    let total_project_cost = hard_costs + soft_costs + marketing;

    let financing = &investment.financing;
    let loan_amount = financing.loan_amount.unwrap_or_else(|| {
        total_project_cost * (1.0 - financing.down_payment_percentage / 100.0)
    }).max(0.0);
    let payment = monthly_payment(loan_amount, financing.annual_interest_rate, financing.term_months);
    let total_interest = (payment * financing.term_months as f64 - loan_amount).max(0.0);

    let revenue = investment.pricing.gross_sales(&results.unit_counts) * occupancy_rate / 100.0;
    let total_expenses = total_project_cost + total_interest;
    let net_profit = revenue - total_expenses;

    // Build-out then sell-down; interest accrues across both.
    let construction_months = investment.construction_months.clamp(1, MAX_PHASE_MONTHS) as usize;
    let sales_months = investment.sales_months.clamp(1, MAX_PHASE_MONTHS) as usize;
    let horizon = construction_months + sales_months;
    let interest_per_month = total_interest / horizon as f64;
    let build_outflow = (hard_costs + soft_costs) / construction_months as f64;
    let sales_inflow = (revenue - marketing) / sales_months as f64;
    let cash_flows = (0..horizon)
        .map(|m| {
            let operating = if m < construction_months { -build_outflow } else { sales_inflow };
            operating - interest_per_month
        })
        .collect();

    ModelRun {
        loan: LoanSummary {
            loan_type: financing.loan_type,
            loan_amount,
            monthly_payment: payment,
            total_interest,
        },
        revenue,
        hard_costs,
        soft_costs,
        total_project_cost,
        total_expenses,
        net_profit,
        roi_percentage: ratio_or_zero(net_profit, total_project_cost) * 100.0,
        cash_flows,
    }
}

/// Evaluate an investment scenario against a scenario's results.
pub fn evaluate(investment: &InvestmentScenario, results: &ScenarioResults) -> InvestmentResults {
    let base = run_model(investment, results, 1.0, investment.occupancy_rate);

    let sensitivity = [
        (SensitivityVariant::ConstructionCostPlus10, 1.10, investment.occupancy_rate),
        (SensitivityVariant::ConstructionCostMinus10, 0.90, investment.occupancy_rate),
        (SensitivityVariant::Occupancy85, 1.0, 85.0),
        (SensitivityVariant::Occupancy100, 1.0, 100.0),
    ]
    .into_iter()
    .map(|(variant, cost_multiplier, occupancy)| {
        let run = run_model(investment, results, cost_multiplier, occupancy);
        SensitivityCase {
            variant,
            net_profit: run.net_profit,
            roi_percentage: run.roi_percentage,
        }
    })
    .collect();

    let gross_sales = investment.pricing.gross_sales(&results.unit_counts);
    let market_price_per_unit = ratio_or_zero(gross_sales, results.total_units as f64);
    let break_even_occupancy = if gross_sales > 0.0 {
        Some(base.total_expenses / gross_sales * 100.0)
    } else {
        None
    };

    let target = &investment.affordability;
    let monthly_budget = target.target_annual_income * target.housing_cost_ratio / 100.0 / 12.0;
    let affordable_price = present_value(
        monthly_budget,
        target.mortgage_rate,
        target.mortgage_term_years.saturating_mul(12),
    );
    let affordability_gap = market_price_per_unit - affordable_price;
    let subsidy_required = affordability_gap.max(0.0) * results.total_units as f64;

    let irr_percentage = annual_irr_percentage(&base.cash_flows);
    let payback = payback_month(&base.cash_flows);

    log::debug!(
        "Investment: revenue={:.0} expenses={:.0} profit={:.0} ROI={:.1}% IRR={:.1}% payback={:?}",
        base.revenue,
        base.total_expenses,
        base.net_profit,
        base.roi_percentage,
        irr_percentage,
        payback
    );

    InvestmentResults {
        loan: base.loan,
        revenue: base.revenue,
        market_price_per_unit,
        hard_costs: base.hard_costs,
        soft_costs: base.soft_costs,
        marketing_costs: investment.marketing_budget,
        interest_expense: base.loan.total_interest,
        total_project_cost: base.total_project_cost,
        total_expenses: base.total_expenses,
        net_profit: base.net_profit,
        roi_percentage: base.roi_percentage,
        profit_margin_percentage: ratio_or_zero(base.net_profit, base.revenue) * 100.0,
        irr_percentage,
        payback_month: payback,
        break_even_occupancy,
        affordable_price,
        affordability_gap,
        subsidy_required,
        monthly_cash_flows: base.cash_flows,
        sensitivity,
    }
}
