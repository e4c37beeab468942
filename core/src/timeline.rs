//! Construction phasing: a sequential phase schedule and the monthly
//! cost outflow it implies.
//!
//! Phases are half-open month ranges `[start_month, end_month)`, laid end
//! to end, so `phase[i].end_month == phase[i + 1].start_month` and the
//! durations sum to the requested total.

use crate::results_calculator::ScenarioResults;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    PlanningPermitting,
    SitePreparation,
    Foundation,
    Structure,
    Finishing,
    Handover,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseTemplate {
    pub id: PhaseId,
    pub name: String,
    pub milestone: String,
    /// Fraction of total duration.
    pub duration_share: f64,
    /// Fraction of total cost.
    pub cost_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineSettings {
    pub phases: Vec<PhaseTemplate>,
    /// Fraction of a phase's cost spent on labor.
    pub labor_cost_share: f64,
    /// Cost of one worker for one month.
    pub monthly_labor_cost: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        let phase = |id, name: &str, milestone: &str, duration_share, cost_weight| PhaseTemplate {
            id,
            name: name.into(),
            milestone: milestone.into(),
            duration_share,
            cost_weight,
        };
        Self {
            phases: vec![
                phase(PhaseId::PlanningPermitting, "Planning & Permitting", "Building permit issued", 0.10, 0.05),
                phase(PhaseId::SitePreparation, "Site Preparation", "Site cleared and serviced", 0.10, 0.10),
                phase(PhaseId::Foundation, "Foundation", "Foundations poured", 0.15, 0.15),
                phase(PhaseId::Structure, "Structure", "Structure topped out", 0.30, 0.35),
                phase(PhaseId::Finishing, "Finishing", "Units fitted out", 0.25, 0.30),
                phase(PhaseId::Handover, "Handover", "Occupancy certificate", 0.10, 0.05),
            ],
            labor_cost_share: 0.35,
            monthly_labor_cost: 4_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstructionPhase {
    pub id: PhaseId,
    pub name: String,
    pub start_month: u32,
    pub end_month: u32,
    pub duration_months: u32,
    pub cost: f64,
    /// Worker-months.
    pub labor_units: u32,
    pub milestone: String,
    pub dependencies: Vec<PhaseId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonthlyCost {
    /// 1-based.
    pub month: u32,
    pub amount: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectTimeline {
    pub total_duration_months: u32,
    pub total_cost: f64,
    pub phases: Vec<ConstructionPhase>,
    pub monthly_breakdown: Vec<MonthlyCost>,
    pub critical_path: Vec<PhaseId>,
}

/// Generate with the standard six phases.
pub fn generate(results: Option<&ScenarioResults>, total_duration_months: u32) -> ProjectTimeline {
    generate_with(results, total_duration_months, &TimelineSettings::default())
}

/// Generate a timeline. With no results the schedule is produced with
/// zero cost (a blank project).
pub fn generate_with(
    results: Option<&ScenarioResults>,
    total_duration_months: u32,
    settings: &TimelineSettings,
) -> ProjectTimeline {
    let total_cost = results.map(|r| r.total_project_cost).unwrap_or(0.0);
    let total_share: f64 = settings.phases.iter().map(|p| p.duration_share).sum();
    let total_weight: f64 = settings.phases.iter().map(|p| p.cost_weight).sum();

    let mut phases = Vec::with_capacity(settings.phases.len());
    let mut cumulative_share = 0.0;
    let mut start_month = 0u32;
    let mut previous: Option<PhaseId> = None;

    for (i, template) in settings.phases.iter().enumerate() {
        cumulative_share += template.duration_share;
        // Boundaries round from the cumulative share; the last is pinned.
        let end_month = if i + 1 == settings.phases.len() {
            total_duration_months
        } else if total_share > 0.0 {
            let boundary = (cumulative_share / total_share * total_duration_months as f64).round();
            (boundary as u32).clamp(start_month, total_duration_months)
        } else {
            start_month
        };

        let cost = if total_weight > 0.0 {
            total_cost * template.cost_weight / total_weight
        } else {
            0.0
        };
        let labor_units = if settings.monthly_labor_cost > 0.0 {
            (cost * settings.labor_cost_share / settings.monthly_labor_cost).round() as u32
        } else {
            0
        };

        phases.push(ConstructionPhase {
            id: template.id,
            name: template.name.clone(),
            start_month,
            end_month,
            duration_months: end_month - start_month,
            cost,
            labor_units,
            milestone: template.milestone.clone(),
            dependencies: previous.into_iter().collect(),
        });

        previous = Some(template.id);
        start_month = end_month;
    }

    let monthly_breakdown = monthly_breakdown(&phases, total_duration_months);
    // Strictly sequential: every phase has zero slack.
    let critical_path = phases.iter().map(|p| p.id).collect();

    ProjectTimeline {
        total_duration_months,
        total_cost,
        phases,
        monthly_breakdown,
        critical_path,
    }
}

fn monthly_breakdown(phases: &[ConstructionPhase], total_months: u32) -> Vec<MonthlyCost> {
    if total_months == 0 {
        return Vec::new();
    }
    let mut amounts = vec![0.0; total_months as usize];
    for phase in phases {
        if phase.duration_months == 0 {
            let month = phase.start_month.min(total_months - 1) as usize;
            amounts[month] += phase.cost;
            continue;
        }
        let per_month = phase.cost / phase.duration_months as f64;
        for month in phase.start_month..phase.end_month {
            amounts[month as usize] += per_month;
        }
    }

    let mut cumulative = 0.0;
    amounts
        .into_iter()
        .enumerate()
        .map(|(i, amount)| {
            cumulative += amount;
            MonthlyCost {
                month: i as u32 + 1,
                amount,
                cumulative,
            }
        })
        .collect()
}
