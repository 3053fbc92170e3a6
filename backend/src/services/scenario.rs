//! What-if scenarios and procurement recommendations.
//!
//! Scenarios are a fixed registry of five perturbation profiles. Each one
//! scales demand by a multiplier and shifts risk by an additive adjustment,
//! both selected by a [`Severity`] tier.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::safe_window::find_longest_safe_window;
use crate::error::{CoreError, CoreResult, Diagnostic, ErrorContext, Outcome};
use crate::models::prediction::mean;
use crate::models::SafeWindow;

/// Multiplier applied to in-window demand to size the suggested order.
pub const SAFETY_BUFFER: f64 = 1.10;

/// Severity tier of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// Values for each severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tiered {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Tiered {
    const fn new(low: f64, medium: f64, high: f64) -> Self {
        Self { low, medium, high }
    }

    pub fn get(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }
}

/// A named perturbation profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub demand_multiplier: Tiered,
    pub risk_adjustment: Tiered,
}

static SCENARIOS: [Scenario; 5] = [
    Scenario {
        id: "festival_spike",
        name: "Festival Demand Spike",
        description: "Increased demand during festival season",
        demand_multiplier: Tiered::new(1.2, 1.5, 2.0),
        risk_adjustment: Tiered::new(0.05, 0.1, 0.15),
    },
    Scenario {
        id: "bad_weather",
        name: "Bad Weather Conditions",
        description: "Heavy rainfall or extreme temperatures",
        demand_multiplier: Tiered::new(0.95, 0.85, 0.7),
        risk_adjustment: Tiered::new(0.1, 0.2, 0.35),
    },
    Scenario {
        id: "logistics_delay",
        name: "Logistics Delay",
        description: "Supply chain disruption or delivery delays",
        demand_multiplier: Tiered::new(1.0, 1.0, 1.0),
        risk_adjustment: Tiered::new(0.15, 0.3, 0.5),
    },
    Scenario {
        id: "promotion",
        name: "Promotional Campaign",
        description: "Marketing promotion or discount offer",
        demand_multiplier: Tiered::new(1.3, 1.6, 2.2),
        risk_adjustment: Tiered::new(0.0, 0.05, 0.1),
    },
    Scenario {
        id: "competitor_action",
        name: "Competitor Action",
        description: "Competitor launches similar product or promotion",
        demand_multiplier: Tiered::new(0.9, 0.75, 0.6),
        risk_adjustment: Tiered::new(0.05, 0.1, 0.15),
    },
];

/// Every registered scenario, in registry order.
pub fn scenarios() -> &'static [Scenario] {
    &SCENARIOS
}

pub fn find_scenario(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

/// Scenario id → display name.
pub fn get_available_scenarios() -> BTreeMap<&'static str, &'static str> {
    SCENARIOS.iter().map(|s| (s.id, s.name)).collect()
}

fn resolve(scenario_id: &str, severity: &str) -> Result<(&'static Scenario, Severity), Diagnostic> {
    let unknown = || Diagnostic::UnknownScenario {
        scenario_id: scenario_id.to_string(),
        severity: severity.to_string(),
    };
    let scenario = find_scenario(scenario_id).ok_or_else(unknown)?;
    let severity = severity.parse::<Severity>().map_err(|_| unknown())?;
    Ok((scenario, severity))
}

/// Demand and risk after a scenario is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedSeries {
    pub demand: Vec<f64>,
    pub risk: Vec<f64>,
}

/// Apply a scenario to baseline demand and risk.
///
/// Demand is multiplied; risk is shifted and clamped into `[0, 1]`. An
/// unknown scenario or severity returns the inputs unchanged with an
/// `UnknownScenario` diagnostic.
///
/// # Errors
///
/// `InvalidInput` when `demand` and `risk` differ in length.
pub fn apply_scenario(
    demand: &[f64],
    risk: &[f64],
    scenario_id: &str,
    severity: &str,
) -> CoreResult<Outcome<AdjustedSeries>> {
    if demand.len() != risk.len() {
        return Err(CoreError::invalid_input_with_context(
            format!("{} demand values but {} risk values", demand.len(), risk.len()),
            ErrorContext::new("apply_scenario").with_entity(scenario_id),
        ));
    }

    let (scenario, severity) = match resolve(scenario_id, severity) {
        Ok(found) => found,
        Err(diagnostic) => {
            warn!("{}; leaving series unchanged", diagnostic);
            return Ok(Outcome::degraded(
                AdjustedSeries {
                    demand: demand.to_vec(),
                    risk: risk.to_vec(),
                },
                diagnostic,
            ));
        }
    };

    let multiplier = scenario.demand_multiplier.get(severity);
    let adjustment = scenario.risk_adjustment.get(severity);
    debug!(
        "Applying {} ({}): demand x{}, risk {:+}",
        scenario.id, severity, multiplier, adjustment
    );

    Ok(Outcome::ok(AdjustedSeries {
        demand: demand.iter().map(|d| d * multiplier).collect(),
        risk: risk
            .iter()
            .map(|r| (r + adjustment).clamp(0.0, 1.0))
            .collect(),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandOutlook {
    SignificantIncrease,
    ModerateIncrease,
    Stable,
    ModerateDecrease,
    SignificantDecrease,
}

impl DemandOutlook {
    pub fn from_change_pct(pct: f64) -> Self {
        if pct > 20.0 {
            DemandOutlook::SignificantIncrease
        } else if pct > 0.0 {
            DemandOutlook::ModerateIncrease
        } else if pct < -20.0 {
            DemandOutlook::SignificantDecrease
        } else if pct < 0.0 {
            DemandOutlook::ModerateDecrease
        } else {
            DemandOutlook::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DemandOutlook::SignificantIncrease => "Significant demand increase",
            DemandOutlook::ModerateIncrease => "Moderate demand increase",
            DemandOutlook::Stable => "Demand remains stable",
            DemandOutlook::ModerateDecrease => "Moderate demand decrease",
            DemandOutlook::SignificantDecrease => "Significant demand decrease",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskOutlook {
    VeryHigh,
    Elevated,
    SlightlyIncreased,
    Unchanged,
}

impl RiskOutlook {
    pub fn from_change_points(points: f64) -> Self {
        if points > 30.0 {
            RiskOutlook::VeryHigh
        } else if points > 15.0 {
            RiskOutlook::Elevated
        } else if points > 0.0 {
            RiskOutlook::SlightlyIncreased
        } else {
            RiskOutlook::Unchanged
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskOutlook::VeryHigh => "Very high supply risk",
            RiskOutlook::Elevated => "Elevated supply risk",
            RiskOutlook::SlightlyIncreased => "Slightly increased risk",
            RiskOutlook::Unchanged => "Risk level unchanged",
        }
    }
}

/// Structured summary of what a scenario does at a severity tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioImpact {
    pub scenario_id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub demand_multiplier: f64,
    pub risk_adjustment: f64,
    pub demand_change_pct: f64,
    pub risk_change_points: f64,
    pub demand_outlook: DemandOutlook,
    pub risk_outlook: RiskOutlook,
}

/// Describe a scenario, or report it as unknown.
pub fn get_scenario_description(
    scenario_id: &str,
    severity: &str,
) -> Result<ScenarioImpact, Diagnostic> {
    let (scenario, severity) = resolve(scenario_id, severity)?;
    let demand_multiplier = scenario.demand_multiplier.get(severity);
    let risk_adjustment = scenario.risk_adjustment.get(severity);
    let demand_change_pct = round2((demand_multiplier - 1.0) * 100.0);
    let risk_change_points = round2(risk_adjustment * 100.0);

    Ok(ScenarioImpact {
        scenario_id: scenario.id,
        name: scenario.name,
        description: scenario.description,
        severity,
        demand_multiplier,
        risk_adjustment,
        demand_change_pct,
        risk_change_points,
        demand_outlook: DemandOutlook::from_change_pct(demand_change_pct),
        risk_outlook: RiskOutlook::from_change_points(risk_change_points),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Procurement advice derived from demand and risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// A safe window exists; order inside it.
    Procure {
        window: SafeWindow,
        mean_demand_in_window: f64,
        suggested_order_quantity: f64,
        summary: String,
        actions: Vec<String>,
    },
    /// No day is below the threshold.
    HighAlert {
        mean_demand: f64,
        mean_risk: f64,
        peak_risk: f64,
        summary: String,
        actions: Vec<String>,
    },
}

impl Recommendation {
    pub fn window(&self) -> Option<&SafeWindow> {
        match self {
            Recommendation::Procure { window, .. } => Some(window),
            Recommendation::HighAlert { .. } => None,
        }
    }

    pub fn actions(&self) -> &[String] {
        match self {
            Recommendation::Procure { actions, .. } | Recommendation::HighAlert { actions, .. } => {
                actions
            }
        }
    }
}

/// Recommend a procurement plan for (possibly scenario-adjusted) series.
///
/// # Errors
///
/// `InvalidInput` when the three series differ in length or the threshold is
/// outside `(0, 1)`.
pub fn recommend(
    demand: &[f64],
    risk: &[f64],
    dates: &[NaiveDate],
    threshold: f64,
) -> CoreResult<Recommendation> {
    if demand.len() != dates.len() {
        return Err(CoreError::invalid_input_with_context(
            format!("{} demand values but {} dates", demand.len(), dates.len()),
            ErrorContext::new("recommend").with_entity("demand"),
        ));
    }
    if risk.len() != dates.len() {
        return Err(CoreError::invalid_input_with_context(
            format!("{} risk values but {} dates", risk.len(), dates.len()),
            ErrorContext::new("recommend").with_entity("risk"),
        ));
    }

    let window = find_longest_safe_window(dates, risk, threshold)
        .map_err(|e| e.with_operation("recommend"))?;
    let mean_risk = mean(risk);
    let peak_risk = risk.iter().copied().fold(0.0, f64::max);

    let recommendation = match window {
        Some(window) => {
            let in_window = &demand[window.start_index..=window.end_index];
            let mean_demand_in_window = mean(in_window);
            let suggested_order_quantity = in_window.iter().sum::<f64>() * SAFETY_BUFFER;

            let mut actions = vec![
                format!(
                    "Place orders between {} and {}",
                    window.start_date, window.end_date
                ),
                format!(
                    "Expected average demand: {:.1} units/day",
                    mean_demand_in_window
                ),
            ];
            if mean_risk > 0.5 {
                actions.push("Maintain higher safety stock due to elevated overall risk".into());
            }
            if peak_risk > 0.7 {
                actions.push("Prepare contingency plans for high-risk days".into());
            }

            Recommendation::Procure {
                summary: format!(
                    "Safe procurement window of {} days from {} to {}; suggested order {:.0} units",
                    window.length_days, window.start_date, window.end_date, suggested_order_quantity
                ),
                window,
                mean_demand_in_window,
                suggested_order_quantity,
                actions,
            }
        }
        None => Recommendation::HighAlert {
            mean_demand: mean(demand),
            mean_risk,
            peak_risk,
            summary: format!(
                "No day below risk threshold {:.2}; average risk {:.2}, peak {:.2}",
                threshold, mean_risk, peak_risk
            ),
            actions: vec![
                "Increase safety stock immediately".into(),
                "Activate backup suppliers".into(),
                "Consider postponing non-critical orders".into(),
                "Monitor the situation closely".into(),
            ],
        },
    };

    Ok(recommendation)
}
