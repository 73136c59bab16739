//! Business thresholds shared by the domain components.

use crate::domain::consolidation::NavMetric;
use crate::domain::projection::DEFAULT_MAX_MONTHS;

/// Tunable constants of the engine. `Default` carries the production values.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub rate_floor: f64,
    pub rate_ceiling: f64,
    pub rate_fallback: f64,
    pub rate_lookback_days: i64,
    pub default_monthly_inflation: f64,
    pub inflation_days_per_month: f64,
    pub infeasible_contribution: f64,
    pub fx_fallback_type: String,
    pub fx_fallback_value: f64,
    pub fx_display_type: String,
    pub metric: NavMetric,
    pub window_days: i64,
    /// Funds to consolidate. Empty selects every fund in the source.
    pub instruments: Vec<String>,
    pub max_horizon_months: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rate_floor: 20.0,
            rate_ceiling: 60.0,
            rate_fallback: 35.0,
            rate_lookback_days: 30,
            default_monthly_inflation: 3.0,
            inflation_days_per_month: 30.0,
            infeasible_contribution: 10_000_000.0,
            fx_fallback_type: "Blue".to_string(),
            fx_fallback_value: 1200.0,
            fx_display_type: "Blue".to_string(),
            metric: NavMetric::Price,
            window_days: 30,
            instruments: Vec::new(),
            max_horizon_months: DEFAULT_MAX_MONTHS,
        }
    }
}

/// Where the row source lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSettings {
    pub path: String,
}
