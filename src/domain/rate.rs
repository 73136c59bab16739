//! Annualized rate estimation from recent price history.

use crate::domain::error::PesowatchError;
use crate::domain::observation::Observation;
use crate::domain::settings::EngineSettings;
use crate::domain::table::ConsolidatedTable;
use chrono::{Days, NaiveDate};

/// Clamp range and fallback for estimated rates, in annual percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBounds {
    pub floor: f64,
    pub ceiling: f64,
    pub fallback: f64,
}

impl RateBounds {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            floor: settings.rate_floor,
            ceiling: settings.rate_ceiling,
            fallback: settings.rate_fallback,
        }
    }

    fn clamp(&self, rate: f64) -> f64 {
        rate.max(self.floor).min(self.ceiling)
    }
}

impl Default for RateBounds {
    fn default() -> Self {
        Self::from_settings(&EngineSettings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    TooFewPoints,
    NonFinite,
}

/// How an estimate was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateBasis {
    /// Computed from `points` observations; `raw` is the unclamped rate.
    Window { points: usize, raw: f64 },
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    pub rate: f64,
    pub basis: RateBasis,
}

impl RateEstimate {
    pub fn is_fallback(&self) -> bool {
        matches!(self.basis, RateBasis::Fallback(_))
    }

    pub fn was_clamped(&self) -> bool {
        match self.basis {
            RateBasis::Window { raw, .. } => raw != self.rate,
            RateBasis::Fallback(_) => false,
        }
    }
}

/// Estimates the annualized rate of `series` over the `lookback_days` ending at `as_of`.
///
/// The per-point growth `(last / first)^(1/n) - 1` is annualized as
/// `g * 365 * 100`, where `n` is the number of points in the window rather than
/// the number of elapsed days. The result is always clamped into `bounds`,
/// including negative and very large values.
pub fn estimate_annual_rate(
    series: &[Observation],
    as_of: NaiveDate,
    lookback_days: i64,
    bounds: &RateBounds,
) -> RateEstimate {
    let window_start = as_of
        .checked_sub_days(Days::new(lookback_days.max(0) as u64))
        .unwrap_or(NaiveDate::MIN);

    let mut window: Vec<&Observation> = series
        .iter()
        .filter(|o| o.date >= window_start && o.date <= as_of && o.value.is_finite())
        .collect();
    window.sort_by_key(|o| o.date);

    let fallback = |reason| RateEstimate {
        rate: bounds.fallback,
        basis: RateBasis::Fallback(reason),
    };

    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return fallback(FallbackReason::TooFewPoints);
    };
    let n = window.len();
    if n < 2 {
        return fallback(FallbackReason::TooFewPoints);
    }

    let growth = (last.value / first.value).powf(1.0 / n as f64) - 1.0;
    let raw = growth * 365.0 * 100.0;
    if !raw.is_finite() {
        log::warn!(
            "non-finite rate from {} points ({} -> {}), using fallback",
            n,
            first.value,
            last.value
        );
        return fallback(FallbackReason::NonFinite);
    }

    let rate = bounds.clamp(raw);
    log::debug!("estimated rate {raw:.4}% over {n} points, clamped to {rate:.4}%");
    RateEstimate {
        rate,
        basis: RateBasis::Window { points: n, raw },
    }
}

/// Estimates the rate of one column of a consolidated table, as of its last date.
pub fn estimate_for_column(
    table: &ConsolidatedTable,
    column: &str,
    settings: &EngineSettings,
) -> Result<RateEstimate, PesowatchError> {
    let series = table
        .column_series(column)
        .ok_or_else(|| PesowatchError::UnknownColumn {
            name: column.to_string(),
        })?;
    let bounds = RateBounds::from_settings(settings);

    let Some(as_of) = table.last_date() else {
        return Ok(RateEstimate {
            rate: bounds.fallback,
            basis: RateBasis::Fallback(FallbackReason::TooFewPoints),
        });
    };
    Ok(estimate_annual_rate(
        &series,
        as_of,
        settings.rate_lookback_days,
        &bounds,
    ))
}

/// Nominal annual rate implied by each NAV point relative to the previous one.
///
/// The return between two points is spread over the elapsed days and
/// compounded to 365 days. The first point, and points whose gap is not
/// positive or whose previous value is not positive, have no rate.
pub fn implied_annual_rates(points: &[Observation]) -> Vec<Option<f64>> {
    let mut rates = Vec::with_capacity(points.len());
    rates.push(None);
    for pair in points.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let days = (cur.date - prev.date).num_days();
        if days <= 0 || prev.value <= 0.0 {
            rates.push(None);
            continue;
        }
        let period_return = cur.value / prev.value - 1.0;
        let daily = (1.0 + period_return).powf(1.0 / days as f64) - 1.0;
        let tna = ((1.0 + daily).powf(365.0) - 1.0) * 100.0;
        rates.push(tna.is_finite().then_some(tna));
    }
    rates.truncate(points.len());
    rates
}
