//! Daily cumulative inflation index built from monthly percentages.

use crate::domain::calendar::{MonthKey, daily_calendar};
use crate::domain::observation::Observation;
use crate::domain::settings::EngineSettings;
use std::collections::BTreeMap;

/// Monthly percentages keyed by calendar month. Later observations of the same
/// month replace earlier ones. Values that cannot compound (non-finite, or a
/// drop of 100% or more) are skipped.
fn monthly_lookup(monthly: &[Observation]) -> BTreeMap<MonthKey, f64> {
    let mut sorted: Vec<&Observation> = monthly
        .iter()
        .filter(|o| {
            let usable = o.value.is_finite() && o.value > -100.0;
            if !usable {
                log::warn!("skipping monthly inflation {} for {}", o.value, o.date);
            }
            usable
        })
        .collect();
    sorted.sort_by_key(|o| o.date);

    let mut lookup = BTreeMap::new();
    for obs in sorted {
        lookup.insert(MonthKey::of(obs.date), obs.value);
    }
    lookup
}

/// Builds the daily cumulative inflation index over `[start, end]`.
///
/// Each day takes the percentage of its month, or of the latest earlier month
/// when its own is missing, or `settings.default_monthly_inflation` when no
/// earlier month exists. The monthly rate is spread over a fixed
/// `settings.inflation_days_per_month` days and compounded from 1.0, so the
/// first day's value is its own daily factor.
pub fn build_daily_index(
    monthly: &[Observation],
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    settings: &EngineSettings,
) -> Vec<Observation> {
    let lookup = monthly_lookup(monthly);
    let exponent = 1.0 / settings.inflation_days_per_month;

    let mut level = 1.0;
    daily_calendar(start, end)
        .into_iter()
        .map(|day| {
            let pct = lookup
                .range(..=MonthKey::of(day))
                .next_back()
                .map(|(_, pct)| *pct)
                .unwrap_or(settings.default_monthly_inflation);
            level *= (1.0 + pct / 100.0).powf(exponent);
            Observation::new(day, level)
        })
        .collect()
}
