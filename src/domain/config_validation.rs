//! Configuration loading and validation.
//!
//! Every threshold has a default, so an empty `[rates]` section is valid.
//! Only `[data] path` is mandatory.

use crate::domain::consolidation::NavMetric;
use crate::domain::error::PesowatchError;
use crate::domain::projection::DEFAULT_MAX_MONTHS;
use crate::domain::settings::{DataSettings, EngineSettings};
use crate::ports::config_port::ConfigPort;

/// Upper limit for `[projection] max_months`.
pub const MAX_HORIZON_LIMIT: u32 = 1200;

/// Every `(section, key)` the engine reads.
pub const KNOWN_KEYS: &[(&str, &str)] = &[
    ("data", "path"),
    ("rates", "floor"),
    ("rates", "ceiling"),
    ("rates", "fallback"),
    ("rates", "lookback_days"),
    ("inflation", "default_monthly"),
    ("inflation", "days_per_month"),
    ("goal", "infeasible_contribution"),
    ("fx", "fallback_type"),
    ("fx", "fallback_value"),
    ("fx", "display_type"),
    ("consolidation", "metric"),
    ("consolidation", "window_days"),
    ("consolidation", "instruments"),
    ("projection", "max_months"),
    ("compare", "include_deposits"),
];

/// Keys present in the config that nothing reads, as `[section] key`.
pub fn unknown_keys(config: &dyn ConfigPort) -> Vec<String> {
    config
        .keys()
        .into_iter()
        .filter(|(section, key)| {
            !KNOWN_KEYS
                .iter()
                .any(|(s, k)| s.eq_ignore_ascii_case(section) && k.eq_ignore_ascii_case(key))
        })
        .map(|(section, key)| format!("[{section}] {key}"))
        .collect()
}

fn invalid(section: &str, key: &str, reason: &str) -> PesowatchError {
    PesowatchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

pub fn data_settings(config: &dyn ConfigPort) -> Result<DataSettings, PesowatchError> {
    let path = match config.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => p.trim().to_string(),
        _ => {
            return Err(PesowatchError::ConfigMissing {
                section: "data".to_string(),
                key: "path".to_string(),
            })
        }
    };
    Ok(DataSettings { path })
}

/// Comma-separated fund names; blanks are ignored.
fn parse_instruments(raw: Option<String>) -> Vec<String> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Reads every engine threshold, falling back to [`EngineSettings::default`], and validates the result.
pub fn build_settings(config: &dyn ConfigPort) -> Result<EngineSettings, PesowatchError> {
    let defaults = EngineSettings::default();

    let metric = match config.get_string("consolidation", "metric") {
        Some(raw) => raw
            .parse::<NavMetric>()
            .map_err(|reason| invalid("consolidation", "metric", &reason))?,
        None => defaults.metric,
    };

    let raw_max = config.get_int("projection", "max_months", DEFAULT_MAX_MONTHS as i64);
    let max_horizon_months = u32::try_from(raw_max).map_err(|_| {
        invalid(
            "projection",
            "max_months",
            &format!("max_months must be between 1 and {MAX_HORIZON_LIMIT}"),
        )
    })?;

    let settings = EngineSettings {
        rate_floor: config.get_double("rates", "floor", defaults.rate_floor),
        rate_ceiling: config.get_double("rates", "ceiling", defaults.rate_ceiling),
        rate_fallback: config.get_double("rates", "fallback", defaults.rate_fallback),
        rate_lookback_days: config.get_int("rates", "lookback_days", defaults.rate_lookback_days),
        default_monthly_inflation: config.get_double(
            "inflation",
            "default_monthly",
            defaults.default_monthly_inflation,
        ),
        inflation_days_per_month: config.get_double(
            "inflation",
            "days_per_month",
            defaults.inflation_days_per_month,
        ),
        infeasible_contribution: config.get_double(
            "goal",
            "infeasible_contribution",
            defaults.infeasible_contribution,
        ),
        fx_fallback_type: config
            .get_string("fx", "fallback_type")
            .unwrap_or(defaults.fx_fallback_type),
        fx_fallback_value: config.get_double("fx", "fallback_value", defaults.fx_fallback_value),
        fx_display_type: config
            .get_string("fx", "display_type")
            .unwrap_or(defaults.fx_display_type),
        metric,
        window_days: config.get_int("consolidation", "window_days", defaults.window_days),
        instruments: parse_instruments(config.get_string("consolidation", "instruments")),
        max_horizon_months,
    };

    validate_settings(&settings)?;
    log::debug!("engine settings: {settings:?}");
    Ok(settings)
}

pub fn validate_settings(settings: &EngineSettings) -> Result<(), PesowatchError> {
    validate_rate_bounds(settings)?;
    validate_inflation(settings)?;
    validate_goal(settings)?;
    validate_fx(settings)?;
    validate_window(settings)?;
    validate_horizon(settings)?;
    Ok(())
}

fn validate_rate_bounds(settings: &EngineSettings) -> Result<(), PesowatchError> {
    if !settings.rate_floor.is_finite() || !settings.rate_ceiling.is_finite() {
        return Err(invalid("rates", "floor", "rate bounds must be finite"));
    }
    if settings.rate_floor >= settings.rate_ceiling {
        return Err(invalid("rates", "floor", "floor must be below ceiling"));
    }
    if !settings.rate_fallback.is_finite()
        || settings.rate_fallback < settings.rate_floor
        || settings.rate_fallback > settings.rate_ceiling
    {
        return Err(invalid(
            "rates",
            "fallback",
            "fallback must lie between floor and ceiling",
        ));
    }
    if settings.rate_lookback_days < 1 {
        return Err(invalid(
            "rates",
            "lookback_days",
            "lookback_days must be at least 1",
        ));
    }
    Ok(())
}

fn validate_inflation(settings: &EngineSettings) -> Result<(), PesowatchError> {
    if !settings.default_monthly_inflation.is_finite()
        || settings.default_monthly_inflation <= -100.0
    {
        return Err(invalid(
            "inflation",
            "default_monthly",
            "default_monthly must be a finite value above -100",
        ));
    }
    if !settings.inflation_days_per_month.is_finite() || settings.inflation_days_per_month <= 0.0 {
        return Err(invalid(
            "inflation",
            "days_per_month",
            "days_per_month must be positive",
        ));
    }
    Ok(())
}

fn validate_goal(settings: &EngineSettings) -> Result<(), PesowatchError> {
    if !settings.infeasible_contribution.is_finite() || settings.infeasible_contribution <= 0.0 {
        return Err(invalid(
            "goal",
            "infeasible_contribution",
            "infeasible_contribution must be positive",
        ));
    }
    Ok(())
}

fn validate_fx(settings: &EngineSettings) -> Result<(), PesowatchError> {
    if settings.fx_fallback_type.trim().is_empty() {
        return Err(invalid("fx", "fallback_type", "fallback_type must not be empty"));
    }
    if !settings.fx_fallback_value.is_finite() || settings.fx_fallback_value <= 0.0 {
        return Err(invalid(
            "fx",
            "fallback_value",
            "fallback_value must be positive",
        ));
    }
    Ok(())
}

fn validate_window(settings: &EngineSettings) -> Result<(), PesowatchError> {
    if settings.window_days < 1 {
        return Err(invalid(
            "consolidation",
            "window_days",
            "window_days must be at least 1",
        ));
    }
    Ok(())
}

fn validate_horizon(settings: &EngineSettings) -> Result<(), PesowatchError> {
    if !(1..=MAX_HORIZON_LIMIT).contains(&settings.max_horizon_months) {
        return Err(invalid(
            "projection",
            "max_months",
            &format!("max_months must be between 1 and {MAX_HORIZON_LIMIT}"),
        ));
    }
    Ok(())
}
