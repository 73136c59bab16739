//! Alignment of fund NAVs, FX quotes and inflation onto one daily table.

use crate::domain::inflation::build_daily_index;
use crate::domain::observation::{FxQuote, NavRow, Observation};
use crate::domain::rate::implied_annual_rates;
use crate::domain::settings::EngineSettings;
use crate::domain::table::{Column, ConsolidatedTable, TableRow};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Which fund figure becomes the table value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMetric {
    /// Raw unit value (VCP).
    Price,
    /// Index of the quoted nominal rate accumulated daily, starting at 100.
    Rate,
}

impl FromStr for NavMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" | "vcp" => Ok(Self::Price),
            "rate" | "tna" => Ok(Self::Rate),
            other => Err(format!("unknown metric '{other}', expected price or rate")),
        }
    }
}

impl fmt::Display for NavMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Price => write!(f, "price"),
            Self::Rate => write!(f, "rate"),
        }
    }
}

/// Raw rows for one consolidation run. `None` marks a source that failed upstream.
#[derive(Debug, Clone, Copy)]
pub struct ConsolidationInput<'a> {
    pub nav: Option<&'a [NavRow]>,
    pub fx: Option<&'a [FxQuote]>,
    pub inflation: Option<&'a [Observation]>,
    pub metric: NavMetric,
}

/// A degraded-mode replacement applied while building the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    NavUnavailable,
    FxConstant { fx_type: String, value: f64 },
    InflationDefault { monthly: f64 },
    /// Deposit rates could not be read; only funds are ranked.
    DepositsUnavailable,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NavUnavailable => write!(f, "fund data unavailable"),
            Self::FxConstant { fx_type, value } => {
                write!(f, "FX quotes unavailable, constant {fx_type} at {value}")
            }
            Self::InflationDefault { monthly } => {
                write!(f, "inflation unavailable, default {monthly}% monthly")
            }
            Self::DepositsUnavailable => {
                write!(f, "fixed-term deposits unavailable, ranking funds only")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    pub table: ConsolidatedTable,
    pub substitutions: Vec<Substitution>,
}

impl Consolidation {
    pub fn is_degraded(&self) -> bool {
        !self.substitutions.is_empty()
    }
}

type DatedValues = BTreeMap<NaiveDate, f64>;

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn get(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Default)]
struct DayAggregate {
    nav: Mean,
    tna: Mean,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn group_nav_rows(rows: &[NavRow]) -> BTreeMap<String, BTreeMap<NaiveDate, DayAggregate>> {
    let mut grouped: BTreeMap<String, BTreeMap<NaiveDate, DayAggregate>> = BTreeMap::new();
    for row in rows {
        let day = grouped
            .entry(row.instrument.clone())
            .or_default()
            .entry(row.date)
            .or_default();
        if let Some(nav) = finite(row.nav) {
            day.nav.add(nav);
        }
        if let Some(tna) = finite(row.tna) {
            day.tna.add(tna);
        }
    }
    grouped
}

fn price_column(days: &BTreeMap<NaiveDate, DayAggregate>) -> DatedValues {
    days.iter()
        .filter_map(|(date, agg)| agg.nav.get().map(|nav| (*date, nav)))
        .collect()
}

/// Accumulates `1 + tna/100/365` per day and rescales so the first day is 100.
/// Days without a quoted rate use the rate implied by the NAV change, else 0.
fn rate_column(days: &BTreeMap<NaiveDate, DayAggregate>) -> DatedValues {
    let nav_points: Vec<Observation> = days
        .iter()
        .filter_map(|(date, agg)| agg.nav.get().map(|nav| Observation::new(*date, nav)))
        .collect();
    let implied: BTreeMap<NaiveDate, f64> = nav_points
        .iter()
        .zip(implied_annual_rates(&nav_points))
        .filter_map(|(obs, rate)| rate.map(|r| (obs.date, r)))
        .collect();

    let mut level = 1.0;
    let mut first = None;
    let mut column = DatedValues::new();
    for (date, agg) in days {
        let tna = agg
            .tna
            .get()
            .or_else(|| implied.get(date).copied())
            .unwrap_or(0.0);
        level *= 1.0 + tna / 100.0 / 365.0;
        let base = *first.get_or_insert(level);
        column.insert(*date, level / base * 100.0);
    }
    column
}

fn nav_columns(rows: &[NavRow], metric: NavMetric) -> Vec<(Column, DatedValues)> {
    group_nav_rows(rows)
        .into_iter()
        .filter_map(|(instrument, days)| {
            let values = match metric {
                NavMetric::Price => price_column(&days),
                NavMetric::Rate => rate_column(&days),
            };
            if values.is_empty() {
                log::debug!("instrument {instrument} has no usable values, skipped");
                return None;
            }
            Some((Column::fund(&instrument), values))
        })
        .collect()
}

fn fx_columns(quotes: &[FxQuote]) -> Vec<(Column, DatedValues)> {
    let mut grouped: BTreeMap<String, BTreeMap<NaiveDate, Mean>> = BTreeMap::new();
    for quote in quotes.iter().filter(|q| q.sell.is_finite()) {
        grouped
            .entry(quote.fx_type.clone())
            .or_default()
            .entry(quote.date)
            .or_default()
            .add(quote.sell);
    }
    grouped
        .into_iter()
        .map(|(fx_type, days)| {
            let values = days
                .into_iter()
                .filter_map(|(date, mean)| mean.get().map(|v| (date, v)))
                .collect();
            (Column::fx(&fx_type), values)
        })
        .collect()
}

/// Outer join on date, forward fill, then drop the leading rows that still have gaps.
fn join_and_fill(series: &[(Column, DatedValues)]) -> Vec<TableRow> {
    let dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|(_, values)| values.keys().copied())
        .collect();

    let mut last: Vec<Option<f64>> = vec![None; series.len()];
    let mut rows = Vec::with_capacity(dates.len());
    for date in dates {
        for (slot, (_, values)) in last.iter_mut().zip(series) {
            if let Some(v) = values.get(&date) {
                *slot = Some(*v);
            }
        }
        if let Some(values) = last.iter().copied().collect::<Option<Vec<f64>>>() {
            rows.push(TableRow { date, values });
        }
    }
    rows
}

/// Aligns every available source onto one ascending daily table.
///
/// Missing sources never fail the run: they are replaced as described by the
/// returned [`Substitution`]s.
pub fn consolidate(input: ConsolidationInput<'_>, settings: &EngineSettings) -> Consolidation {
    let mut substitutions = Vec::new();

    let mut series = match input.nav {
        Some(rows) => nav_columns(rows, input.metric),
        None => {
            log::warn!("fund data unavailable, consolidating remaining sources");
            substitutions.push(Substitution::NavUnavailable);
            Vec::new()
        }
    };
    let nav_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|(_, values)| values.keys().copied())
        .collect();

    let fx = input.fx.map(fx_columns).unwrap_or_default();
    if fx.is_empty() {
        log::warn!(
            "FX quotes unavailable, using constant {} = {}",
            settings.fx_fallback_type,
            settings.fx_fallback_value
        );
        substitutions.push(Substitution::FxConstant {
            fx_type: settings.fx_fallback_type.clone(),
            value: settings.fx_fallback_value,
        });
        let constant = nav_dates
            .iter()
            .map(|d| (*d, settings.fx_fallback_value))
            .collect();
        series.push((Column::fx(&settings.fx_fallback_type), constant));
    } else {
        series.extend(fx);
    }

    let mut rows = join_and_fill(&series);
    let mut columns: Vec<Column> = series.into_iter().map(|(column, _)| column).collect();

    let monthly: &[Observation] = match input.inflation {
        Some(monthly) if !monthly.is_empty() => monthly,
        _ => {
            log::warn!(
                "inflation unavailable, using default {}% monthly",
                settings.default_monthly_inflation
            );
            substitutions.push(Substitution::InflationDefault {
                monthly: settings.default_monthly_inflation,
            });
            &[]
        }
    };

    if let (Some(start), Some(end)) = (rows.first().map(|r| r.date), rows.last().map(|r| r.date)) {
        let index: BTreeMap<NaiveDate, f64> = build_daily_index(monthly, start, end, settings)
            .into_iter()
            .map(|o| (o.date, o.value))
            .collect();
        for row in &mut rows {
            // the index covers every calendar day in [start, end]
            let value = index.get(&row.date).copied().unwrap_or(f64::NAN);
            row.values.push(value);
        }
    }
    columns.push(Column::inflation());

    log::info!(
        "consolidated {} rows x {} columns ({} substitutions)",
        rows.len(),
        columns.len(),
        substitutions.len()
    );
    Consolidation {
        table: ConsolidatedTable::new(columns, rows),
        substitutions,
    }
}
