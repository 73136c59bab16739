//! Raw row types handed over by the row source.

use chrono::NaiveDate;

/// A single `(date, value)` point of one instrument or category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// One money-market fund row: unit value (VCP) and quoted nominal annual rate.
#[derive(Debug, Clone, PartialEq)]
pub struct NavRow {
    pub date: NaiveDate,
    pub instrument: String,
    pub nav: Option<f64>,
    pub tna: Option<f64>,
}

/// One dollar quote tick for an FX channel (Oficial, Blue, MEP, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct FxQuote {
    pub date: NaiveDate,
    pub fx_type: String,
    pub buy: Option<f64>,
    pub sell: f64,
}

impl FxQuote {
    /// sell - buy, when the buy side is known.
    pub fn spread(&self) -> Option<f64> {
        self.buy.map(|buy| self.sell - buy)
    }

    /// (buy + sell) / 2, when the buy side is known.
    pub fn midpoint(&self) -> Option<f64> {
        self.buy.map(|buy| (buy + self.sell) / 2.0)
    }
}

/// Fixed-term deposit rates quoted by a bank on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRate {
    pub date: NaiveDate,
    pub bank: String,
    pub tna_clients: f64,
    pub tna_non_clients: f64,
}

/// Extracts the NAV points of one instrument, ascending by date.
pub fn nav_series(rows: &[NavRow], instrument: &str) -> Vec<Observation> {
    let mut points: Vec<Observation> = rows
        .iter()
        .filter(|r| r.instrument == instrument)
        .filter_map(|r| r.nav.map(|nav| Observation::new(r.date, nav)))
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Latest quote per bank, in order of first appearance.
pub fn latest_deposit_rates(rates: &[DepositRate]) -> Vec<DepositRate> {
    let mut latest: Vec<DepositRate> = Vec::new();
    for rate in rates {
        match latest.iter_mut().find(|r| r.bank == rate.bank) {
            Some(existing) if rate.date >= existing.date => *existing = rate.clone(),
            Some(_) => {}
            None => latest.push(rate.clone()),
        }
    }
    latest
}
