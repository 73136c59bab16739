#![allow(dead_code)]

use chrono::NaiveDate;
use pesowatch::domain::error::PesowatchError;
pub use pesowatch::domain::observation::{DepositRate, FxQuote, NavRow, Observation};
use pesowatch::ports::data_port::DataPort;
use std::cell::Cell;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Nav,
    Fx,
    Inflation,
    Deposits,
}

pub struct MockDataPort {
    pub nav: Vec<NavRow>,
    pub fx: Vec<FxQuote>,
    pub inflation: Vec<Observation>,
    pub deposits: Vec<DepositRate>,
    pub failing: HashSet<Source>,
    pub calls: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            nav: Vec::new(),
            fx: Vec::new(),
            inflation: Vec::new(),
            deposits: Vec::new(),
            failing: HashSet::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_nav(mut self, rows: Vec<NavRow>) -> Self {
        self.nav.extend(rows);
        self
    }

    pub fn with_fx(mut self, quotes: Vec<FxQuote>) -> Self {
        self.fx.extend(quotes);
        self
    }

    pub fn with_inflation(mut self, monthly: Vec<Observation>) -> Self {
        self.inflation.extend(monthly);
        self
    }

    pub fn with_deposits(mut self, rates: Vec<DepositRate>) -> Self {
        self.deposits.extend(rates);
        self
    }

    pub fn with_error(mut self, source: Source) -> Self {
        self.failing.insert(source);
        self
    }

    fn check(&self, source: Source) -> Result<(), PesowatchError> {
        self.calls.set(self.calls.get() + 1);
        if self.failing.contains(&source) {
            return Err(PesowatchError::DataSource {
                reason: format!("{source:?} offline"),
            });
        }
        Ok(())
    }
}

impl DataPort for MockDataPort {
    fn fetch_nav_rows(&self, instruments: &[String]) -> Result<Vec<NavRow>, PesowatchError> {
        self.check(Source::Nav)?;
        Ok(self
            .nav
            .iter()
            .filter(|r| instruments.is_empty() || instruments.contains(&r.instrument))
            .cloned()
            .collect())
    }

    fn fetch_fx_quotes(&self) -> Result<Vec<FxQuote>, PesowatchError> {
        self.check(Source::Fx)?;
        Ok(self.fx.clone())
    }

    fn fetch_monthly_inflation(&self) -> Result<Vec<Observation>, PesowatchError> {
        self.check(Source::Inflation)?;
        Ok(self.inflation.clone())
    }

    fn fetch_deposit_rates(&self) -> Result<Vec<DepositRate>, PesowatchError> {
        self.check(Source::Deposits)?;
        Ok(self.deposits.clone())
    }

    fn list_instruments(&self) -> Result<Vec<String>, PesowatchError> {
        self.check(Source::Nav)?;
        let mut names: Vec<String> = self.nav.iter().map(|r| r.instrument.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(n as u64)
}

/// Daily NAV rows growing by `daily_pct` percent per day from `start_nav`.
pub fn growing_fund(name: &str, start_nav: f64, daily_pct: f64, days: u32) -> Vec<NavRow> {
    (0..days)
        .map(|n| NavRow {
            date: day(n),
            instrument: name.to_string(),
            nav: Some(start_nav * (1.0 + daily_pct / 100.0).powi(n as i32)),
            tna: None,
        })
        .collect()
}

pub fn make_quote(n: u32, fx_type: &str, buy: f64, sell: f64) -> FxQuote {
    FxQuote {
        date: day(n),
        fx_type: fx_type.to_string(),
        buy: Some(buy),
        sell,
    }
}

pub fn monthly_inflation(pcts: &[f64]) -> Vec<Observation> {
    pcts.iter()
        .enumerate()
        .map(|(i, p)| {
            Observation::new(NaiveDate::from_ymd_opt(2024, i as u32 + 1, 1).unwrap(), *p)
        })
        .collect()
}

/// A small but complete market: two funds, two FX channels, inflation.
pub fn sample_port() -> MockDataPort {
    let mut nav = growing_fund("Ualá", 10.0, 0.12, 60);
    nav.extend(growing_fund("Mercado Pago", 20.0, 0.09, 60));
    let fx = (0..60)
        .flat_map(|n| {
            [
                make_quote(n, "Blue", 1180.0 + n as f64, 1200.0 + n as f64),
                make_quote(n, "Oficial", 840.0, 860.0 + n as f64 * 0.5),
            ]
        })
        .collect();
    MockDataPort::new()
        .with_nav(nav)
        .with_fx(fx)
        .with_inflation(monthly_inflation(&[4.0, 3.5, 3.0]))
}
