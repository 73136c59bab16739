//! CSV file data adapter.
//!
//! Reads `nav.csv`, `fx.csv`, `inflation.csv` and, when present,
//! `deposits.csv` from one base directory. Empty cells are missing values.

use crate::domain::error::PesowatchError;
use crate::domain::observation::{DepositRate, FxQuote, NavRow, Observation};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

const NAV_FILE: &str = "nav.csv";
const FX_FILE: &str = "fx.csv";
const INFLATION_FILE: &str = "inflation.csv";
const DEPOSITS_FILE: &str = "deposits.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn read_records(&self, file: &str) -> Result<Vec<StringRecord>, PesowatchError> {
        let path = self.base_path.join(file);
        let content = fs::read_to_string(&path).map_err(|e| PesowatchError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let records = rdr
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PesowatchError::DataParse {
                reason: format!("{file}: {e}"),
            })?;
        log::debug!("read {} records from {}", records.len(), path.display());
        Ok(records)
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, name: &str, file: &str) -> Result<&'r str, PesowatchError> {
    record.get(idx).ok_or_else(|| PesowatchError::DataParse {
        reason: format!("{file}: missing {name} column"),
    })
}

fn parse_date(record: &StringRecord, file: &str) -> Result<NaiveDate, PesowatchError> {
    let raw = field(record, 0, "date", file)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| PesowatchError::DataParse {
        reason: format!("{file}: invalid date '{raw}': {e}"),
    })
}

fn parse_optional(
    record: &StringRecord,
    idx: usize,
    name: &str,
    file: &str,
) -> Result<Option<f64>, PesowatchError> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| PesowatchError::DataParse {
            reason: format!("{file}: invalid {name} value '{raw}': {e}"),
        })
}

fn parse_required(
    record: &StringRecord,
    idx: usize,
    name: &str,
    file: &str,
) -> Result<f64, PesowatchError> {
    parse_optional(record, idx, name, file)?.ok_or_else(|| PesowatchError::DataParse {
        reason: format!("{file}: missing {name} value"),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_nav_rows(&self, instruments: &[String]) -> Result<Vec<NavRow>, PesowatchError> {
        let mut rows = Vec::new();
        for record in self.read_records(NAV_FILE)? {
            let instrument = field(&record, 1, "instrument", NAV_FILE)?;
            if !instruments.is_empty() && !instruments.iter().any(|i| i == instrument) {
                continue;
            }
            rows.push(NavRow {
                date: parse_date(&record, NAV_FILE)?,
                instrument: instrument.to_string(),
                nav: parse_optional(&record, 2, "nav", NAV_FILE)?,
                tna: parse_optional(&record, 3, "tna", NAV_FILE)?,
            });
        }
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }

    fn fetch_fx_quotes(&self) -> Result<Vec<FxQuote>, PesowatchError> {
        let mut quotes = Vec::new();
        for record in self.read_records(FX_FILE)? {
            quotes.push(FxQuote {
                date: parse_date(&record, FX_FILE)?,
                fx_type: field(&record, 1, "fx_type", FX_FILE)?.to_string(),
                buy: parse_optional(&record, 2, "buy", FX_FILE)?,
                sell: parse_required(&record, 3, "sell", FX_FILE)?,
            });
        }
        quotes.sort_by_key(|q| q.date);
        Ok(quotes)
    }

    fn fetch_monthly_inflation(&self) -> Result<Vec<Observation>, PesowatchError> {
        let mut monthly = Vec::new();
        for record in self.read_records(INFLATION_FILE)? {
            monthly.push(Observation::new(
                parse_date(&record, INFLATION_FILE)?,
                parse_required(&record, 1, "value", INFLATION_FILE)?,
            ));
        }
        monthly.sort_by_key(|o| o.date);
        Ok(monthly)
    }

    fn fetch_deposit_rates(&self) -> Result<Vec<DepositRate>, PesowatchError> {
        if !self.base_path.join(DEPOSITS_FILE).exists() {
            return Ok(Vec::new());
        }
        let mut rates = Vec::new();
        for record in self.read_records(DEPOSITS_FILE)? {
            rates.push(DepositRate {
                date: parse_date(&record, DEPOSITS_FILE)?,
                bank: field(&record, 1, "bank", DEPOSITS_FILE)?.to_string(),
                tna_clients: parse_required(&record, 2, "tna_clients", DEPOSITS_FILE)?,
                tna_non_clients: parse_required(&record, 3, "tna_non_clients", DEPOSITS_FILE)?,
            });
        }
        rates.sort_by_key(|r| r.date);
        Ok(rates)
    }

    fn list_instruments(&self) -> Result<Vec<String>, PesowatchError> {
        let mut names: Vec<String> = self
            .read_records(NAV_FILE)?
            .iter()
            .filter_map(|r| r.get(1).map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}
