//! Row source port trait.

use crate::domain::error::PesowatchError;
use crate::domain::observation::{DepositRate, FxQuote, NavRow, Observation};

/// Supplies raw rows. Implementations return rows ascending by date.
pub trait DataPort {
    /// NAV rows for the given instruments; an empty slice means all of them.
    fn fetch_nav_rows(&self, instruments: &[String]) -> Result<Vec<NavRow>, PesowatchError>;

    fn fetch_fx_quotes(&self) -> Result<Vec<FxQuote>, PesowatchError>;

    /// Monthly inflation in percent, one observation per month.
    fn fetch_monthly_inflation(&self) -> Result<Vec<Observation>, PesowatchError>;

    /// Default implementation: no deposit quotes available.
    fn fetch_deposit_rates(&self) -> Result<Vec<DepositRate>, PesowatchError> {
        Ok(Vec::new())
    }

    fn list_instruments(&self) -> Result<Vec<String>, PesowatchError>;
}
