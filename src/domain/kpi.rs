//! Period indicators over a normalized table.

use crate::domain::error::PesowatchError;
use crate::domain::table::{ColumnKind, INFLATION_COLUMN, NormalizedTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Gaining,
    Losing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestFund {
    pub name: String,
    /// Change over the period in percent (`last - 100`).
    pub change: f64,
    /// `change - inflation change`, in percentage points.
    pub real_result: f64,
}

impl BestFund {
    pub fn verdict(&self) -> Verdict {
        if self.real_result > 0.0 {
            Verdict::Gaining
        } else {
            Verdict::Losing
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodKpis {
    pub inflation_change: f64,
    /// Change of the requested FX column, if the table has it.
    pub fx_change: Option<f64>,
    /// `fx_change - inflation change`, in percentage points.
    pub fx_real_result: Option<f64>,
    pub best_fund: Option<BestFund>,
}

impl PeriodKpis {
    pub fn verdict(&self) -> Option<Verdict> {
        self.best_fund.as_ref().map(BestFund::verdict)
    }
}

/// Summarizes the last row of a normalized table.
///
/// Only fund columns compete for the best-fund slot. Ties keep the first column.
pub fn period_kpis(
    normalized: &NormalizedTable,
    fx_column: &str,
) -> Result<PeriodKpis, PesowatchError> {
    let last_row = normalized.rows().last().ok_or_else(|| PesowatchError::NoData {
        series: "normalized table".to_string(),
    })?;
    let infl_idx =
        normalized
            .column_index(INFLATION_COLUMN)
            .ok_or_else(|| PesowatchError::UnknownColumn {
                name: INFLATION_COLUMN.to_string(),
            })?;

    let inflation_change = last_row.values[infl_idx] - 100.0;
    let fx_change = normalized
        .column_index(fx_column)
        .map(|idx| last_row.values[idx] - 100.0);

    let mut best: Option<(usize, f64)> = None;
    for (idx, column) in normalized.columns().iter().enumerate() {
        if column.kind != ColumnKind::Fund {
            continue;
        }
        let value = last_row.values[idx];
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((idx, value));
        }
    }

    let best_fund = best.map(|(idx, value)| {
        let change = value - 100.0;
        BestFund {
            name: normalized.columns()[idx].name.clone(),
            change,
            real_result: change - inflation_change,
        }
    });

    Ok(PeriodKpis {
        inflation_change,
        fx_change,
        fx_real_result: fx_change.map(|change| change - inflation_change),
        best_fund,
    })
}
