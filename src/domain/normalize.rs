//! Rebasing of a table window to 100.

use crate::domain::error::PesowatchError;
use crate::domain::table::{
    ColumnKind, ConsolidatedTable, INFLATION_COLUMN, NormalizedTable, TableRow,
};
use chrono::{Days, NaiveDate};

/// `[last date - days, last date]`, or `None` for an empty table.
pub fn trailing_window(table: &ConsolidatedTable, days: i64) -> Option<(NaiveDate, NaiveDate)> {
    let end = table.last_date()?;
    let start = end
        .checked_sub_days(Days::new(days.max(0) as u64))
        .unwrap_or(NaiveDate::MIN);
    Some((start, end))
}

/// Slices `table` to `[start, end]` and divides each column by its first value, times 100.
///
/// Columns whose first value is zero or not finite cannot be rebased and are
/// left out of the result.
pub fn normalize(
    table: &ConsolidatedTable,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<NormalizedTable, PesowatchError> {
    let window = table.window(start, end);
    let Some(base_row) = window.rows().first() else {
        return Err(PesowatchError::EmptyWindow { start, end });
    };

    let mut keep = Vec::new();
    for (idx, column) in window.columns().iter().enumerate() {
        let base = base_row.values[idx];
        if base == 0.0 || !base.is_finite() {
            log::warn!("column {} has base {base} on {start}, dropped from normalized table", column.name);
            continue;
        }
        keep.push((idx, base));
    }

    let columns = keep
        .iter()
        .map(|(idx, _)| window.columns()[*idx].clone())
        .collect();
    let rows = window
        .rows()
        .iter()
        .map(|row| TableRow {
            date: row.date,
            values: keep
                .iter()
                .map(|(idx, base)| row.values[*idx] / base * 100.0)
                .collect(),
        })
        .collect();

    log::debug!("normalized {} rows from {start} to {end}", window.len());
    Ok(ConsolidatedTable::new(columns, rows))
}

/// Each non-inflation column minus the inflation column, in points over 100.
///
/// Positive values mean the series beat inflation since the window start.
pub fn real_returns(normalized: &NormalizedTable) -> Result<ConsolidatedTable, PesowatchError> {
    let infl_idx =
        normalized
            .column_index(INFLATION_COLUMN)
            .ok_or_else(|| PesowatchError::UnknownColumn {
                name: INFLATION_COLUMN.to_string(),
            })?;

    let kept: Vec<usize> = normalized
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind != ColumnKind::Inflation)
        .map(|(idx, _)| idx)
        .collect();

    let columns = kept
        .iter()
        .map(|idx| normalized.columns()[*idx].clone())
        .collect();
    let rows = normalized
        .rows()
        .iter()
        .map(|row| TableRow {
            date: row.date,
            values: kept
                .iter()
                .map(|idx| row.values[*idx] - row.values[infl_idx])
                .collect(),
        })
        .collect();
    Ok(ConsolidatedTable::new(columns, rows))
}
