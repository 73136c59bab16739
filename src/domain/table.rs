//! Date-aligned multi-column tables.

use crate::domain::observation::Observation;
use chrono::NaiveDate;

pub const INFLATION_COLUMN: &str = "Inflación";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Fund,
    Fx,
    Inflation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn fund(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Fund,
        }
    }

    pub fn fx(fx_type: &str) -> Self {
        Self {
            name: Self::fx_name(fx_type),
            kind: ColumnKind::Fx,
        }
    }

    pub fn inflation() -> Self {
        Self {
            name: INFLATION_COLUMN.to_string(),
            kind: ColumnKind::Inflation,
        }
    }

    /// Column name used for an FX channel, e.g. `Dólar Blue`.
    pub fn fx_name(fx_type: &str) -> String {
        format!("Dólar {fx_type}")
    }
}

/// One date with one value per table column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Rows ascending by date, each holding a value for every column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsolidatedTable {
    columns: Vec<Column>,
    rows: Vec<TableRow>,
}

/// A consolidated table rebased so every column starts at 100.
pub type NormalizedTable = ConsolidatedTable;

impl ConsolidatedTable {
    /// Builds a table, sorting rows by date. Rows without exactly one value
    /// per column are dropped.
    pub fn new(columns: Vec<Column>, mut rows: Vec<TableRow>) -> Self {
        rows.retain(|r| {
            let fits = r.values.len() == columns.len();
            if !fits {
                log::warn!(
                    "dropping row {} with {} values for {} columns",
                    r.date,
                    r.values.len(),
                    columns.len()
                );
            }
            fits
        });
        rows.sort_by_key(|r| r.date);
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns_of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.kind == kind)
    }

    pub fn fund_names(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Fund)
            .map(|c| c.name.clone())
            .collect()
    }

    /// The column as `(date, value)` points.
    pub fn column_series(&self, name: &str) -> Option<Vec<Observation>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|r| Observation::new(r.date, r.values[idx]))
                .collect(),
        )
    }

    pub fn first_value(&self, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        self.rows.first().map(|r| r.values[idx])
    }

    pub fn last_value(&self, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        self.rows.last().map(|r| r.values[idx])
    }

    /// Rows whose date falls in `[start, end]`.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> ConsolidatedTable {
        let rows = self
            .rows
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}
