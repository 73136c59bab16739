//! Report adapter writing one CSV file per output into a directory.

use crate::domain::error::PesowatchError;
use crate::domain::projection::{GoalOutcome, ProjectionRow, RankedInstrument};
use crate::domain::table::ConsolidatedTable;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

fn io_err(e: csv::Error) -> PesowatchError {
    PesowatchError::Io(std::io::Error::other(e))
}

fn num(value: f64) -> String {
    format!("{value:.6}")
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn writer(&self, name: &str) -> Result<csv::Writer<fs::File>, PesowatchError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{name}.csv"));
        log::info!("writing {}", path.display());
        csv::Writer::from_path(&path).map_err(io_err)
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_table(&self, name: &str, table: &ConsolidatedTable) -> Result<(), PesowatchError> {
        let mut wtr = self.writer(name)?;
        let mut header = vec!["date".to_string()];
        header.extend(table.columns().iter().map(|c| c.name.clone()));
        wtr.write_record(&header).map_err(io_err)?;

        for row in table.rows() {
            let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
            record.extend(row.values.iter().map(|v| num(*v)));
            wtr.write_record(&record).map_err(io_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_projection(&self, name: &str, rows: &[ProjectionRow]) -> Result<(), PesowatchError> {
        let mut wtr = self.writer(name)?;
        wtr.write_record(["period", "capital", "contributed", "interest"])
            .map_err(io_err)?;
        for row in rows {
            wtr.write_record([
                row.period.to_string(),
                num(row.capital),
                num(row.contributed),
                num(row.interest),
            ])
            .map_err(io_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_ranking(&self, ranking: &[RankedInstrument]) -> Result<(), PesowatchError> {
        let mut wtr = self.writer("ranking")?;
        wtr.write_record([
            "rank",
            "name",
            "annual_rate",
            "final_capital",
            "gain",
            "return_pct",
            "podium",
        ])
        .map_err(io_err)?;
        for entry in ranking {
            wtr.write_record([
                entry.rank.to_string(),
                entry.name.clone(),
                num(entry.annual_rate),
                num(entry.final_capital),
                num(entry.gain),
                num(entry.return_pct),
                entry.is_podium().to_string(),
            ])
            .map_err(io_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_goal(&self, outcome: &GoalOutcome) -> Result<(), PesowatchError> {
        let mut wtr = self.writer("goal")?;
        wtr.write_record(["period", "capital", "remaining", "completion_pct"])
            .map_err(io_err)?;
        for step in outcome.progress() {
            wtr.write_record([
                step.period.to_string(),
                num(step.capital),
                num(step.remaining),
                num(step.completion_pct),
            ])
            .map_err(io_err)?;
        }
        wtr.flush()?;

        let mut wtr = self.writer("goal_alternatives")?;
        wtr.write_record(["months", "payment", "total_contributed"])
            .map_err(io_err)?;
        for alt in &outcome.alternatives {
            wtr.write_record([
                alt.months.to_string(),
                num(alt.payment),
                num(alt.total_contributed),
            ])
            .map_err(io_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
